#![allow(dead_code)]

use async_trait::async_trait;
use blog_platform::{
    auth::Credentials,
    db,
    models::{Account, AccountChanges, AccountProfile, Category, Comment, NewAccount, Post, Role},
    repository::{Repository, SqliteRepository, StoreResult},
};
use chrono::{NaiveDate, NaiveTime};
use std::sync::Mutex;

pub const ADMIN_EMAIL: &str = "admin@x.com";
pub const ANA_EMAIL: &str = "ana@x.com";
pub const BEN_EMAIL: &str = "ben@x.com";
pub const SECRET: &str = "p1";

// --- Fixtures ---

pub async fn store() -> SqliteRepository {
    let pool = db::open_in_memory().await.expect("in-memory store");
    SqliteRepository::new(pool)
}

pub fn stamp() -> (NaiveDate, NaiveTime) {
    (
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveTime::from_hms_opt(12, 30, 0).unwrap(),
    )
}

pub fn creds(email: &str) -> Credentials {
    Credentials::new(email, SECRET)
}

pub async fn seed_account(repo: &dyn Repository, email: &str, role_id: i64) -> AccountProfile {
    repo.create_account(NewAccount {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        phone: "555-0100".to_string(),
        password: SECRET.to_string(),
        role_id,
    })
    .await
    .expect("seed account")
}

pub async fn seed_post(repo: &dyn Repository, account_id: i64, title: &str) -> Post {
    repo.create_post(account_id, title, "body", stamp())
        .await
        .expect("seed post")
}

pub async fn seed_comment(repo: &dyn Repository, post_id: i64, account_id: i64) -> Comment {
    repo.create_comment(post_id, account_id, "nice", stamp())
        .await
        .expect("seed comment")
}

pub async fn seed_category(repo: &dyn Repository, name: &str) -> Category {
    repo.create_category(name).await.expect("seed category")
}

/// Admin (id 1), Ana (id 2) and Ben (id 3), all with the shared secret.
pub async fn seed_people(repo: &dyn Repository) -> (AccountProfile, AccountProfile, AccountProfile) {
    let admin = seed_account(repo, ADMIN_EMAIL, 1).await;
    let ana = seed_account(repo, ANA_EMAIL, 2).await;
    let ben = seed_account(repo, BEN_EMAIL, 2).await;
    (admin, ana, ben)
}

pub fn ids(categories: &[Category]) -> Vec<i64> {
    categories.iter().map(|c| c.id).collect()
}

// --- Recording Repository ---

/// Wraps a real store, records every call by name and can fail a chosen step with a
/// store error. Used to observe call order and to interrupt multi-step sequences.
pub struct RecordingRepo {
    inner: SqliteRepository,
    calls: Mutex<Vec<&'static str>>,
    fail_on: Mutex<Option<&'static str>>,
    phantom_post: Option<Post>,
    duplicate_accounts: bool,
}

impl RecordingRepo {
    pub fn new(inner: SqliteRepository) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
            phantom_post: None,
            duplicate_accounts: false,
        }
    }

    pub fn fail_on(&self, step: &'static str) {
        *self.fail_on.lock().unwrap() = Some(step);
    }

    pub fn heal(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Makes `get_post` report `post` even though the store no longer has it.
    pub fn with_phantom_post(mut self, post: Post) -> Self {
        self.phantom_post = Some(post);
        self
    }

    /// Makes every credential lookup report each real match twice.
    pub fn with_duplicate_accounts(mut self) -> Self {
        self.duplicate_accounts = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn called(&self, step: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| *c == step)
    }

    fn record(&self, step: &'static str) -> StoreResult<()> {
        self.calls.lock().unwrap().push(step);
        if *self.fail_on.lock().unwrap() == Some(step) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for RecordingRepo {
    async fn find_accounts_by_credentials(&self, email: &str, password: &str) -> StoreResult<Vec<Account>> {
        self.record("find_accounts_by_credentials")?;
        let matches = self.inner.find_accounts_by_credentials(email, password).await?;
        if self.duplicate_accounts {
            return Ok(matches.iter().chain(matches.iter()).cloned().collect());
        }
        Ok(matches)
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.record("find_account_by_email")?;
        self.inner.find_account_by_email(email).await
    }

    async fn get_account(&self, id: i64) -> StoreResult<Option<AccountProfile>> {
        self.record("get_account")?;
        self.inner.get_account(id).await
    }

    async fn list_accounts(&self) -> StoreResult<Vec<AccountProfile>> {
        self.record("list_accounts")?;
        self.inner.list_accounts().await
    }

    async fn create_account(&self, account: NewAccount) -> StoreResult<AccountProfile> {
        self.record("create_account")?;
        self.inner.create_account(account).await
    }

    async fn update_account(&self, id: i64, changes: AccountChanges) -> StoreResult<u64> {
        self.record("update_account")?;
        self.inner.update_account(id, changes).await
    }

    async fn delete_account(&self, id: i64) -> StoreResult<u64> {
        self.record("delete_account")?;
        self.inner.delete_account(id).await
    }

    async fn get_role(&self, id: i64) -> StoreResult<Option<Role>> {
        self.record("get_role")?;
        self.inner.get_role(id).await
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        self.record("list_posts")?;
        self.inner.list_posts().await
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        self.record("get_post")?;
        if let Some(post) = self.phantom_post.as_ref().filter(|p| p.id == id) {
            return Ok(Some(post.clone()));
        }
        self.inner.get_post(id).await
    }

    async fn search_posts(&self, title: &str) -> StoreResult<Vec<Post>> {
        self.record("search_posts")?;
        self.inner.search_posts(title).await
    }

    async fn posts_by_category(&self, category_id: i64) -> StoreResult<Vec<Post>> {
        self.record("posts_by_category")?;
        self.inner.posts_by_category(category_id).await
    }

    async fn create_post(
        &self,
        account_id: i64,
        title: &str,
        body: &str,
        created: (NaiveDate, NaiveTime),
    ) -> StoreResult<Post> {
        self.record("create_post")?;
        self.inner.create_post(account_id, title, body, created).await
    }

    async fn update_post(&self, id: i64, title: &str, body: &str) -> StoreResult<u64> {
        self.record("update_post")?;
        self.inner.update_post(id, title, body).await
    }

    async fn delete_post(&self, id: i64) -> StoreResult<u64> {
        self.record("delete_post")?;
        self.inner.delete_post(id).await
    }

    async fn comments_for_post(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        self.record("comments_for_post")?;
        self.inner.comments_for_post(post_id).await
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        self.record("get_comment")?;
        self.inner.get_comment(id).await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        account_id: i64,
        body: &str,
        created: (NaiveDate, NaiveTime),
    ) -> StoreResult<Comment> {
        self.record("create_comment")?;
        self.inner.create_comment(post_id, account_id, body, created).await
    }

    async fn update_comment(&self, id: i64, post_id: i64, body: &str) -> StoreResult<u64> {
        self.record("update_comment")?;
        self.inner.update_comment(id, post_id, body).await
    }

    async fn delete_comment(&self, id: i64, post_id: i64) -> StoreResult<u64> {
        self.record("delete_comment")?;
        self.inner.delete_comment(id, post_id).await
    }

    async fn delete_comments_for_post(&self, post_id: i64) -> StoreResult<u64> {
        self.record("delete_comments_for_post")?;
        self.inner.delete_comments_for_post(post_id).await
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.record("list_categories")?;
        self.inner.list_categories().await
    }

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        self.record("get_category")?;
        self.inner.get_category(id).await
    }

    async fn create_category(&self, name: &str) -> StoreResult<Category> {
        self.record("create_category")?;
        self.inner.create_category(name).await
    }

    async fn update_category(&self, id: i64, name: &str) -> StoreResult<u64> {
        self.record("update_category")?;
        self.inner.update_category(id, name).await
    }

    async fn delete_category(&self, id: i64) -> StoreResult<u64> {
        self.record("delete_category")?;
        self.inner.delete_category(id).await
    }

    async fn categories_for_post(&self, post_id: i64) -> StoreResult<Vec<Category>> {
        self.record("categories_for_post")?;
        self.inner.categories_for_post(post_id).await
    }

    async fn insert_post_category(&self, post_id: i64, category_id: i64) -> StoreResult<u64> {
        self.record("insert_post_category")?;
        self.inner.insert_post_category(post_id, category_id).await
    }

    async fn delete_post_categories_for_post(&self, post_id: i64) -> StoreResult<u64> {
        self.record("delete_post_categories_for_post")?;
        self.inner.delete_post_categories_for_post(post_id).await
    }

    async fn delete_post_categories_for_category(&self, category_id: i64) -> StoreResult<u64> {
        self.record("delete_post_categories_for_category")?;
        self.inner.delete_post_categories_for_category(category_id).await
    }
}
