use crate::models::{
    Account, AccountChanges, AccountProfile, Category, Comment, NewAccount, Post, Role,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::sync::Arc;

/// Result of a single store call. Interpretation of failures belongs to the caller.
pub type StoreResult<T> = Result<T, sqlx::Error>;

/// Repository Trait
///
/// Persistence contract consumed by the authorization and consistency core: point
/// lookups, existence checks, and mutations that report their affected-row count.
/// Each call touches one table; multi-table sequences are composed by `consistency`.
///
/// **Send + Sync + async_trait** make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    // Every account whose email and secret both match. Callers decide what several matches mean.
    async fn find_accounts_by_credentials(&self, email: &str, password: &str) -> StoreResult<Vec<Account>>;
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    async fn get_account(&self, id: i64) -> StoreResult<Option<AccountProfile>>;
    async fn list_accounts(&self) -> StoreResult<Vec<AccountProfile>>;
    async fn create_account(&self, account: NewAccount) -> StoreResult<AccountProfile>;
    // Applies only the `Some` fields.
    async fn update_account(&self, id: i64, changes: AccountChanges) -> StoreResult<u64>;
    async fn delete_account(&self, id: i64) -> StoreResult<u64>;
    async fn get_role(&self, id: i64) -> StoreResult<Option<Role>>;

    // --- Posts ---
    // Newest first.
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>>;
    async fn search_posts(&self, title: &str) -> StoreResult<Vec<Post>>;
    async fn posts_by_category(&self, category_id: i64) -> StoreResult<Vec<Post>>;
    async fn create_post(
        &self,
        account_id: i64,
        title: &str,
        body: &str,
        created: (NaiveDate, NaiveTime),
    ) -> StoreResult<Post>;
    async fn update_post(&self, id: i64, title: &str, body: &str) -> StoreResult<u64>;
    // Single-table delete. Dependents are the caller's responsibility.
    async fn delete_post(&self, id: i64) -> StoreResult<u64>;

    // --- Comments ---
    async fn comments_for_post(&self, post_id: i64) -> StoreResult<Vec<Comment>>;
    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>>;
    async fn create_comment(
        &self,
        post_id: i64,
        account_id: i64,
        body: &str,
        created: (NaiveDate, NaiveTime),
    ) -> StoreResult<Comment>;
    // Scoped to the parent post so a comment id cannot be edited through another post.
    async fn update_comment(&self, id: i64, post_id: i64, body: &str) -> StoreResult<u64>;
    async fn delete_comment(&self, id: i64, post_id: i64) -> StoreResult<u64>;
    async fn delete_comments_for_post(&self, post_id: i64) -> StoreResult<u64>;

    // --- Categories ---
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn create_category(&self, name: &str) -> StoreResult<Category>;
    async fn update_category(&self, id: i64, name: &str) -> StoreResult<u64>;
    async fn delete_category(&self, id: i64) -> StoreResult<u64>;

    // --- Post/Category associations ---
    async fn categories_for_post(&self, post_id: i64) -> StoreResult<Vec<Category>>;
    // Insert-or-ignore on the (post, category) key: 1 when inserted, 0 when it already existed.
    async fn insert_post_category(&self, post_id: i64, category_id: i64) -> StoreResult<u64>;
    async fn delete_post_categories_for_post(&self, post_id: i64) -> StoreResult<u64>;
    async fn delete_post_categories_for_category(&self, category_id: i64) -> StoreResult<u64>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// The `Repository` implementation backed by a SQLite pool.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Wraps an already-migrated pool (see `db::connect`).
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, email, phone, password, role_id";
const PROFILE_COLUMNS: &str = "id, first_name, last_name, email, phone, role_id";
const POST_COLUMNS: &str = "id, account_id, title, body, created_date, created_time";
const COMMENT_COLUMNS: &str = "id, account_id, post_id, body, created_date, created_time";

// Escapes LIKE metacharacters for use with `ESCAPE '\'`.
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl Repository for SqliteRepository {
    // --- ACCOUNTS ---

    /// find_accounts_by_credentials
    ///
    /// Exact equality on both columns. Returns every match so ambiguity stays visible.
    async fn find_accounts_by_credentials(&self, email: &str, password: &str) -> StoreResult<Vec<Account>> {
        sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ? AND password = ?"
        ))
        .bind(email)
        .bind(password)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        sqlx::query_as::<_, Account>(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_account(&self, id: i64) -> StoreResult<Option<AccountProfile>> {
        sqlx::query_as::<_, AccountProfile>(&format!("SELECT {PROFILE_COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_accounts(&self) -> StoreResult<Vec<AccountProfile>> {
        sqlx::query_as::<_, AccountProfile>(&format!("SELECT {PROFILE_COLUMNS} FROM accounts ORDER BY id"))
            .fetch_all(&self.pool)
            .await
    }

    /// create_account
    ///
    /// Inserts and returns the stored profile. The UNIQUE email column rejects duplicates
    /// even when two registrations race past the caller's pre-check.
    async fn create_account(&self, account: NewAccount) -> StoreResult<AccountProfile> {
        sqlx::query_as::<_, AccountProfile>(&format!(
            "INSERT INTO accounts (first_name, last_name, email, phone, password, role_id) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {PROFILE_COLUMNS}"
        ))
        .bind(account.first_name)
        .bind(account.last_name)
        .bind(account.email)
        .bind(account.phone)
        .bind(account.password)
        .bind(account.role_id)
        .fetch_one(&self.pool)
        .await
    }

    /// update_account
    ///
    /// Builds the SET list from the provided fields with `QueryBuilder`, binding every value.
    async fn update_account(&self, id: i64, changes: AccountChanges) -> StoreResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE accounts SET ");
        {
            let mut set = builder.separated(", ");
            if let Some(first_name) = changes.first_name {
                set.push("first_name = ");
                set.push_bind_unseparated(first_name);
            }
            if let Some(last_name) = changes.last_name {
                set.push("last_name = ");
                set.push_bind_unseparated(last_name);
            }
            if let Some(phone) = changes.phone {
                set.push("phone = ");
                set.push_bind_unseparated(phone);
            }
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_account(&self, id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn get_role(&self, id: i64) -> StoreResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    // --- POSTS ---

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_date DESC, created_time DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// search_posts
    ///
    /// Case-insensitive (ASCII) substring match on the title, via a bound LIKE pattern.
    /// `%` and `_` in the fragment match themselves.
    async fn search_posts(&self, title: &str) -> StoreResult<Vec<Post>> {
        let pattern = format!("%{}%", escape_like(title));
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE title LIKE ? ESCAPE '\\' ORDER BY id"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
    }

    async fn posts_by_category(&self, category_id: i64) -> StoreResult<Vec<Post>> {
        sqlx::query_as::<_, Post>(
            "SELECT p.id, p.account_id, p.title, p.body, p.created_date, p.created_time \
             FROM posts p \
             INNER JOIN post_categories pc ON p.id = pc.post_id \
             WHERE pc.category_id = ? \
             ORDER BY p.id",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_post(
        &self,
        account_id: i64,
        title: &str,
        body: &str,
        created: (NaiveDate, NaiveTime),
    ) -> StoreResult<Post> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (account_id, title, body, created_date, created_time) \
             VALUES (?, ?, ?, ?, ?) RETURNING {POST_COLUMNS}"
        ))
        .bind(account_id)
        .bind(title)
        .bind(body)
        .bind(created.0)
        .bind(created.1)
        .fetch_one(&self.pool)
        .await
    }

    /// update_post
    ///
    /// Title and body only. Owner and creation stamp are immutable.
    async fn update_post(&self, id: i64, title: &str, body: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE posts SET title = ?, body = ? WHERE id = ?")
            .bind(title)
            .bind(body)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_post(&self, id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- COMMENTS ---

    async fn comments_for_post(&self, post_id: i64) -> StoreResult<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ? \
             ORDER BY created_date, created_time, id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_comment(&self, id: i64) -> StoreResult<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_comment(
        &self,
        post_id: i64,
        account_id: i64,
        body: &str,
        created: (NaiveDate, NaiveTime),
    ) -> StoreResult<Comment> {
        sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (account_id, post_id, body, created_date, created_time) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(account_id)
        .bind(post_id)
        .bind(body)
        .bind(created.0)
        .bind(created.1)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_comment(&self, id: i64, post_id: i64, body: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE comments SET body = ? WHERE id = ? AND post_id = ?")
            .bind(body)
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_comment(&self, id: i64, post_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ? AND post_id = ?")
            .bind(id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_comments_for_post(&self, post_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- CATEGORIES ---

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_category(&self, name: &str) -> StoreResult<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES (?) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
    }

    async fn update_category(&self, id: i64, name: &str) -> StoreResult<u64> {
        let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_category(&self, id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // --- ASSOCIATIONS ---

    async fn categories_for_post(&self, post_id: i64) -> StoreResult<Vec<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name FROM categories c \
             INNER JOIN post_categories pc ON c.id = pc.category_id \
             WHERE pc.post_id = ? \
             ORDER BY pc.rowid",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }

    /// insert_post_category
    ///
    /// `INSERT OR IGNORE` against the composite primary key, so concurrent attaches of the
    /// same pair cannot produce a duplicate row. The foreign keys still reject a pair whose
    /// post or category has been removed.
    async fn insert_post_category(&self, post_id: i64, category_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("INSERT OR IGNORE INTO post_categories (post_id, category_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_post_categories_for_post(&self, post_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM post_categories WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_post_categories_for_category(&self, category_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM post_categories WHERE category_id = ?")
            .bind(category_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
