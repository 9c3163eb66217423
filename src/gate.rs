//! Request gate: one entry point per mutating endpoint.
//!
//! Each entry point validates its input struct, authenticates the supplied credentials,
//! looks up the target, applies the rule for the resource's trust tier, and only then
//! calls the data operation. The first failing step decides the outcome.
//!
//! | Resource            | Rule                                    |
//! |---------------------|-----------------------------------------|
//! | account, post, comment | owner: verified id == recorded owner |
//! | category, account list | admin: verified and administrator    |
//!
//! The initial `verify` separates "who are you" (401) from "you may not" (403); the rule
//! itself re-authenticates, as every authorization decision does.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use serde::Serialize;

use crate::{
    auth::{self, Credentials, Identity},
    consistency,
    error::{ApiError, ApiResult},
    models::{
        AccountChanges, AccountProfile, AttachCategoriesRequest, Category, CategoryRequest,
        Comment, CommentRequest, LoginResponse, MessageResponse, NewAccount, Post, PostRequest,
        RegisterRequest, RegisteredAccount, UpdateAccountRequest,
    },
    repository::Repository,
};

/// Outcome
///
/// Tagged success result. The HTTP status travels with the tag, so rendering is a pure
/// function of the value.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Data { status: StatusCode, data: T },
    Message { status: StatusCode, message: String },
}

impl<T> Outcome<T> {
    pub fn ok(data: T) -> Self {
        Self::Data {
            status: StatusCode::OK,
            data,
        }
    }

    pub fn created(data: T) -> Self {
        Self::Data {
            status: StatusCode::CREATED,
            data,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            status: StatusCode::OK,
            message: message.into(),
        }
    }

    pub fn created_message(message: impl Into<String>) -> Self {
        Self::Message {
            status: StatusCode::CREATED,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Data { status, .. } | Self::Message { status, .. } => *status,
        }
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Data { status, data } => (status, Json(data)).into_response(),
            Self::Message { status, message } => {
                (status, Json(MessageResponse { message })).into_response()
            }
        }
    }
}

// --- Input checks ---

fn required(value: &str, field: &str) -> ApiResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("Missing required field: {field}")));
    }
    Ok(trimmed.to_string())
}

// Blank optional fields are treated as absent.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_credentials(credentials: &Credentials) -> ApiResult<()> {
    if credentials.is_complete() {
        Ok(())
    } else {
        Err(ApiError::validation("Email and password are required"))
    }
}

// Creation stamp in UTC, second precision.
fn creation_stamp() -> (NaiveDate, NaiveTime) {
    let now = Utc::now().naive_utc();
    let time = now.time();
    (now.date(), time.with_nanosecond(0).unwrap_or(time))
}

// --- Rule application ---

async fn authenticate(repo: &dyn Repository, credentials: &Credentials) -> ApiResult<Identity> {
    require_credentials(credentials)?;
    auth::verify(repo, credentials).await
}

async fn require_owner(
    repo: &dyn Repository,
    credentials: &Credentials,
    owner_id: i64,
    denial: &str,
) -> ApiResult<()> {
    if auth::authorize_owner(repo, credentials, owner_id).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden(denial))
    }
}

async fn require_admin(repo: &dyn Repository, credentials: &Credentials) -> ApiResult<()> {
    if auth::authorize_admin(repo, credentials).await? {
        Ok(())
    } else {
        Err(ApiError::forbidden("Administrator privileges required"))
    }
}

async fn owned_post(repo: &dyn Repository, post_id: i64) -> ApiResult<Post> {
    repo.get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))
}

// A comment is addressed through its post; a mismatched pair does not exist.
async fn owned_comment(repo: &dyn Repository, post_id: i64, comment_id: i64) -> ApiResult<Comment> {
    repo.get_comment(comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| ApiError::not_found("Comment not found"))
}

// --- Accounts ---

/// register
///
/// Open tier. Every field is required; the email must be unused and the role must exist.
#[tracing::instrument(skip_all)]
pub async fn register(
    repo: &dyn Repository,
    req: RegisterRequest,
) -> ApiResult<Outcome<RegisteredAccount>> {
    let first_name = required(&req.first_name, "first_name")?;
    let last_name = required(&req.last_name, "last_name")?;
    let email = required(&req.email, "email")?;
    let phone = required(&req.phone, "phone")?;
    if req.password.is_empty() {
        return Err(ApiError::validation("Missing required field: password"));
    }
    let role_id = req
        .role
        .ok_or_else(|| ApiError::validation("Missing required field: role"))?;

    if repo.find_account_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("Email is already registered"));
    }
    if repo.get_role(role_id).await?.is_none() {
        return Err(ApiError::validation(format!("Unknown role: {role_id}")));
    }

    let user = repo
        .create_account(NewAccount {
            first_name,
            last_name,
            email,
            phone,
            password: req.password,
            role_id,
        })
        .await?;

    tracing::info!(account_id = user.id, role_id, "account registered");
    Ok(Outcome::created(RegisteredAccount {
        message: "User created".to_string(),
        user,
    }))
}

/// login
///
/// Verifies the credentials and reports the account's role name.
#[tracing::instrument(skip_all)]
pub async fn login(repo: &dyn Repository, credentials: Credentials) -> ApiResult<Outcome<LoginResponse>> {
    let identity = auth::verify(repo, &credentials).await?;
    let role = repo
        .get_role(identity.role_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Role not found"))?;

    Ok(Outcome::ok(LoginResponse {
        message: "Login successful".to_string(),
        role: role.name,
    }))
}

/// list_accounts
///
/// Admin tier. `NotFound` when there is nothing to list.
#[tracing::instrument(skip_all)]
pub async fn list_accounts(
    repo: &dyn Repository,
    credentials: Credentials,
) -> ApiResult<Outcome<Vec<AccountProfile>>> {
    authenticate(repo, &credentials).await?;
    require_admin(repo, &credentials).await?;

    let accounts = repo.list_accounts().await?;
    if accounts.is_empty() {
        return Err(ApiError::not_found("No users found"));
    }
    Ok(Outcome::ok(accounts))
}

/// update_account
///
/// Owner tier, target is the account itself. Only first name, last name and phone are
/// self-service; at least one must be given.
#[tracing::instrument(skip(repo, req))]
pub async fn update_account(
    repo: &dyn Repository,
    account_id: i64,
    req: UpdateAccountRequest,
) -> ApiResult<Outcome> {
    let changes = AccountChanges {
        first_name: optional(req.first_name),
        last_name: optional(req.last_name),
        phone: optional(req.phone),
    };
    if changes.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    authenticate(repo, &req.credentials).await?;
    require_owner(
        repo,
        &req.credentials,
        account_id,
        "You may only update your own account",
    )
    .await?;

    if repo.update_account(account_id, changes).await? == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(Outcome::message("User updated"))
}

/// delete_account
///
/// Owner tier. An account that still owns posts or comments is a `Conflict`.
#[tracing::instrument(skip(repo, credentials))]
pub async fn delete_account(
    repo: &dyn Repository,
    account_id: i64,
    credentials: Credentials,
) -> ApiResult<Outcome> {
    authenticate(repo, &credentials).await?;
    require_owner(
        repo,
        &credentials,
        account_id,
        "You may only delete your own account",
    )
    .await?;

    let removed = repo.delete_account(account_id).await.map_err(|err| {
        match ApiError::from(err) {
            ApiError::Conflict(_) => ApiError::conflict("Account still owns posts or comments"),
            other => other,
        }
    })?;
    if removed == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("account deleted");
    Ok(Outcome::message("User deleted"))
}

// --- Posts ---

/// create_post
///
/// The verified identity becomes the owner. Callers cannot choose another.
#[tracing::instrument(skip_all)]
pub async fn create_post(repo: &dyn Repository, req: PostRequest) -> ApiResult<Outcome<Post>> {
    let title = required(&req.title, "title")?;
    let body = required(&req.body, "body")?;

    let identity = authenticate(repo, &req.credentials).await?;
    let post = repo
        .create_post(identity.id, &title, &body, creation_stamp())
        .await?;

    tracing::info!(post_id = post.id, account_id = identity.id, "post created");
    Ok(Outcome::created(post))
}

/// update_post
#[tracing::instrument(skip(repo, req))]
pub async fn update_post(repo: &dyn Repository, post_id: i64, req: PostRequest) -> ApiResult<Outcome> {
    let title = required(&req.title, "title")?;
    let body = required(&req.body, "body")?;

    authenticate(repo, &req.credentials).await?;
    let post = owned_post(repo, post_id).await?;
    require_owner(
        repo,
        &req.credentials,
        post.account_id,
        "You may only update your own posts",
    )
    .await?;

    if repo.update_post(post_id, &title, &body).await? == 0 {
        return Err(ApiError::not_found("Post not found"));
    }
    Ok(Outcome::message("Post updated"))
}

/// delete_post
///
/// Owner tier; removal goes through the cascade, never a single-table delete.
#[tracing::instrument(skip(repo, credentials))]
pub async fn delete_post(
    repo: &dyn Repository,
    post_id: i64,
    credentials: Credentials,
) -> ApiResult<Outcome> {
    authenticate(repo, &credentials).await?;
    let post = owned_post(repo, post_id).await?;
    require_owner(
        repo,
        &credentials,
        post.account_id,
        "You may only delete your own posts",
    )
    .await?;

    consistency::cascade_delete_post(repo, post_id).await?;
    Ok(Outcome::message("Post deleted"))
}

/// attach_categories
///
/// Owner tier. Repeats and already-attached categories are not errors.
#[tracing::instrument(skip(repo, req))]
pub async fn attach_categories(
    repo: &dyn Repository,
    post_id: i64,
    req: AttachCategoriesRequest,
) -> ApiResult<Outcome> {
    if req.categories.is_empty() {
        return Err(ApiError::validation("Missing required field: categories"));
    }

    authenticate(repo, &req.credentials).await?;
    let post = owned_post(repo, post_id).await?;
    require_owner(
        repo,
        &req.credentials,
        post.account_id,
        "You may only categorize your own posts",
    )
    .await?;

    consistency::attach_categories(repo, post_id, &req.categories).await?;
    Ok(Outcome::created_message("Categories added to post"))
}

// --- Comments ---

/// create_comment
///
/// Any verified identity may comment on an existing post and becomes the comment's owner.
#[tracing::instrument(skip(repo, req))]
pub async fn create_comment(
    repo: &dyn Repository,
    post_id: i64,
    req: CommentRequest,
) -> ApiResult<Outcome<Comment>> {
    let body = required(&req.body, "body")?;

    let identity = authenticate(repo, &req.credentials).await?;
    owned_post(repo, post_id).await?;

    let comment = repo
        .create_comment(post_id, identity.id, &body, creation_stamp())
        .await
        .map_err(|err| ApiError::missing_parent(err, "Post not found"))?;

    Ok(Outcome::created(comment))
}

/// update_comment
#[tracing::instrument(skip(repo, req))]
pub async fn update_comment(
    repo: &dyn Repository,
    post_id: i64,
    comment_id: i64,
    req: CommentRequest,
) -> ApiResult<Outcome> {
    let body = required(&req.body, "body")?;

    authenticate(repo, &req.credentials).await?;
    let comment = owned_comment(repo, post_id, comment_id).await?;
    require_owner(
        repo,
        &req.credentials,
        comment.account_id,
        "You may only update your own comments",
    )
    .await?;

    if repo.update_comment(comment_id, post_id, &body).await? == 0 {
        return Err(ApiError::not_found("Comment not found"));
    }
    Ok(Outcome::message("Comment updated"))
}

/// delete_comment
#[tracing::instrument(skip(repo, credentials))]
pub async fn delete_comment(
    repo: &dyn Repository,
    post_id: i64,
    comment_id: i64,
    credentials: Credentials,
) -> ApiResult<Outcome> {
    authenticate(repo, &credentials).await?;
    let comment = owned_comment(repo, post_id, comment_id).await?;
    require_owner(
        repo,
        &credentials,
        comment.account_id,
        "You may only delete your own comments",
    )
    .await?;

    if repo.delete_comment(comment_id, post_id).await? == 0 {
        return Err(ApiError::not_found("Comment not found"));
    }
    Ok(Outcome::message("Comment deleted"))
}

// --- Categories ---

/// create_category
///
/// Admin tier.
#[tracing::instrument(skip_all)]
pub async fn create_category(
    repo: &dyn Repository,
    req: CategoryRequest,
) -> ApiResult<Outcome<Category>> {
    let name = required(&req.name, "name")?;

    authenticate(repo, &req.credentials).await?;
    require_admin(repo, &req.credentials).await?;

    let category = repo.create_category(&name).await?;
    tracing::info!(category_id = category.id, "category created");
    Ok(Outcome::created(category))
}

/// update_category
#[tracing::instrument(skip(repo, req))]
pub async fn update_category(
    repo: &dyn Repository,
    category_id: i64,
    req: CategoryRequest,
) -> ApiResult<Outcome> {
    let name = required(&req.name, "name")?;

    authenticate(repo, &req.credentials).await?;
    require_admin(repo, &req.credentials).await?;

    if repo.update_category(category_id, &name).await? == 0 {
        return Err(ApiError::not_found("Category not found"));
    }
    Ok(Outcome::message("Category updated"))
}

/// delete_category
///
/// Admin tier; associations go first, posts are never touched.
#[tracing::instrument(skip(repo, credentials))]
pub async fn delete_category(
    repo: &dyn Repository,
    category_id: i64,
    credentials: Credentials,
) -> ApiResult<Outcome> {
    authenticate(repo, &credentials).await?;
    require_admin(repo, &credentials).await?;

    consistency::cascade_delete_category(repo, category_id).await?;
    Ok(Outcome::message("Category deleted"))
}
