use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

use crate::auth::Credentials;

// --- Core Schemas (Mapped to Database) ---

/// Role
///
/// Immutable reference data from the `roles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, FromRow, Default)]
#[ts(export)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// Account
///
/// Full row from the `accounts` table, secret included. Never serialized; responses
/// use `AccountProfile`.
#[derive(Clone, FromRow, Default)]
pub struct Account {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    // Unique across the table.
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role_id: i64,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .finish_non_exhaustive()
    }
}

/// Post
///
/// A row from the `posts` table. The creation date and time are captured once and
/// never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    // Owning account. Fixed at creation.
    pub account_id: i64,
    pub title: String,
    pub body: String,
    #[ts(type = "string")]
    pub created_date: NaiveDate,
    #[ts(type = "string")]
    pub created_time: NaiveTime,
}

/// Comment
///
/// A row from the `comments` table. Cannot outlive its parent post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub account_id: i64,
    pub post_id: i64,
    pub body: String,
    #[ts(type = "string")]
    pub created_date: NaiveDate,
    #[ts(type = "string")]
    pub created_time: NaiveTime,
}

/// Category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// NewAccount
///
/// Validated registration data handed to the repository.
#[derive(Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role_id: i64,
}

/// AccountChanges
///
/// Self-service subset of account fields. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl AccountChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone.is_none()
    }
}

// --- Request Payloads (Input Schemas) ---
//
// Fields default to empty so that a missing field reaches validation and is reported
// as `ValidationFailed` rather than as a deserialization error.

/// RegisterRequest
///
/// Input payload for POST /register. Every field is required.
#[derive(Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct RegisterRequest {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: Option<i64>,
}

/// UpdateAccountRequest
///
/// Input payload for PUT /users/{id}. At least one profile field must be present.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateAccountRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// PostRequest
///
/// Input payload for POST /posts and PUT /posts/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PostRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// AttachCategoriesRequest
///
/// Input payload for POST /posts/{id}/categories. Repeated ids are collapsed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttachCategoriesRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub categories: Vec<i64>,
}

/// CommentRequest
///
/// Input payload for creating or editing a comment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommentRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub body: String,
}

/// CategoryRequest
///
/// Input payload for creating or renaming a category (administrators only).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoryRequest {
    #[serde(flatten)]
    pub credentials: Credentials,
    #[serde(default)]
    pub name: String,
}

/// SearchPostsRequest
///
/// Input payload for POST /posts/search.
#[derive(Debug, Clone, Serialize, Deserialize, TS, Default)]
#[ts(export)]
pub struct SearchPostsRequest {
    #[serde(default)]
    pub title: String,
}

// --- Response Schemas (Output) ---

/// AccountProfile
///
/// Public view of an account. The secret is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, FromRow, Default)]
#[ts(export)]
pub struct AccountProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role_id: i64,
}

impl From<Account> for AccountProfile {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            first_name: account.first_name,
            last_name: account.last_name,
            email: account.email,
            phone: account.phone,
            role_id: account.role_id,
        }
    }
}

/// RegisteredAccount
///
/// Response body for a successful registration (201).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RegisteredAccount {
    pub message: String,
    pub user: AccountProfile,
}

/// LoginResponse
///
/// Response body for a successful login: the caller's role name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoginResponse {
    pub message: String,
    pub role: String,
}

/// MessageResponse
///
/// Body of every success-with-message outcome.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
