use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    models::Account,
    repository::Repository,
};

/// Role reference that carries administrator privilege.
pub const ADMIN_ROLE_ID: i64 = 1;

/// Credentials
///
/// Email and secret supplied with every mutating request. There is no session: each
/// authorization decision re-verifies these against the store.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields are present and non-blank.
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// Keeps the secret out of logs and `#[instrument]` spans.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity
///
/// The verified account returned by `verify`. Everything the role and ownership rules
/// need, without the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role_id: i64,
}

impl From<Account> for Identity {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role_id: account.role_id,
        }
    }
}

impl Identity {
    /// Owner rule: this identity created the resource owned by `account_id`.
    pub fn owns(&self, account_id: i64) -> bool {
        self.id == account_id
    }
}

/// verify
///
/// Credential Verifier. Succeeds only when exactly one account matches both the email
/// and the secret; zero or several matches are `InvalidCredentials`. Incomplete
/// credentials never reach the store.
///
/// The secret is compared for plain equality by the store query.
pub async fn verify(repo: &dyn Repository, credentials: &Credentials) -> ApiResult<Identity> {
    if !credentials.is_complete() {
        return Err(ApiError::InvalidCredentials);
    }

    let mut matches = repo
        .find_accounts_by_credentials(&credentials.email, &credentials.password)
        .await?;

    if matches.len() != 1 {
        if matches.len() > 1 {
            tracing::warn!(email = %credentials.email, "ambiguous credential match rejected");
        }
        return Err(ApiError::InvalidCredentials);
    }

    Ok(Identity::from(matches.remove(0)))
}

/// is_admin
///
/// Role Classifier. Pure comparison against the administrator role reference.
pub fn is_admin(identity: &Identity) -> bool {
    identity.role_id == ADMIN_ROLE_ID
}

/// authorize_owner
///
/// Ownership Arbiter. Re-authenticates `credentials` and reports whether the verified
/// identity is the account `target_account_id` (the resource's recorded owner, or the
/// account itself for account resources). Failed verification is `false`; only store
/// failures are errors.
pub async fn authorize_owner(
    repo: &dyn Repository,
    credentials: &Credentials,
    target_account_id: i64,
) -> ApiResult<bool> {
    match verify(repo, credentials).await {
        Ok(identity) => Ok(identity.owns(target_account_id)),
        Err(ApiError::InvalidCredentials) => Ok(false),
        Err(err) => Err(err),
    }
}

/// authorize_admin
///
/// Admin rule: verified and holding the administrator role.
pub async fn authorize_admin(repo: &dyn Repository, credentials: &Credentials) -> ApiResult<bool> {
    match verify(repo, credentials).await {
        Ok(identity) => Ok(is_admin(&identity)),
        Err(ApiError::InvalidCredentials) => Ok(false),
        Err(err) => Err(err),
    }
}
