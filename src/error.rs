//! Error taxonomy shared by every mutating endpoint.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failure outcome of a gated operation.
///
/// Every variant except `Internal` is attributed to caller input and returned verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unauthenticated, unknown account, or wrong secret.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but not the owner or not an administrator.
    #[error("{0}")]
    Forbidden(String),

    /// Target resource is absent.
    #[error("{0}")]
    NotFound(String),

    /// Missing or malformed required fields.
    #[error("{0}")]
    Validation(String),

    /// Duplicate unique key or a reference that still holds.
    #[error("{0}")]
    Conflict(String),

    /// Unexpected store failure. Logged, never shown to the caller.
    #[error("Internal error")]
    Internal(#[source] sqlx::Error),
}

/// Result type for gated operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Maps a foreign-key rejection to `NotFound`: the referenced parent is gone.
    /// Other store errors convert as usual.
    pub fn missing_parent(err: sqlx::Error, message: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::NotFound(message.into())
            }
            _ => Self::from(err),
        }
    }

    /// HTTP status for this outcome. A pure function of the variant.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Store errors: constraint violations are caller-attributable, everything else is internal.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::conflict("Resource already exists");
            }
            if db_err.is_foreign_key_violation() {
                return Self::conflict("Resource is referenced by other records");
            }
        }
        Self::Internal(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            tracing::error!(error = ?err, "store failure");
        }

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}
