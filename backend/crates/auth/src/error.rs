//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. The variants
//! mirror the wire-level error taxonomy: each one maps to a stable
//! `kind` string that clients switch on.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong identifier or wrong password - deliberately the same error
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked")]
    AccountLocked { retry_after: Duration },

    /// Account is disabled
    #[error("Account is inactive")]
    AccountInactive,

    /// No token on a protected route
    #[error("Authentication required")]
    Unauthenticated,

    /// Access token past its expiry - the client may refresh
    #[error("Token has expired")]
    TokenExpired,

    /// Token malformed, bad signature, or refresh token unknown/redeemed
    #[error("Token is invalid")]
    TokenInvalid,

    /// Authenticated, but the role is not allowed here
    #[error("Insufficient permissions")]
    Forbidden,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked { .. } => StatusCode::LOCKED,
            AuthError::AccountInactive | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::Unauthenticated
            | AuthError::TokenExpired
            | AuthError::TokenInvalid => ErrorKind::Unauthorized,
            AuthError::AccountLocked { .. } => ErrorKind::Locked,
            AuthError::AccountInactive | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable machine-readable code for the response envelope
    ///
    /// Clients branch on this, not on the message text, so these
    /// strings are part of the API contract.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountLocked { .. } => "account_locked",
            AuthError::AccountInactive => "account_inactive",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::Forbidden => "forbidden",
            AuthError::Database(_) | AuthError::Internal(_) => "internal_error",
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = match self {
            // Server errors never leak internals to the client
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        };
        match self {
            AuthError::AccountLocked { retry_after } => err.with_retry_after(*retry_after),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked { retry_after } => {
                tracing::warn!(retry_after_secs = retry_after.as_secs(), "Login attempt on locked account");
            }
            AuthError::Forbidden => {
                tracing::warn!("Role check failed on protected route");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let code = self.code();
        let app_error = self.to_app_error();

        let mut body = serde_json::json!({
            "success": false,
            "message": app_error.message(),
            "kind": code,
        });
        if let Some(retry_after) = app_error.retry_after() {
            body["retry_after_secs"] = serde_json::json!(retry_after.as_secs());
        }

        (self.status_code(), axum::Json(body)).into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::AccountLocked {
                retry_after: Duration::from_secs(60)
            }
            .status_code(),
            StatusCode::LOCKED
        );
        assert_eq!(AuthError::AccountInactive.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AuthError::InvalidCredentials.code(), "invalid_credentials");
        assert_eq!(AuthError::TokenExpired.code(), "token_expired");
        assert_eq!(AuthError::TokenInvalid.code(), "token_invalid");
        assert_eq!(
            AuthError::Internal("boom".into()).code(),
            "internal_error"
        );
    }

    #[test]
    fn test_internal_errors_do_not_leak() {
        let err = AuthError::Internal("connection string postgres://user:pw@host".into());
        let app = err.to_app_error();
        assert_eq!(app.message(), "Internal server error");
    }

    #[test]
    fn test_locked_carries_retry_after() {
        let err = AuthError::AccountLocked {
            retry_after: Duration::from_secs(540),
        };
        let app = err.to_app_error();
        assert_eq!(app.retry_after(), Some(Duration::from_secs(540)));
    }
}
