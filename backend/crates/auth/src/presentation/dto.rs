//! Request/Response DTOs
//!
//! Wire shapes for the auth endpoints. Field names are camelCase to
//! match the admin frontend.

use serde::{Deserialize, Serialize};

use crate::domain::entity::account::AccountProfile;
use crate::token::TokenSet;

/// Login request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// User name or email
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Refresh request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Success envelope
///
/// Mirrors the error envelope's `success: false`; clients check the
/// flag before reading `data`.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Session payload returned by login and refresh
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: AccountProfile,
    pub tokens: TokenSet,
}

/// Payload for GET /me
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user: AccountProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_defaults_remember_me() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"identifier":"karim_h","password":"pw"}"#).unwrap();
        assert!(!req.remember_me);

        let req: LoginRequest = serde_json::from_str(
            r#"{"identifier":"karim_h","password":"pw","rememberMe":true}"#,
        )
        .unwrap();
        assert!(req.remember_me);
    }

    #[test]
    fn test_refresh_request_camel_case() {
        let req: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken":"opaque"}"#).unwrap();
        assert_eq!(req.refresh_token, "opaque");
    }
}
