//! Auth API Transport
//!
//! The trait keeps the client testable without a server; the reqwest
//! implementation is the production transport. Every call has a
//! bounded timeout - a hung backend becomes a `Network` error, never
//! a hung UI.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Public account profile as the server reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub account_id: String,
    pub user_name: String,
    pub email: String,
    pub role: String,
}

/// Token pair returned by login and refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: Option<DateTime<Utc>>,
    pub refresh_expires_at: Option<DateTime<Utc>>,
}

/// Session payload returned by login and refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub user: Profile,
    pub tokens: TokenPayload,
}

/// Auth API transport
#[trait_variant::make(AuthApi: Send)]
pub trait LocalAuthApi {
    async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<SessionPayload, SessionError>;

    async fn refresh(&self, refresh_token: &str) -> Result<SessionPayload, SessionError>;

    async fn logout(&self, access_token: &str) -> Result<(), SessionError>;

    async fn me(&self, access_token: &str) -> Result<Profile, SessionError>;
}

// ============================================================================
// Wire envelope
// ============================================================================

/// Response envelope shared by success and error responses
#[derive(Debug, Deserialize)]
struct WireEnvelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
    kind: Option<String>,
    retry_after_secs: Option<u64>,
}

impl<T> WireEnvelope<T> {
    fn into_result(self) -> Result<T, SessionError> {
        if self.success {
            self.data
                .ok_or_else(|| SessionError::Protocol("success envelope without data".to_string()))
        } else {
            Err(SessionError::from_wire(
                self.kind.as_deref(),
                self.message,
                self.retry_after_secs,
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MePayload {
    user: Profile,
}

// ============================================================================
// Reqwest implementation
// ============================================================================

/// HTTP transport against the auth API
pub struct HttpAuthApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SessionError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SessionError> {
        let envelope: WireEnvelope<T> = response
            .json()
            .await
            .map_err(|e| SessionError::Protocol(e.to_string()))?;
        envelope.into_result()
    }
}

fn transport_error(e: reqwest::Error) -> SessionError {
    SessionError::Network(e.to_string())
}

impl AuthApi for HttpAuthApi {
    async fn login(
        &self,
        identifier: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<SessionPayload, SessionError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "identifier": identifier,
                "password": password,
                "rememberMe": remember_me,
            }))
            .send()
            .await
            .map_err(transport_error)?;
        Self::parse(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<SessionPayload, SessionError> {
        let response = self
            .client
            .post(self.url("/api/auth/refresh"))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
            .map_err(transport_error)?;
        Self::parse(response).await
    }

    async fn logout(&self, access_token: &str) -> Result<(), SessionError> {
        let response = self
            .client
            .post(self.url("/api/auth/logout"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;
        let _: serde_json::Value = Self::parse(response).await?;
        Ok(())
    }

    async fn me(&self, access_token: &str) -> Result<Profile, SessionError> {
        let response = self
            .client
            .get(self.url("/api/auth/me"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;
        let payload: MePayload = Self::parse(response).await?;
        Ok(payload.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success() {
        let envelope: WireEnvelope<MePayload> = serde_json::from_str(
            r#"{
                "success": true,
                "data": {
                    "user": {
                        "accountId": "7e3f",
                        "userName": "karim_h",
                        "email": "karim@example.com",
                        "role": "author"
                    }
                }
            }"#,
        )
        .unwrap();

        let payload = envelope.into_result().unwrap();
        assert_eq!(payload.user.user_name, "karim_h");
    }

    #[test]
    fn test_envelope_error_with_retry() {
        let envelope: WireEnvelope<MePayload> = serde_json::from_str(
            r#"{
                "success": false,
                "message": "Account is temporarily locked",
                "kind": "account_locked",
                "retry_after_secs": 540
            }"#,
        )
        .unwrap();

        match envelope.into_result() {
            Err(SessionError::AccountLocked {
                retry_after_secs, ..
            }) => assert_eq!(retry_after_secs, Some(540)),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_success_without_data_is_protocol_error() {
        let envelope: WireEnvelope<MePayload> =
            serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(
            envelope.into_result(),
            Err(SessionError::Protocol(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = HttpAuthApi::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.url("/api/auth/login"), "http://localhost:8080/api/auth/login");
    }
}
