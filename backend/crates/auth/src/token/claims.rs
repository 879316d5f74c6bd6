//! Access Token Claims

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_object::Role;

/// JWT claims carried by an access token
///
/// Kept deliberately small: the token is self-contained for stateless
/// verification, but anything that can go stale (status, email) is
/// looked up per request instead of baked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account ID
    pub sub: Uuid,
    /// Role code at issuance
    pub role: Role,
    /// Display user name at issuance
    pub uname: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn new(
        account_id: AccountId,
        role: Role,
        user_name: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: account_id.into_uuid(),
            role,
            uname: user_name,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        AccountId::from_uuid(self.sub)
    }
}

/// A freshly issued access/refresh token pair
///
/// The refresh token is opaque; only its SHA-256 digest is persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}
