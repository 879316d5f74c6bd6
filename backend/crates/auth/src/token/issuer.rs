//! Token Issuer
//!
//! Issues signed access tokens (HS256) paired with opaque single-use
//! refresh tokens. TTLs depend on the caller's remember-me choice.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::error::{AuthError, AuthResult};
use crate::token::claims::{Claims, TokenSet};

/// Refresh token entropy in bytes (256 bits)
const REFRESH_TOKEN_BYTES: usize = 32;

/// Issues access/refresh token pairs
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    access_ttl: std::time::Duration,
    access_ttl_remember: std::time::Duration,
    refresh_ttl: std::time::Duration,
    refresh_ttl_remember: std::time::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.jwt_secret),
            access_ttl: config.access_ttl,
            access_ttl_remember: config.access_ttl_remember,
            refresh_ttl: config.refresh_ttl,
            refresh_ttl_remember: config.refresh_ttl_remember,
        }
    }

    /// Issue a fresh token pair for an authenticated account
    pub fn issue(&self, account: &Account, remember_me: bool) -> AuthResult<IssuedTokens> {
        let now = Utc::now();
        let access_ttl = if remember_me {
            self.access_ttl_remember
        } else {
            self.access_ttl
        };
        let refresh_ttl = if remember_me {
            self.refresh_ttl_remember
        } else {
            self.refresh_ttl
        };

        let access_expires_at = now + to_chrono(access_ttl);
        let refresh_expires_at = now + to_chrono(refresh_ttl);

        let claims = Claims::new(
            account.account_id,
            account.role,
            account.user_name.as_str().to_string(),
            now,
            access_expires_at,
        );

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))?;

        let refresh_token = platform::crypto::random_token(REFRESH_TOKEN_BYTES);
        let refresh_token_hash = platform::crypto::sha256(refresh_token.as_bytes()).to_vec();

        Ok(IssuedTokens {
            tokens: TokenSet {
                access_token,
                refresh_token,
                access_expires_at,
                refresh_expires_at,
            },
            refresh_token_hash,
        })
    }
}

/// Issued pair plus the digest the store keeps
pub struct IssuedTokens {
    /// What goes back to the client
    pub tokens: TokenSet,
    /// SHA-256 of the refresh token, for persistence
    pub refresh_token_hash: Vec<u8>,
}

impl IssuedTokens {
    pub fn refresh_expires_at(&self) -> DateTime<Utc> {
        self.tokens.refresh_expires_at
    }
}

fn to_chrono(d: std::time::Duration) -> ChronoDuration {
    ChronoDuration::from_std(d).unwrap_or_else(|_| ChronoDuration::minutes(15))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{Email, RawPassword, Role, UserName};

    fn test_account() -> Account {
        let raw = RawPassword::new("CorrectHorse#9".to_string()).unwrap();
        Account::new(
            UserName::new("karim_h").unwrap(),
            Email::new("karim@example.com").unwrap(),
            raw.into_digest(None).unwrap(),
            Role::Author,
        )
    }

    #[test]
    fn test_issue_produces_distinct_refresh_tokens() {
        let config = AuthConfig::development();
        let issuer = TokenIssuer::new(&config);
        let account = test_account();

        let a = issuer.issue(&account, false).unwrap();
        let b = issuer.issue(&account, false).unwrap();
        assert_ne!(a.tokens.refresh_token, b.tokens.refresh_token);
        assert_ne!(a.refresh_token_hash, b.refresh_token_hash);
    }

    #[test]
    fn test_hash_matches_token() {
        let config = AuthConfig::development();
        let issuer = TokenIssuer::new(&config);
        let issued = issuer.issue(&test_account(), false).unwrap();

        let recomputed = platform::crypto::sha256(issued.tokens.refresh_token.as_bytes());
        assert_eq!(issued.refresh_token_hash, recomputed.to_vec());
    }

    #[test]
    fn test_remember_me_extends_ttls() {
        let config = AuthConfig::development();
        let issuer = TokenIssuer::new(&config);
        let account = test_account();

        let short = issuer.issue(&account, false).unwrap();
        let long = issuer.issue(&account, true).unwrap();
        assert!(long.tokens.access_expires_at > short.tokens.access_expires_at);
        assert!(long.tokens.refresh_expires_at > short.tokens.refresh_expires_at);
    }
}
