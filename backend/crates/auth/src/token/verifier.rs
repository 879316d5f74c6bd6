//! Token Verifier
//!
//! Stateless verification of access tokens. The only state it holds
//! is the signing secret; no store round-trip happens here.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};

use crate::application::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::token::claims::Claims;

/// Clock skew tolerance in seconds
const LEEWAY_SECS: u64 = 5;

/// Verifies access tokens
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;
        validation.validate_exp = true;
        Self {
            decoding_key: DecodingKey::from_secret(&config.jwt_secret),
            validation,
        }
    }

    /// Verify a token and return its claims
    ///
    /// Expiry is the one failure the client can act on (by refreshing),
    /// so it gets its own variant; every other defect is `TokenInvalid`.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }
}
