//! Auth Configuration

use platform::lockout::LockoutPolicy;
use std::time::Duration;

/// Authentication configuration
///
/// Loaded once at startup and shared via `Arc`.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for access-token signing (HS256)
    pub jwt_secret: [u8; 32],

    /// Access token TTL
    pub access_ttl: Duration,
    /// Access token TTL with "remember me"
    pub access_ttl_remember: Duration,

    /// Refresh token TTL
    pub refresh_ttl: Duration,
    /// Refresh token TTL with "remember me"
    pub refresh_ttl_remember: Duration,

    /// Failed-login lockout policy
    pub lockout: LockoutPolicy,

    /// Optional application-wide password pepper
    pub password_pepper: Option<Vec<u8>>,
}

impl AuthConfig {
    pub fn new(jwt_secret: [u8; 32]) -> Self {
        Self {
            jwt_secret,
            access_ttl: Duration::from_secs(15 * 60),
            access_ttl_remember: Duration::from_secs(24 * 60 * 60),
            refresh_ttl: Duration::from_secs(12 * 60 * 60),
            refresh_ttl_remember: Duration::from_secs(30 * 24 * 60 * 60),
            lockout: LockoutPolicy::default(),
            password_pepper: None,
        }
    }

    /// Generate a random signing secret
    ///
    /// Tokens do not survive a restart with this; production loads the
    /// secret from the environment instead.
    pub fn with_random_secret() -> Self {
        let bytes = platform::crypto::random_bytes(32);
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&bytes);
        Self::new(secret)
    }

    /// Development configuration (random secret, default TTLs)
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    pub fn with_pepper(mut self, pepper: Vec<u8>) -> Self {
        self.password_pepper = Some(pepper);
        self
    }

    pub fn with_lockout(mut self, lockout: LockoutPolicy) -> Self {
        self.lockout = lockout;
        self
    }

    /// Pepper as a byte slice, if configured
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Access TTL for the given remember-me choice
    pub fn access_ttl_for(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.access_ttl_remember
        } else {
            self.access_ttl
        }
    }

    /// Refresh TTL for the given remember-me choice
    pub fn refresh_ttl_for(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.refresh_ttl_remember
        } else {
            self.refresh_ttl
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("access_ttl", &self.access_ttl)
            .field("access_ttl_remember", &self.access_ttl_remember)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("refresh_ttl_remember", &self.refresh_ttl_remember)
            .field("lockout", &self.lockout)
            .field(
                "password_pepper",
                &self.password_pepper.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
