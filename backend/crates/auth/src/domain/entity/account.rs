//! Account Entity
//!
//! A single editorial account: identity, credentials, lockout
//! bookkeeping and the currently outstanding refresh token.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::client::LoginOrigin;
use platform::lockout::{LockoutDecision, LockoutPolicy};
use serde::Serialize;

use crate::domain::value_object::{AccountStatus, Email, PasswordDigest, Role, UserName};

/// Editorial account
///
/// The refresh-token pair of fields is always set and cleared
/// together: a hash without an expiry (or the reverse) is a bug.
#[derive(Debug, Clone)]
pub struct Account {
    pub account_id: AccountId,
    pub user_name: UserName,
    pub email: Email,
    pub password_digest: PasswordDigest,
    pub role: Role,
    pub status: AccountStatus,

    // Lockout bookkeeping
    pub failed_login_count: i16,
    pub locked_until: Option<DateTime<Utc>>,

    // Last successful login
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,

    // Outstanding refresh token (single-use, hash only)
    pub refresh_token_hash: Option<Vec<u8>>,
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    pub refresh_remember_me: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account
    pub fn new(
        user_name: UserName,
        email: Email,
        password_digest: PasswordDigest,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            user_name,
            email,
            password_digest,
            role,
            status: AccountStatus::Active,
            failed_login_count: 0,
            locked_until: None,
            last_login_at: None,
            last_login_ip: None,
            refresh_token_hash: None,
            refresh_token_expires_at: None,
            refresh_remember_me: false,
            created_at: now,
            updated_at: now,
        }
    }

    // ========================================================================
    // Lockout transitions
    // ========================================================================

    /// Check whether a login attempt may proceed
    ///
    /// An expired lockout counts as not locked; the counter is only
    /// reset by a successful login, so a still-wrong password after
    /// expiry re-locks on the very next failure.
    pub fn check_lockout(&self, now: DateTime<Utc>) -> LockoutDecision {
        match self.locked_until {
            Some(until) if until > now => {
                let remaining = (until - now)
                    .to_std()
                    .unwrap_or(std::time::Duration::from_secs(0));
                LockoutDecision::locked_for(remaining)
            }
            _ => LockoutDecision::allowed(),
        }
    }

    /// Record a failed login attempt
    ///
    /// Increments the counter and arms the lockout at the policy
    /// threshold. The counter saturates at the threshold so repeated
    /// failures during a lockout never extend the window arithmetic.
    pub fn record_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) {
        if self.failed_login_count < policy.max_failures as i16 {
            self.failed_login_count += 1;
        }
        if policy.triggers_lockout(self.failed_login_count as u16) {
            self.locked_until = Some(
                now + chrono::Duration::from_std(policy.lockout)
                    .unwrap_or_else(|_| chrono::Duration::minutes(15)),
            );
        }
        self.updated_at = now;
    }

    /// Record a successful login
    ///
    /// Clears the failure counter and lockout, stamps last-login
    /// metadata.
    pub fn record_login(&mut self, origin: &LoginOrigin, now: DateTime<Utc>) {
        self.failed_login_count = 0;
        self.locked_until = None;
        self.last_login_at = Some(now);
        self.last_login_ip = origin.ip_string();
        self.updated_at = now;
    }

    // ========================================================================
    // Refresh token transitions
    // ========================================================================

    /// Store a newly issued refresh token (hash + expiry together)
    pub fn set_refresh_token(
        &mut self,
        hash: Vec<u8>,
        expires_at: DateTime<Utc>,
        remember_me: bool,
    ) {
        self.refresh_token_hash = Some(hash);
        self.refresh_token_expires_at = Some(expires_at);
        self.refresh_remember_me = remember_me;
        self.updated_at = Utc::now();
    }

    /// Clear the outstanding refresh token (hash + expiry together)
    pub fn clear_refresh_token(&mut self) {
        self.refresh_token_hash = None;
        self.refresh_token_expires_at = None;
        self.updated_at = Utc::now();
    }

    /// Whether `hash` matches the outstanding, unexpired refresh token
    pub fn refresh_token_matches(&self, hash: &[u8], now: DateTime<Utc>) -> bool {
        match (&self.refresh_token_hash, self.refresh_token_expires_at) {
            (Some(stored), Some(expires)) if expires > now => {
                platform::crypto::constant_time_eq(stored, hash)
            }
            _ => false,
        }
    }

    /// Whether this account may authenticate
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Whether a session is currently open
    ///
    /// Login always stores a refresh token and logout always clears
    /// it, so the presence of the hash is the server-side session
    /// marker.
    pub fn has_open_session(&self) -> bool {
        self.refresh_token_hash.is_some()
    }

    /// Public projection for API responses
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            account_id: self.account_id,
            user_name: self.user_name.as_str().to_string(),
            email: self.email.as_str().to_string(),
            role: self.role,
            last_login_at: self.last_login_at,
        }
    }
}

/// Public account projection
///
/// Never carries the password digest or refresh token material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub account_id: AccountId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub last_login_at: Option<DateTime<Utc>>,
}
