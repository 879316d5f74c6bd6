//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::lockout::LockoutPolicy;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{AccountStatus, Email, UserName};
use crate::error::AuthResult;

/// Lockout state after a recorded failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutStatus {
    pub failed_login_count: i16,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutStatus {
    /// Whether the account is locked as of `now`
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// Account repository trait
///
/// The failure and refresh-token operations are atomic on the store:
/// concurrent callers must not be able to interleave a read-modify-write
/// on the failure counter or redeem the same refresh token twice.
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create a new account
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find account by user name (canonical form)
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>>;

    /// Find account by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Atomically record a failed login attempt
    ///
    /// Increments the counter (saturating at the policy threshold) and
    /// arms the lockout when the threshold is reached, in a single
    /// store-side operation. Returns the resulting lockout state.
    async fn record_failed_attempt(
        &self,
        account_id: &AccountId,
        policy: &LockoutPolicy,
    ) -> AuthResult<LockoutStatus>;

    /// Record a successful login
    ///
    /// Resets the failure counter, clears any lockout and stamps
    /// last-login metadata in one operation.
    async fn record_successful_login(
        &self,
        account_id: &AccountId,
        login_ip: Option<&str>,
    ) -> AuthResult<()>;

    /// Replace the outstanding refresh token
    async fn store_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: &[u8],
        expires_at: DateTime<Utc>,
        remember_me: bool,
    ) -> AuthResult<()>;

    /// Atomically redeem a refresh token by its hash
    ///
    /// Clears the stored hash in the same operation that matches it, so
    /// a token can be redeemed exactly once. Returns the owning account,
    /// or `None` when the hash is unknown, already redeemed or expired.
    async fn consume_refresh_token(&self, token_hash: &[u8]) -> AuthResult<Option<Account>>;

    /// Clear the outstanding refresh token (logout)
    async fn clear_refresh_token(&self, account_id: &AccountId) -> AuthResult<()>;

    /// Change the account's lifecycle status
    async fn update_status(&self, account_id: &AccountId, status: AccountStatus)
    -> AuthResult<()>;
}
