//! Logout Use Case
//!
//! Revokes the outstanding refresh token. Access tokens are stateless
//! and simply age out; the client discards its copy immediately.

use std::sync::Arc;

use kernel::id::AccountId;

use crate::domain::repository::AccountRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>) -> Self {
        Self { account_repo }
    }

    /// Idempotent: logging out twice is not an error
    pub async fn execute(&self, account_id: &AccountId) -> AuthResult<()> {
        self.account_repo.clear_refresh_token(account_id).await?;
        tracing::info!(account_id = %account_id, "Logged out");
        Ok(())
    }
}
