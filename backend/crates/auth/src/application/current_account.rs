//! Current Account Use Case
//!
//! Resolves verified token claims to a live account profile. This is
//! where stale tokens meet current reality: a deleted or disabled
//! account fails here even though the signature still checks out.

use std::sync::Arc;

use crate::domain::entity::account::AccountProfile;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::token::Claims;

/// Current account use case
pub struct CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
}

impl<R> CurrentAccountUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>) -> Self {
        Self { account_repo }
    }

    pub async fn execute(&self, claims: &Claims) -> AuthResult<AccountProfile> {
        let account = self
            .account_repo
            .find_by_id(&claims.account_id())
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if !account.can_login() {
            return Err(AuthError::AccountInactive);
        }

        // A logout clears the refresh token; an access token presented
        // after that belongs to a closed session even if its signature
        // and expiry still check out.
        if !account.has_open_session() {
            return Err(AuthError::TokenInvalid);
        }

        Ok(account.profile())
    }
}
