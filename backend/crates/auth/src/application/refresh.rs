//! Refresh Use Case
//!
//! Redeems a single-use refresh token for a fresh token pair. The
//! redemption is a store-side compare-and-clear, so a replayed token
//! finds nothing to match and fails.

use std::sync::Arc;

use crate::domain::entity::account::AccountProfile;
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::token::{TokenIssuer, TokenSet};

/// Refresh output
pub struct RefreshOutput {
    pub profile: AccountProfile,
    pub tokens: TokenSet,
}

/// Refresh use case
pub struct RefreshUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
    issuer: Arc<TokenIssuer>,
}

impl<R> RefreshUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>, issuer: Arc<TokenIssuer>) -> Self {
        Self {
            account_repo,
            issuer,
        }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<RefreshOutput> {
        let token_hash = platform::crypto::sha256(refresh_token.as_bytes());

        let account = self
            .account_repo
            .consume_refresh_token(&token_hash)
            .await?
            .ok_or_else(|| {
                // Unknown, expired or already redeemed - a replay of a
                // rotated token lands here.
                tracing::warn!("Refresh token redemption failed");
                AuthError::TokenInvalid
            })?;

        if !account.can_login() {
            // Token already consumed above; a disabled account cannot
            // recover its session.
            tracing::warn!(account_id = %account.account_id, "Refresh on inactive account");
            return Err(AuthError::AccountInactive);
        }

        // The remember-me choice made at login carries through every
        // rotation.
        let remember_me = account.refresh_remember_me;
        let issued = self.issuer.issue(&account, remember_me)?;
        self.account_repo
            .store_refresh_token(
                &account.account_id,
                &issued.refresh_token_hash,
                issued.refresh_expires_at(),
                remember_me,
            )
            .await?;

        tracing::debug!(account_id = %account.account_id, "Token pair rotated");

        Ok(RefreshOutput {
            profile: account.profile(),
            tokens: issued.tokens,
        })
    }
}
