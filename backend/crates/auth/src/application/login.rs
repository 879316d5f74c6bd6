//! Login Use Case
//!
//! Verifies credentials, enforces the failed-login lockout and issues
//! a token pair.

use std::sync::Arc;

use chrono::Utc;
use platform::client::LoginOrigin;

use crate::application::config::AuthConfig;
use crate::domain::entity::account::AccountProfile;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{LoginIdentifier, RawPassword};
use crate::error::{AuthError, AuthResult};
use crate::token::{TokenIssuer, TokenSet};

/// Login input
pub struct LoginInput {
    /// User name or email
    pub identifier: String,
    /// Password
    pub password: String,
    /// Remember me flag
    pub remember_me: bool,
}

/// Login output
pub struct LoginOutput {
    pub profile: AccountProfile,
    pub tokens: TokenSet,
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: AccountRepository,
{
    account_repo: Arc<R>,
    issuer: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(account_repo: Arc<R>, issuer: Arc<TokenIssuer>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            issuer,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput, origin: LoginOrigin) -> AuthResult<LoginOutput> {
        // A malformed identifier gets the same answer as a wrong
        // password: no field-level hints for enumeration.
        let identifier = LoginIdentifier::parse(&input.identifier)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let account = match &identifier {
            LoginIdentifier::UserName(user_name) => {
                self.account_repo.find_by_user_name(user_name).await?
            }
            LoginIdentifier::Email(email) => self.account_repo.find_by_email(email).await?,
        };
        let account = account.ok_or(AuthError::InvalidCredentials)?;

        // Lockout gate comes before any hashing work: a locked account
        // costs the attacker nothing but a clock read.
        let now = Utc::now();
        let decision = account.check_lockout(now);
        if !decision.allowed {
            return Err(AuthError::AccountLocked {
                retry_after: decision.retry_after.unwrap_or_default(),
            });
        }

        if !account.can_login() {
            return Err(AuthError::AccountInactive);
        }

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !account
            .password_digest
            .verify(&raw_password, self.config.pepper())
        {
            // Counter increment and lockout arming happen atomically in
            // the store; concurrent failures cannot lose updates.
            let status = self
                .account_repo
                .record_failed_attempt(&account.account_id, &self.config.lockout)
                .await?;
            if status.is_locked(now) {
                tracing::warn!(
                    account_id = %account.account_id,
                    failed_count = status.failed_login_count,
                    "Account locked after repeated failures"
                );
            }
            return Err(AuthError::InvalidCredentials);
        }

        self.account_repo
            .record_successful_login(&account.account_id, origin.ip_string().as_deref())
            .await?;

        let issued = self.issuer.issue(&account, input.remember_me)?;
        self.account_repo
            .store_refresh_token(
                &account.account_id,
                &issued.refresh_token_hash,
                issued.refresh_expires_at(),
                input.remember_me,
            )
            .await?;

        tracing::info!(
            account_id = %account.account_id,
            user_name = %account.user_name,
            role = %account.role,
            ip = origin.ip_string().as_deref().unwrap_or("unknown"),
            remember_me = input.remember_me,
            "Login succeeded"
        );

        Ok(LoginOutput {
            profile: account.profile(),
            tokens: issued.tokens,
        })
    }
}
