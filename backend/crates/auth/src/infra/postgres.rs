//! PostgreSQL Repository Implementation
//!
//! The lockout counter and refresh-token redemption are single UPDATE
//! statements: the row lock makes them atomic under concurrency, so
//! there is no read-modify-write window to race through.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::lockout::LockoutPolicy;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, LockoutStatus};
use crate::domain::value_object::{
    AccountStatus, Email, PasswordDigest, Role, UserName,
};
use crate::error::{AuthError, AuthResult};

const ACCOUNT_COLUMNS: &str = r#"
    account_id,
    user_name,
    user_name_canonical,
    email,
    password_digest,
    role,
    status,
    failed_login_count,
    locked_until,
    last_login_at,
    last_login_ip,
    refresh_token_hash,
    refresh_token_expires_at,
    refresh_remember_me,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select(where_clause: &str) -> String {
        format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {where_clause}")
    }
}

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                account_id,
                user_name,
                user_name_canonical,
                email,
                password_digest,
                role,
                status,
                failed_login_count,
                locked_until,
                last_login_at,
                last_login_ip,
                refresh_token_hash,
                refresh_token_expires_at,
                refresh_remember_me,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(account.account_id.as_uuid())
        .bind(account.user_name.as_str())
        .bind(account.user_name.canonical())
        .bind(account.email.as_str())
        .bind(account.password_digest.as_str())
        .bind(account.role.to_id())
        .bind(account.status.to_id())
        .bind(account.failed_login_count)
        .bind(account.locked_until)
        .bind(account.last_login_at)
        .bind(account.last_login_ip.as_deref())
        .bind(account.refresh_token_hash.as_deref())
        .bind(account.refresh_token_expires_at)
        .bind(account.refresh_remember_me)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&Self::select("account_id = $1"))
            .bind(account_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&Self::select("user_name_canonical = $1"))
            .bind(user_name.canonical())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&Self::select("email = $1"))
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn record_failed_attempt(
        &self,
        account_id: &AccountId,
        policy: &LockoutPolicy,
    ) -> AuthResult<LockoutStatus> {
        // Increment, saturate and arm in one statement. LEAST caps the
        // counter at the threshold; the CASE arms the lockout exactly
        // when the capped counter reaches it.
        let locked_until_if_armed = Utc::now()
            + chrono::Duration::from_std(policy.lockout)
                .unwrap_or_else(|_| chrono::Duration::minutes(15));

        let row = sqlx::query_as::<_, (i16, Option<DateTime<Utc>>)>(
            r#"
            UPDATE accounts SET
                failed_login_count = LEAST(failed_login_count + 1, $2),
                locked_until = CASE
                    WHEN LEAST(failed_login_count + 1, $2) >= $2 THEN $3
                    ELSE locked_until
                END,
                updated_at = now()
            WHERE account_id = $1
            RETURNING failed_login_count, locked_until
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(policy.max_failures as i16)
        .bind(locked_until_if_armed)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AuthError::Internal("Account vanished while recording failure".into()))?;

        Ok(LockoutStatus {
            failed_login_count: row.0,
            locked_until: row.1,
        })
    }

    async fn record_successful_login(
        &self,
        account_id: &AccountId,
        login_ip: Option<&str>,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = now(),
                last_login_ip = $2,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(login_ip)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn store_refresh_token(
        &self,
        account_id: &AccountId,
        token_hash: &[u8],
        expires_at: DateTime<Utc>,
        remember_me: bool,
    ) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                refresh_token_hash = $2,
                refresh_token_expires_at = $3,
                refresh_remember_me = $4,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(token_hash)
        .bind(expires_at)
        .bind(remember_me)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume_refresh_token(&self, token_hash: &[u8]) -> AuthResult<Option<Account>> {
        // Compare-and-clear: the match and the clear are the same
        // statement, so two concurrent redemptions of one token cannot
        // both succeed. RETURNING yields the post-update row; the
        // remember flag survives for the rotation that follows.
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            r#"
            UPDATE accounts SET
                refresh_token_hash = NULL,
                refresh_token_expires_at = NULL,
                updated_at = now()
            WHERE refresh_token_hash = $1
              AND refresh_token_expires_at > now()
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn clear_refresh_token(&self, account_id: &AccountId) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE accounts SET
                refresh_token_hash = NULL,
                refresh_token_expires_at = NULL,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_status(
        &self,
        account_id: &AccountId,
        status: AccountStatus,
    ) -> AuthResult<()> {
        // Disabling also revokes the outstanding refresh token so the
        // session cannot be renewed.
        sqlx::query(
            r#"
            UPDATE accounts SET
                status = $2,
                refresh_token_hash = CASE WHEN $3 THEN NULL ELSE refresh_token_hash END,
                refresh_token_expires_at = CASE WHEN $3 THEN NULL ELSE refresh_token_expires_at END,
                updated_at = now()
            WHERE account_id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .bind(status.to_id())
        .bind(!status.can_login())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    account_id: Uuid,
    user_name: String,
    user_name_canonical: String,
    email: String,
    password_digest: String,
    role: i16,
    status: i16,
    failed_login_count: i16,
    locked_until: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    last_login_ip: Option<String>,
    refresh_token_hash: Option<Vec<u8>>,
    refresh_token_expires_at: Option<DateTime<Utc>>,
    refresh_remember_me: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = Role::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Unknown role id {}", self.role)))?;
        let status = AccountStatus::from_id(self.status)
            .ok_or_else(|| AuthError::Internal(format!("Unknown status id {}", self.status)))?;

        Ok(Account {
            account_id: AccountId::from_uuid(self.account_id),
            user_name: UserName::from_db(self.user_name, self.user_name_canonical),
            email: Email::from_db(self.email),
            // A malformed stored digest (e.g. a legacy value) verifies
            // as false later instead of failing the read.
            password_digest: PasswordDigest::from_stored(self.password_digest),
            role,
            status,
            failed_login_count: self.failed_login_count,
            locked_until: self.locked_until,
            last_login_at: self.last_login_at,
            last_login_ip: self.last_login_ip,
            refresh_token_hash: self.refresh_token_hash,
            refresh_token_expires_at: self.refresh_token_expires_at,
            refresh_remember_me: self.refresh_remember_me,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
