//! Password Value Objects
//!
//! Domain-level wrappers around the platform hashing primitives.
//! `RawPassword` carries a validated clear-text submission and is
//! zeroized on drop; `PasswordDigest` is the stored Argon2id digest.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};

/// A validated clear-text password submission
///
/// Construction enforces the password policy; the inner value is
/// zeroized when dropped.
#[derive(Debug)]
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate and wrap a submitted password
    pub fn new(raw: String) -> AppResult<Self> {
        let clear = ClearTextPassword::new(raw).map_err(|e| match e {
            PasswordPolicyError::TooShort { min, .. } => {
                AppError::bad_request(format!("Password must be at least {min} characters"))
            }
            PasswordPolicyError::TooLong { max, .. } => {
                AppError::bad_request(format!("Password must be at most {max} characters"))
            }
            PasswordPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
            }
            PasswordPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
            }
        })?;
        Ok(Self(clear))
    }

    /// Hash with Argon2id for storage
    pub fn into_digest(&self, pepper: Option<&[u8]>) -> AppResult<PasswordDigest> {
        let hashed = self
            .0
            .hash(pepper)
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))?;
        Ok(PasswordDigest(hashed))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

/// A stored password digest (PHC string)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(HashedPassword);

impl PasswordDigest {
    /// Wrap a digest loaded from the database
    ///
    /// Never fails: a malformed stored value simply verifies as
    /// `false`, indistinguishable from a wrong password.
    pub fn from_stored(s: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored_unchecked(s))
    }

    /// PHC string for storage
    pub fn as_str(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Verify a submitted password against this digest
    pub fn verify(&self, password: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(password.inner(), pepper)
    }
}
