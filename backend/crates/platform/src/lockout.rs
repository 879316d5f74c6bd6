//! Account Lockout Policy
//!
//! Policy and decision types for failed-login throttling.
//! The stateful engine lives in the auth domain; these types only
//! describe the rules and the outcome of a check.

use std::time::Duration;

/// Lockout policy configuration
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Consecutive failures before the account locks
    pub max_failures: u16,
    /// How long a lockout lasts
    pub lockout: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            lockout: Duration::from_secs(15 * 60),
        }
    }
}

impl LockoutPolicy {
    pub fn new(max_failures: u16, lockout_secs: u64) -> Self {
        Self {
            max_failures,
            lockout: Duration::from_secs(lockout_secs),
        }
    }

    /// Whether `failed_count` consecutive failures trigger a lockout
    #[inline]
    pub fn triggers_lockout(&self, failed_count: u16) -> bool {
        failed_count >= self.max_failures
    }
}

/// Outcome of a lockout check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutDecision {
    /// Whether the attempt may proceed to password verification
    pub allowed: bool,
    /// Remaining lockout time when rejected
    pub retry_after: Option<Duration>,
}

impl LockoutDecision {
    /// Attempt may proceed
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after: None,
        }
    }

    /// Attempt rejected; the account unlocks after `retry_after`
    pub fn locked_for(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            retry_after: Some(retry_after),
        }
    }
}
