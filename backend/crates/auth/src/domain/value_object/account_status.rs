//! Account Status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an account
///
/// Disabled accounts keep their data but cannot sign in or
/// refresh a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Disabled,
}

impl AccountStatus {
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn to_id(self) -> i16 {
        match self {
            Self::Active => 0,
            Self::Disabled => 1,
        }
    }

    /// Whether this account may authenticate at all
    pub fn can_login(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}
