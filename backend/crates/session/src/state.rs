//! Session State Machine
//!
//! `Unauthenticated -> Trusted(Fresh)` on login,
//! `Trusted(Stale) -> Verifying -> Trusted(Fresh) | Unauthenticated`
//! on startup re-validation. `Trusted(Stale)` renders optimistically;
//! nothing user-visible blocks on the network.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::Profile;

/// The locally persisted session record
///
/// Stored and cleared as a single unit; there is never a token
/// without its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub access_expires_at: Option<DateTime<Utc>>,
    pub profile: Profile,
}

/// How much the cached profile can be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Restored from storage, not yet confirmed by the server
    Stale,
    /// Confirmed by the server this run
    Fresh,
}

/// Client session state
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Unauthenticated,
    Trusted {
        session: StoredSession,
        freshness: Freshness,
    },
    Verifying {
        session: StoredSession,
    },
}

impl SessionState {
    /// Whether the UI should render as signed-in
    ///
    /// `Verifying` counts: the optimistic render must not flicker to
    /// the login screen while the confirmation round-trip is in
    /// flight.
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Unauthenticated)
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Unauthenticated => None,
            Self::Trusted { session, .. } | Self::Verifying { session } => Some(&session.profile),
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated => None,
            Self::Trusted { session, .. } | Self::Verifying { session } => {
                Some(&session.access_token)
            }
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(
            self,
            Self::Trusted {
                freshness: Freshness::Fresh,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> StoredSession {
        StoredSession {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            access_expires_at: None,
            profile: Profile {
                account_id: "7e3f".to_string(),
                user_name: "karim_h".to_string(),
                email: "karim@example.com".to_string(),
                role: "author".to_string(),
            },
        }
    }

    #[test]
    fn test_verifying_still_renders_signed_in() {
        let state = SessionState::Verifying { session: session() };
        assert!(state.is_authenticated());
        assert!(!state.is_fresh());
        assert_eq!(state.access_token(), Some("token"));
    }

    #[test]
    fn test_unauthenticated_exposes_nothing() {
        let state = SessionState::Unauthenticated;
        assert!(!state.is_authenticated());
        assert!(state.profile().is_none());
        assert!(state.access_token().is_none());
    }

    #[test]
    fn test_stored_session_serde_roundtrip() {
        let original = session();
        let json = serde_json::to_string(&original).unwrap();
        let back: StoredSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
