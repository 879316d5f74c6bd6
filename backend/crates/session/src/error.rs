//! Session Client Errors
//!
//! Server-reported failures keep the server's message so the UI can
//! show it verbatim; transport failures get a generic fallback so raw
//! connection errors never reach the user.

use thiserror::Error;

/// Session client error
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("{message}")]
    AccountLocked {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("{message}")]
    AccountInactive { message: String },

    #[error("Session expired")]
    TokenExpired,

    #[error("Session is no longer valid")]
    TokenInvalid,

    #[error("{message}")]
    Forbidden { message: String },

    #[error("Not signed in")]
    Unauthenticated,

    /// Timeout or unreachable server
    #[error("Network failure: {0}")]
    Network(String),

    /// Local persistence failed
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Response did not match the expected envelope
    #[error("Unexpected server response: {0}")]
    Protocol(String),
}

impl SessionError {
    /// Map a server-reported error kind to a variant
    pub(crate) fn from_wire(
        kind: Option<&str>,
        message: Option<String>,
        retry_after_secs: Option<u64>,
    ) -> Self {
        let message = message.unwrap_or_else(|| "Request failed".to_string());
        match kind {
            Some("invalid_credentials") => Self::InvalidCredentials { message },
            Some("account_locked") => Self::AccountLocked {
                message,
                retry_after_secs,
            },
            Some("account_inactive") => Self::AccountInactive { message },
            Some("token_expired") => Self::TokenExpired,
            Some("token_invalid") => Self::TokenInvalid,
            Some("forbidden") => Self::Forbidden { message },
            Some("unauthenticated") => Self::Unauthenticated,
            _ => Self::Protocol(message),
        }
    }

    /// Message suitable for direct display
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => {
                "Unable to reach the server. Check your connection and try again.".to_string()
            }
            Self::Storage(_) | Self::Protocol(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether the failure came from the transport, not the server
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
