//! Session Client
//!
//! Client-side session lifecycle for the admin frontend: a locally
//! persisted session record, optimistic restore on startup, background
//! re-validation against the auth API and single-use refresh handling.
//!
//! The moving parts are kept separately testable:
//! - `state` - the explicit session state machine
//! - `storage` - where the record lives (memory or file)
//! - `api` - the transport trait plus its reqwest implementation
//! - `client` - the orchestrator tying the three together

pub mod api;
pub mod client;
pub mod error;
pub mod state;
pub mod storage;

pub use api::{AuthApi, HttpAuthApi, Profile, SessionPayload};
pub use client::{ClientConfig, SessionClient};
pub use error::SessionError;
pub use state::{Freshness, SessionState, StoredSession};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
