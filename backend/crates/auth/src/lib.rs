//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `token/` - Access-token signing and verification
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Login with username-or-email + password
//! - Bearer access tokens (HS256) with opaque single-use refresh tokens
//! - Role-based route guards (Admin, Editor, Author)
//! - Automatic lockout after failed login attempts
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Refresh tokens stored as SHA-256 digests, rotated on every use
//! - Lockout counter updated atomically in the store
//! - Credential errors never reveal which field was wrong

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;
pub mod token;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAccountRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAccountRepository as AccountStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
