//! Presentation Layer

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use middleware::{AuthContext, RoleGuard, require_roles};
pub use router::{auth_router, auth_router_generic};
