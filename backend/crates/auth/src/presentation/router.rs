//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::AccountRepository;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{RoleGuard, require_roles};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAccountRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
///
/// `/logout` and `/me` sit behind the role guard (any authenticated
/// role); `/login` and `/refresh` are open by definition.
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: AccountRepository + Send + Sync + 'static,
{
    let state = AuthAppState::new(repo, config);
    let guard = RoleGuard::any_role(Arc::clone(&state.verifier));

    let protected = Router::new()
        .route("/logout", post(handlers::logout::<R>))
        .route("/me", get(handlers::me::<R>))
        .route_layer(middleware::from_fn_with_state(guard, require_roles));

    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .merge(protected)
        .with_state(state)
}
