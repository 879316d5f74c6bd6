//! Auth Middleware
//!
//! Role-gated admission for protected routes. A request walks a fixed
//! ladder - header present, signature valid, not expired, role allowed -
//! and the first missing rung decides the error. Verification is
//! stateless: no store round-trip happens before the handler runs.

use axum::body::Body;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::domain::value_object::Role;
use crate::error::AuthError;
use crate::token::{Claims, TokenVerifier};

/// Verified identity of the caller, inserted into request extensions
/// for downstream handlers
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn account_id(&self) -> kernel::id::AccountId {
        self.claims.account_id()
    }

    pub fn role(&self) -> Role {
        self.claims.role
    }
}

/// Middleware state: the verifier plus the role whitelist for this
/// route group
#[derive(Clone)]
pub struct RoleGuard {
    pub verifier: Arc<TokenVerifier>,
    pub allowed: Arc<[Role]>,
}

impl RoleGuard {
    pub fn new(verifier: Arc<TokenVerifier>, allowed: impl Into<Arc<[Role]>>) -> Self {
        Self {
            verifier,
            allowed: allowed.into(),
        }
    }

    /// Any authenticated role is admitted
    pub fn any_role(verifier: Arc<TokenVerifier>) -> Self {
        Self::new(verifier, vec![Role::Admin, Role::Editor, Role::Author])
    }
}

/// Extract the bearer token from the Authorization header
fn bearer_token(req: &Request<Body>) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Unauthenticated)?
        .to_str()
        .map_err(|_| AuthError::TokenInvalid)?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::Unauthenticated)
}

/// Run the admission ladder for one request
///
/// Order matters: expiry is checked before the role so a client with
/// a stale token gets `token_expired` (refreshable) rather than a
/// misleading `forbidden`.
pub fn authorize(guard: &RoleGuard, req: &Request<Body>) -> Result<AuthContext, AuthError> {
    let token = bearer_token(req)?;
    let claims = guard.verifier.verify(token)?;

    if !guard.allowed.contains(&claims.role) {
        return Err(AuthError::Forbidden);
    }

    Ok(AuthContext { claims })
}

/// Middleware that admits only the whitelisted roles
pub async fn require_roles(
    axum::extract::State(guard): axum::extract::State<RoleGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    match authorize(&guard, &req) {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            Ok(next.run(req).await)
        }
        Err(e) => Err(e.into_response()),
    }
}
