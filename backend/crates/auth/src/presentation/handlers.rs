//! Auth HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{CurrentAccountUseCase, LoginUseCase, LogoutUseCase, RefreshUseCase};
use crate::application::login::LoginInput;
use crate::domain::repository::AccountRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{
    ApiEnvelope, LoginRequest, MeResponse, RefreshRequest, SessionResponse,
};
use crate::presentation::middleware::AuthContext;
use crate::token::{TokenIssuer, TokenVerifier};

/// Shared handler state
///
/// The issuer and verifier are built once from the config so the
/// signing keys are not re-derived per request.
pub struct AuthAppState<R>
where
    R: AccountRepository,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub issuer: Arc<TokenIssuer>,
    pub verifier: Arc<TokenVerifier>,
}

impl<R> AuthAppState<R>
where
    R: AccountRepository,
{
    pub fn new(repo: R, config: AuthConfig) -> Self {
        let issuer = Arc::new(TokenIssuer::new(&config));
        let verifier = Arc::new(TokenVerifier::new(&config));
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
            issuer,
            verifier,
        }
    }
}

// derive(Clone) would demand R: Clone even though only Arcs are cloned
impl<R> Clone for AuthAppState<R>
where
    R: AccountRepository,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            issuer: self.issuer.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

/// POST /login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<ApiEnvelope<SessionResponse>>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    // プロキシ経由のときは X-Forwarded-For を優先
    let origin = platform::client::extract_origin(&headers, Some(addr.ip()));

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.issuer.clone(),
        state.config.clone(),
    );
    let output = use_case
        .execute(
            LoginInput {
                identifier: body.identifier,
                password: body.password,
                remember_me: body.remember_me,
            },
            origin,
        )
        .await?;

    Ok(Json(ApiEnvelope::ok(SessionResponse {
        user: output.profile,
        tokens: output.tokens,
    })))
}

/// POST /logout (requires any authenticated role)
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    axum::Extension(ctx): axum::Extension<AuthContext>,
) -> AuthResult<Json<ApiEnvelope<serde_json::Value>>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.repo.clone());
    use_case.execute(&ctx.account_id()).await?;

    Ok(Json(ApiEnvelope::ok(serde_json::json!({}))))
}

/// POST /refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    Json(body): Json<RefreshRequest>,
) -> AuthResult<Json<ApiEnvelope<SessionResponse>>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = RefreshUseCase::new(state.repo.clone(), state.issuer.clone());
    let output = use_case.execute(&body.refresh_token).await?;

    Ok(Json(ApiEnvelope::ok(SessionResponse {
        user: output.profile,
        tokens: output.tokens,
    })))
}

/// GET /me (requires any authenticated role)
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    axum::Extension(ctx): axum::Extension<AuthContext>,
) -> AuthResult<Json<ApiEnvelope<MeResponse>>>
where
    R: AccountRepository + Send + Sync + 'static,
{
    let use_case = CurrentAccountUseCase::new(state.repo.clone());
    let profile = use_case.execute(&ctx.claims).await?;

    Ok(Json(ApiEnvelope::ok(MeResponse { user: profile })))
}
