//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthConfig, PgAccountRepository, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use platform::lockout::LockoutPolicy;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Auth configuration
    let auth_config = build_auth_config()?;

    // CORS configuration (the Next.js admin frontend)
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/auth",
            auth_router(PgAccountRepository::new(pool.clone()), auth_config),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 31180));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Build the auth configuration from the environment
///
/// Debug builds fall back to a random signing secret; production
/// requires `AUTH_JWT_SECRET` (base64, 32 bytes) so tokens survive
/// restarts and scale across instances.
fn build_auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = if cfg!(debug_assertions) && env::var("AUTH_JWT_SECRET").is_err() {
        tracing::warn!("AUTH_JWT_SECRET not set; using a random secret (dev only)");
        AuthConfig::development()
    } else {
        let secret_b64 =
            env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set in production");
        let secret_bytes = Engine::decode(&general_purpose::STANDARD, &secret_b64)?;
        anyhow::ensure!(
            secret_bytes.len() == 32,
            "AUTH_JWT_SECRET must decode to exactly 32 bytes"
        );
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&secret_bytes);
        AuthConfig::new(secret)
    };

    if let Ok(pepper_b64) = env::var("AUTH_PASSWORD_PEPPER") {
        let pepper = Engine::decode(&general_purpose::STANDARD, &pepper_b64)?;
        config = config.with_pepper(pepper);
    }

    if let (Ok(max), Ok(secs)) = (
        env::var("AUTH_LOCKOUT_MAX_FAILURES"),
        env::var("AUTH_LOCKOUT_SECS"),
    ) {
        config = config.with_lockout(LockoutPolicy::new(max.parse()?, secs.parse()?));
    }

    Ok(config)
}
