//! # dispatch-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the
//! environment: `PORT`, `JWT_SECRET`, `TOKEN_TTL_SECS`, `ADMIN_PASSWORD`,
//! and optionally `DATABASE_URL` for durable persistence.

use dispatch_api::state::{AppConfig, DEFAULT_TOKEN_TTL_SECS, DEV_JWT_SECRET};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let jwt_secret = match std::env::var("JWT_SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            tracing::warn!(
                "JWT_SECRET not set — using the development secret. \
                 Tokens are forgeable; do not run like this in production."
            );
            DEV_JWT_SECRET.to_string()
        }
    };

    let token_ttl_secs: u64 = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

    let default_admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

    let config = AppConfig {
        port,
        jwt_secret,
        token_ttl_secs,
        default_admin_password,
    };

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = dispatch_api::db::init_pool().await.map_err(|e| {
        tracing::error!("database initialization failed: {e}");
        e
    })?;

    // Hydrate state and seed the default admin.
    let state = dispatch_api::bootstrap::bootstrap(config, db_pool)
        .await
        .map_err(|e| {
            tracing::error!("bootstrap failed: {e}");
            e
        })?;

    let app = dispatch_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("dispatch API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
