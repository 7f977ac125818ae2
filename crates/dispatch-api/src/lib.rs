//! # dispatch-api — Axum API Service for the Dispatch Backend
//!
//! HTTP surface over the dispatch domain: admins manage packages and
//! transporter accounts, packages are assigned to transporters by
//! specialty, and transporters update the delivery status of their own
//! packages. Authentication is stateless JWT.
//!
//! ## API Surface
//!
//! | Prefix                       | Module                            | Access      |
//! |------------------------------|-----------------------------------|-------------|
//! | `/api/auth/login`            | [`routes::auth`]                  | public      |
//! | `/api/admin/packages/*`      | [`routes::admin_packages`]        | ADMIN       |
//! | `/api/admin/users`           | [`routes::admin_transporters`]    | ADMIN       |
//! | `/api/admin/transporters/*`  | [`routes::admin_transporters`]    | ADMIN       |
//! | `/api/transporter/packages/*`| [`routes::transporter_packages`]  | TRANSPORTER |
//! | `/health/*`, `/openapi.json` | here / [`openapi`]                | public      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! The login route additionally carries a rate limiter in front of the
//! handler. The auth middleware never rejects: it resolves the bearer
//! token into a caller identity when it can, and the handlers' role
//! requirements make the authorization decision.

pub mod auth;
pub mod bootstrap;
pub mod credentials;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

use crate::middleware::metrics::RequestMetrics;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the middleware stack
/// so they stay reachable without credentials or counters.
pub fn app(state: AppState) -> Router {
    let tokens = state.tokens.clone();
    let metrics = RequestMetrics::new();
    let login_limiter = RateLimiter::new(RateLimitConfig::default());

    // The login route takes raw credentials, so it alone sits behind the
    // rate limiter.
    let login = routes::auth::router()
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(Extension(login_limiter));

    let api = Router::new()
        .merge(login)
        .merge(routes::admin_packages::router())
        .merge(routes::admin_transporters::router())
        .merge(routes::transporter_packages::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(tokens))
        .layer(Extension(metrics))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application can serve traffic.
async fn readiness() -> &'static str {
    "ready"
}
