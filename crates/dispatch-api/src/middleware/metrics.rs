//! # Request Metrics
//!
//! Lightweight request counters using atomics: total requests, error
//! responses, and authentication rejections, readable in-process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

/// Shared counters.
#[derive(Debug, Clone, Default)]
pub struct RequestMetrics {
    requests: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
    auth_rejections: Arc<AtomicU64>,
}

impl RequestMetrics {
    /// Create a fresh metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total requests observed.
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Responses with a 4xx/5xx status.
    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Responses with a 401/403 status.
    pub fn auth_rejections(&self) -> u64 {
        self.auth_rejections.load(Ordering::Relaxed)
    }
}

/// Middleware incrementing the counters around each request.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let metrics = request.extensions().get::<RequestMetrics>().cloned();

    let response = next.run(request).await;

    if let Some(m) = metrics {
        m.requests.fetch_add(1, Ordering::Relaxed);
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            m.errors.fetch_add(1, Ordering::Relaxed);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            m.auth_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    response
}
