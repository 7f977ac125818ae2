//! # Login Rate Limiting
//!
//! Fixed-window request limiter keyed by client address. Layered over the
//! login endpoint only: authenticated traffic is already gated by token
//! verification, while the login route accepts raw credentials and is the
//! one worth protecting from stuffing attempts.
//!
//! The key comes from `X-Forwarded-For` (first hop) when present, falling
//! back to a shared `"direct"` bucket.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;

use crate::error::{ErrorBody, ErrorDetail};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        // Tuned for a credential endpoint, not general traffic.
        Self {
            max_requests: 30,
            window_secs: 60,
        }
    }
}

/// Per-key window state.
#[derive(Debug)]
struct WindowState {
    count: u64,
    window_start: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl RateLimiter {
    /// Create a rate limiter with the given config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether a request under this key is allowed right now.
    fn check(&self, key: &str) -> bool {
        let mut windows = self.windows.lock();
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(WindowState {
            count: 0,
            window_start: now,
        });

        if now.duration_since(window.window_start).as_secs() >= self.config.window_secs {
            window.count = 0;
            window.window_start = now;
        }

        if window.count >= self.config.max_requests {
            false
        } else {
            window.count += 1;
            true
        }
    }
}

/// Middleware enforcing the per-client limit.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = request
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("direct")
            .to_string();

        if !limiter.check(&key) {
            tracing::warn!(client = %key, "rate limit exceeded on login endpoint");
            let body = ErrorBody {
                error: ErrorDetail {
                    code: "RATE_LIMITED".to_string(),
                    message: "rate limit exceeded".to_string(),
                    details: None,
                },
            };
            return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests: max,
            window_secs: 60,
        })
    }

    #[test]
    fn allows_up_to_the_limit() {
        let l = limiter(3);
        assert!(l.check("10.0.0.1"));
        assert!(l.check("10.0.0.1"));
        assert!(l.check("10.0.0.1"));
        assert!(!l.check("10.0.0.1"));
    }

    #[test]
    fn keys_are_independent() {
        let l = limiter(1);
        assert!(l.check("10.0.0.1"));
        assert!(!l.check("10.0.0.1"));
        assert!(l.check("10.0.0.2"));
    }

    #[test]
    fn default_config_is_login_tuned() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 30);
        assert_eq!(config.window_secs, 60);
    }
}
