//! # HTTP Middleware
//!
//! - [`rate_limit`] — fixed-window request limiter, applied to the login
//!   endpoint as a credential-stuffing guard.
//! - [`metrics`] — request/error counters.

pub mod metrics;
pub mod rate_limit;
