//! Ingress middleware: size limits, rate limiting, host allow-listing,
//! per-request timeout, and CORS decoration.
//!
//! Each concern is a small function the pipeline calls in sequence, rather
//! than a generic middleware trait object chain.

mod cors;
mod host_allow;
mod rate_limit;
mod size_guard;

pub use cors::{cors_headers, is_preflight};
pub use host_allow::host_is_allowed;
pub use rate_limit::{Decision, RateLimiter};
pub use size_guard::{check_body_size, check_header_bytes};

/// Ingress-wide tunables. `allowed_hosts` empty means "allow any Host" and
/// `cors_allowed_origins` defaults to `["*"]`.
#[derive(Debug, Clone)]
pub struct MiddlewareConfig {
    pub max_request_size: usize,
    pub max_header_bytes: usize,
    pub rate_limit_requests: u32,
    pub rate_limit_window_seconds: u64,
    pub allowed_hosts: Vec<String>,
    pub request_timeout_seconds: u64,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1_048_576,
            max_header_bytes: 8192,
            rate_limit_requests: 100,
            rate_limit_window_seconds: 60,
            allowed_hosts: Vec::new(),
            request_timeout_seconds: 30,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}
