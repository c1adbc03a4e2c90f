//! Request pipeline: binds the ingress middleware chain to the matcher and
//! the mock responder / proxy client.
//!
//! Every middleware check and dispatch outcome funnels through one
//! `PipelineError` so no per-request failure can escape the pipeline
//! boundary uncaught.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{HeaderMap, Request, Response, StatusCode};
use thiserror::Error;

use crate::matcher::{find_match, MatchRequest};
use crate::middleware::{
    check_body_size, check_header_bytes, cors_headers, host_is_allowed, is_preflight, Decision,
    MiddlewareConfig, RateLimiter,
};
use crate::config::RuleAction;
use crate::proxy::{forward, ProxyError};
use crate::response::build_mock;
use crate::store::RuleStore;

/// Every per-request failure the pipeline can produce. Each variant knows
/// its own disposition; `into_response` is the single conversion point.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("request body of {0} bytes exceeds the configured limit")]
    RequestTooLarge(usize),
    #[error("request headers exceed the configured limit")]
    HeadersTooLarge,
    #[error("rate limit exceeded, retry after {0}s")]
    RateLimited(u64),
    #[error("host `{0:?}` is not in the allow-list")]
    InvalidHost(Option<String>),
    #[error("request exceeded its deadline")]
    RequestTimeout,
    #[error("no rule matched the request")]
    NoRuleMatched,
    #[error("proxy target failed SSRF validation")]
    UnsafeProxyURL,
    #[error("upstream transport failure: {0}")]
    ProxyTransportFailure(String),
    #[error("upstream request timed out")]
    UpstreamTimeout,
}

impl PipelineError {
    fn status(&self) -> StatusCode {
        match self {
            PipelineError::RequestTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            PipelineError::HeadersTooLarge => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            PipelineError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            PipelineError::InvalidHost(_) => StatusCode::BAD_REQUEST,
            PipelineError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            PipelineError::NoRuleMatched => StatusCode::NOT_FOUND,
            PipelineError::UnsafeProxyURL => StatusCode::BAD_REQUEST,
            PipelineError::ProxyTransportFailure(_) => StatusCode::BAD_GATEWAY,
            PipelineError::UpstreamTimeout => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> &'static [u8] {
        match self {
            PipelineError::RequestTooLarge(_) => b"Request entity too large",
            PipelineError::NoRuleMatched => b"No matching rule found",
            PipelineError::UnsafeProxyURL => b"Invalid proxy URL",
            PipelineError::ProxyTransportFailure(_) | PipelineError::UpstreamTimeout => {
                b"Bad gateway"
            }
            _ => b"",
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let retry_after = match &self {
            PipelineError::RateLimited(secs) => Some(*secs),
            _ => None,
        };
        let mut builder = Response::builder().status(status);
        if let Some(secs) = retry_after {
            builder = builder.header("retry-after", secs.to_string());
        }
        builder
            .body(Full::new(Bytes::from_static(self.body())))
            .expect("status is always a valid response status")
    }
}

/// Everything the pipeline needs that outlives a single request.
pub struct PipelineState {
    pub store: Arc<RuleStore>,
    pub rate_limiter: RateLimiter,
    pub config: MiddlewareConfig,
}

impl PipelineState {
    pub fn new(store: Arc<RuleStore>, config: MiddlewareConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit_requests, config.rate_limit_window_seconds);
        Self {
            store,
            rate_limiter,
            config,
        }
    }
}

/// Handle one inbound request end to end: apply the ingress middleware
/// chain, then dispatch through the matcher. Never returns `Err`: every
/// failure is converted to a response before returning, and CORS
/// decoration is applied to the result regardless of outcome.
pub async fn handle(
    state: &PipelineState,
    req: Request<Incoming>,
    remote_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    let mut response = run(state, req, remote_addr)
        .await
        .unwrap_or_else(PipelineError::into_response);

    for (name, value) in cors_headers(&state.config.cors_allowed_origins) {
        if let Some(name) = name {
            response.headers_mut().insert(name, value);
        }
    }

    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request handled"
    );

    response
}

async fn run(
    state: &PipelineState,
    req: Request<Incoming>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, PipelineError> {
    let method = req.method().as_str().to_string();

    if is_preflight(&method) {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::new()))
            .expect("status is static"));
    }

    check_header_bytes(req.headers(), state.config.max_header_bytes)
        .map_err(|_| PipelineError::HeadersTooLarge)?;

    if let Some(declared) = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
    {
        check_body_size(declared, state.config.max_request_size)
            .map_err(|_| PipelineError::RequestTooLarge(declared))?;
    }

    let identity = client_identity(req.headers(), remote_addr);
    match state.rate_limiter.check(&identity) {
        Decision::Allowed => {}
        Decision::Limited { retry_after_secs } => {
            tracing::warn!(identity = %identity, "rate limit exceeded");
            return Err(PipelineError::RateLimited(retry_after_secs));
        }
    }

    let host = req
        .headers()
        .get(hyper::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if !host_is_allowed(host.as_deref(), &state.config.allowed_hosts) {
        tracing::warn!(host = ?host, "host not in allow-list");
        return Err(PipelineError::InvalidHost(host));
    }

    let timeout = Duration::from_secs(state.config.request_timeout_seconds);
    match tokio::time::timeout(timeout, dispatch(state, req, &method, &identity)).await {
        Ok(result) => result,
        Err(_) => Err(PipelineError::RequestTimeout),
    }
}

async fn dispatch(
    state: &PipelineState,
    req: Request<Incoming>,
    method: &str,
    identity: &str,
) -> Result<Response<Full<Bytes>>, PipelineError> {
    let path = req.uri().path().to_string();
    let headers = req.headers().clone();

    let collected = req
        .into_body()
        .collect()
        .await
        .map_err(|_| PipelineError::RequestTooLarge(0))?;
    let body = collected.to_bytes();

    check_body_size(body.len(), state.config.max_request_size)
        .map_err(|_| PipelineError::RequestTooLarge(body.len()))?;

    let header_pairs: Vec<(String, String)> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let snapshot = state.store.snapshot();
    let match_request = MatchRequest {
        method,
        path: &path,
        headers: &header_pairs,
        body: &body,
    };
    let matched = find_match(&snapshot, &match_request).ok_or(PipelineError::NoRuleMatched)?;

    match &matched.action {
        RuleAction::Mock(mock) => Ok(build_mock(mock)),
        RuleAction::Proxy(target) => forward(target, method, &headers, body, identity)
            .await
            .map_err(|err| match err {
                ProxyError::BlockedTarget(_) => PipelineError::UnsafeProxyURL,
                ProxyError::Timeout(_) => PipelineError::UpstreamTimeout,
                ProxyError::Transport(e) => PipelineError::ProxyTransportFailure(e.to_string()),
            }),
    }
}

/// Leftmost `X-Forwarded-For`, else `X-Real-IP`, else the remote socket
/// address, else `"unknown"`.
fn client_identity(headers: &HeaderMap, remote_addr: SocketAddr) -> String {
    if let Some(value) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = value.split(',').next() {
            let trimmed = first.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    if let Some(value) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    if remote_addr.port() != 0 || !remote_addr.ip().is_unspecified() {
        return remote_addr.to_string();
    }
    "unknown".to_string()
}
