//! The forward-proxy algorithm: validate target, build the outbound
//! request, await it with a timeout, map transport failures to a gateway
//! error, relay the response.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::{HeaderMap, Response, StatusCode};
use thiserror::Error;

use crate::config::{Method, ProxyTarget};

use super::client::shared_client;
use super::headers::{build_outbound_headers, strip_response_headers};
use super::ssrf::is_valid_proxy_url;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy target `{0}` failed SSRF validation")]
    BlockedTarget(String),
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Forward `body` to `target`, returning the downstream response to relay.
///
/// `client_identity` is injected as `X-Forwarded-For`; `incoming_method` is
/// used unless the target specifies a `method_override`.
pub async fn forward(
    target: &ProxyTarget,
    incoming_method: &str,
    incoming_headers: &HeaderMap,
    body: Bytes,
    client_identity: &str,
) -> Result<Response<Full<Bytes>>, ProxyError> {
    if !is_valid_proxy_url(&target.url) {
        return Err(ProxyError::BlockedTarget(target.url.clone()));
    }

    let method = target
        .method_override
        .as_ref()
        .map(Method::as_str)
        .unwrap_or(incoming_method);
    let method = reqwest::Method::from_bytes(method.as_bytes())
        .unwrap_or(reqwest::Method::GET);

    let outbound_headers =
        build_outbound_headers(incoming_headers, &target.headers, client_identity);
    let timeout = Duration::from_millis(target.timeout_ms);

    let request = shared_client()
        .request(method, &target.url)
        .headers(outbound_headers)
        .body(body)
        .timeout(timeout);

    let upstream = match request.send().await {
        Ok(resp) => resp,
        Err(err) if err.is_timeout() => return Err(ProxyError::Timeout(timeout)),
        Err(err) => return Err(ProxyError::Transport(err)),
    };

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let response_headers = strip_response_headers(upstream.headers());

    let body_bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => return Err(ProxyError::Transport(err)),
    };

    let mut builder = Response::builder().status(status);
    if let Some(headers) = builder.headers_mut() {
        *headers = response_headers;
    }
    Ok(builder
        .body(Full::new(body_bytes))
        .expect("status was validated against the hyper enum above"))
}
