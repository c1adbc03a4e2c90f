//! Header hygiene for the forward-proxy path: hop-by-hop stripping plus
//! overlay of rule-configured extras.

use std::collections::HashMap;

use hyper::HeaderMap;

/// Headers that must never be forwarded to the upstream.
pub const REQUEST_STRIP_LIST: &[&str] = &[
    "host",
    "connection",
    "upgrade",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
];

/// Headers that must never be relayed back to the client.
pub const RESPONSE_STRIP_LIST: &[&str] = &[
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
    "upgrade",
    "proxy-authenticate",
    "proxy-authorization",
];

/// Build the outbound header set: incoming headers minus the request-side
/// strip list, then overlaid with the rule's injected headers (which win on
/// collision), then `X-Forwarded-For` appended.
pub fn build_outbound_headers(
    incoming: &HeaderMap,
    injected: &HashMap<String, String>,
    client_identity: &str,
) -> reqwest::header::HeaderMap {
    let mut out = reqwest::header::HeaderMap::new();

    for (name, value) in incoming.iter() {
        if REQUEST_STRIP_LIST
            .iter()
            .any(|stripped| name.as_str().eq_ignore_ascii_case(stripped))
        {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_str().as_bytes()),
            reqwest::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.insert(name, value);
        }
    }

    for (name, value) in injected {
        if let (Ok(name), Ok(value)) = (
            reqwest::header::HeaderName::from_bytes(name.as_bytes()),
            reqwest::header::HeaderValue::from_str(value),
        ) {
            out.insert(name, value);
        }
    }

    if let Ok(value) = reqwest::header::HeaderValue::from_str(client_identity) {
        out.insert("x-forwarded-for", value);
    }

    out
}

/// Copy the upstream response headers into a fresh hyper `HeaderMap`, minus
/// the response-side strip list.
pub fn strip_response_headers(upstream: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for (name, value) in upstream.iter() {
        if RESPONSE_STRIP_LIST
            .iter()
            .any(|stripped| name.as_str().eq_ignore_ascii_case(stripped))
        {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            hyper::header::HeaderName::from_bytes(name.as_str().as_bytes()),
            hyper::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            out.insert(name, value);
        }
    }
    out
}
