//! CORS decoration: the outermost layer, so it wraps every response
//! including ones produced by earlier middleware rejections.

use hyper::header::{HeaderName, HeaderValue};
use hyper::HeaderMap;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, PATCH, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

pub fn is_preflight(method: &str) -> bool {
    method.eq_ignore_ascii_case("OPTIONS")
}

/// The CORS headers to attach to any outgoing response, preflight or not.
pub fn cors_headers(allowed_origins: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let origin = allowed_origins.join(", ");
    insert(&mut headers, "access-control-allow-origin", &origin);
    insert(&mut headers, "access-control-allow-methods", ALLOW_METHODS);
    insert(&mut headers, "access-control-allow-headers", ALLOW_HEADERS);
    headers
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) {
    if let (Ok(name), Ok(value)) = (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        headers.insert(name, value);
    }
}
