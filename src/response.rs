//! Mock responder: builds a response from a matched rule's canned payload.
//! Status, then headers, then body — no further transformation.

use bytes::Bytes;
use http_body_util::Full;
use hyper::http::{HeaderName, HeaderValue};
use hyper::{Response, StatusCode};

use crate::config::MockResponse;

/// Build the downstream response for a matched mock rule. Copies the rule's
/// headers verbatim and defaults `Content-Type` to `application/json` when
/// the rule didn't set one.
pub fn build_mock(mock: &MockResponse) -> Response<Full<Bytes>> {
    let status = StatusCode::from_u16(mock.status).unwrap_or(StatusCode::OK);
    let mut builder = Response::builder().status(status);

    let mut saw_content_type = false;
    for (name, value) in &mock.headers {
        if name.eq_ignore_ascii_case("content-type") {
            saw_content_type = true;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, value);
        }
    }
    if !saw_content_type {
        builder = builder.header("content-type", "application/json");
    }

    builder
        .body(Full::new(Bytes::from(mock.body.clone())))
        .expect("status and headers were already validated")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_content_type_to_json() {
        let mock = MockResponse {
            status: 200,
            headers: HashMap::new(),
            body: b"{}".to_vec(),
        };
        let resp = build_mock(&mock);
        assert_eq!(resp.headers().get("content-type").unwrap(), "application/json");
    }

    #[test]
    fn explicit_content_type_is_preserved() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let mock = MockResponse {
            status: 201,
            headers,
            body: b"hi".to_vec(),
        };
        let resp = build_mock(&mock);
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get("content-type").unwrap(), "text/plain");
    }

    #[test]
    fn empty_body_is_allowed() {
        let mock = MockResponse {
            status: 204,
            headers: HashMap::new(),
            body: Vec::new(),
        };
        let resp = build_mock(&mock);
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }
}
