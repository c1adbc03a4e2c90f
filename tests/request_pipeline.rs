//! End-to-end tests binding an in-process server to a loopback listener and
//! exercising it over a real TCP socket with a `reqwest::Client`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use popshop::config::{Method, MockResponse, ProxyTarget, RequestPattern, Rule, RuleAction, RuleList};
use popshop::middleware::MiddlewareConfig;
use popshop::pipeline::PipelineState;
use popshop::store::RuleStore;
use tokio::net::TcpListener;
use tokio::sync::watch;

async fn start_server(rules: RuleList, config: MiddlewareConfig) -> (SocketAddr, watch::Sender<bool>) {
    let store = Arc::new(RuleStore::new(rules));
    let state = Arc::new(PipelineState::new(store, config));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let _ = popshop::server::serve_listener(listener, state, rx).await;
    });

    (addr, tx)
}

fn mock_rule(id: usize, path: &str, method: Method, headers: Option<HashMap<String, String>>, status: u16, body: &str) -> Rule {
    Rule {
        id,
        pattern: RequestPattern {
            path: path.to_string(),
            method,
            headers,
            body: None,
        },
        action: RuleAction::Mock(MockResponse {
            status,
            headers: HashMap::new(),
            body: body.as_bytes().to_vec(),
        }),
    }
}

#[tokio::test]
async fn health_check_mock_returns_canned_json() {
    let rules = RuleList(vec![mock_rule(0, "/api/health", Method::Get, None, 200, r#"{"status":"ok"}"#)]);
    let (addr, _shutdown) = start_server(rules, MiddlewareConfig::default()).await;

    let resp = reqwest::get(format!("http://{addr}/api/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(resp.text().await.unwrap(), r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn proxy_rule_with_unsafe_target_is_rejected_without_a_network_call() {
    let rule = Rule {
        id: 0,
        pattern: RequestPattern {
            path: "/api/proxy".to_string(),
            method: Method::Get,
            headers: None,
            body: None,
        },
        action: RuleAction::Proxy(ProxyTarget {
            url: "http://127.0.0.1:9000/x".to_string(),
            method_override: None,
            headers: HashMap::new(),
            timeout_ms: 1000,
        }),
    };
    let (addr, _shutdown) = start_server(RuleList(vec![rule]), MiddlewareConfig::default()).await;

    let client = reqwest::Client::new();
    let resp = client
        .get(format!("http://{addr}/api/proxy"))
        .header("Host", "x")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.text().await.unwrap(), "Invalid proxy URL");
}

#[tokio::test]
async fn header_gated_rule_requires_the_exact_header_value() {
    let mut headers = HashMap::new();
    headers.insert("authorization".to_string(), "Bearer t".to_string());
    let rule = mock_rule(0, "/u", Method::Post, Some(headers), 201, "ok");
    let (addr, _shutdown) = start_server(RuleList(vec![rule]), MiddlewareConfig::default()).await;

    let client = reqwest::Client::new();
    let matched = client
        .post(format!("http://{addr}/u"))
        .header("Authorization", "Bearer t")
        .send()
        .await
        .unwrap();
    assert_eq!(matched.status(), 201);
    assert_eq!(matched.text().await.unwrap(), "ok");

    let unmatched = client.post(format!("http://{addr}/u")).send().await.unwrap();
    assert_eq!(unmatched.status(), 404);
}

#[tokio::test]
async fn rate_limit_allows_exactly_n_then_rejects_with_retry_after() {
    let mut config = MiddlewareConfig::default();
    config.rate_limit_requests = 3;
    config.rate_limit_window_seconds = 60;
    let (addr, _shutdown) = start_server(RuleList(vec![]), config).await;

    let client = reqwest::Client::new();
    for _ in 0..3 {
        let resp = client.get(format!("http://{addr}/anything")).send().await.unwrap();
        assert_eq!(resp.status(), 404);
    }
    let limited = client.get(format!("http://{addr}/anything")).send().await.unwrap();
    assert_eq!(limited.status(), 429);
    assert_eq!(limited.headers().get("retry-after").unwrap(), "60");
}

#[tokio::test]
async fn oversized_body_is_rejected_before_matching() {
    let mut config = MiddlewareConfig::default();
    config.max_request_size = 1024;
    // A rule that would match a POST /big if the body were ever inspected.
    let rule = mock_rule(0, "/big", Method::Post, None, 200, "should never be returned");
    let (addr, _shutdown) = start_server(RuleList(vec![rule]), config).await;

    let oversized = vec![b'x'; 2 * 1024 * 1024];
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{addr}/big"))
        .body(oversized)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 413);
    assert_eq!(resp.text().await.unwrap(), "Request entity too large");
}

#[tokio::test]
async fn preflight_requests_short_circuit_with_cors_headers() {
    let (addr, _shutdown) = start_server(RuleList(vec![]), MiddlewareConfig::default()).await;

    let client = reqwest::Client::new();
    let resp = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("access-control-allow-origin").unwrap(), "*");
}
