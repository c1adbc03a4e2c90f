//! Shared outbound HTTP client: build one lazily and reuse its connection
//! pool across every proxied request instead of constructing a fresh
//! client per call.

use std::sync::OnceLock;
use std::time::Duration;

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// The process-wide outbound client. `redirect::Policy::none()` because the
/// matcher already resolved the target; following redirects would silently
/// route around the SSRF validator.
pub fn shared_client() -> &'static reqwest::Client {
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client configuration is static and known-valid")
    })
}
