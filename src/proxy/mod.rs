//! Proxy client: forwarding matched requests to an upstream target, with
//! SSRF defenses and header hygiene.

mod client;
mod forward;
mod headers;
mod ssrf;

pub use forward::{forward, ProxyError};
pub use headers::{build_outbound_headers, strip_response_headers};
pub use ssrf::is_valid_proxy_url;
