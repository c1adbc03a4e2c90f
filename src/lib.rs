//! PopShop: a declarative HTTP mocking and forward-proxying server. Rules
//! loaded from YAML drive a first-match-wins dispatch between canned mock
//! responses and a forward proxy with SSRF defenses.

pub mod cli;
pub mod config;
pub mod logging;
pub mod matcher;
pub mod middleware;
pub mod pipeline;
pub mod proxy;
pub mod response;
pub mod server;
pub mod store;
pub mod watch;
