//! Configuration document schema and loading.

mod error;
mod loader;
mod rule;

pub use error::ConfigError;
pub use loader::load_path;
pub use rule::{Method, MockResponse, ProxyTarget, RequestPattern, Rule, RuleAction, RuleList};
