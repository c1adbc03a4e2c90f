//! In-memory rule representation.

use std::collections::HashMap;

/// HTTP verbs PopShop dispatches on. Anything else parses but never matches:
/// only this set is recognized for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Other(String),
}

impl Method {
    /// Normalize to upper-case ASCII and map onto the dispatchable set.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Other(s) => s.as_str(),
        }
    }
}

/// Request-side matching criteria for a rule.
#[derive(Debug, Clone)]
pub struct RequestPattern {
    pub path: String,
    pub method: Method,
    pub headers: Option<HashMap<String, String>>,
    pub body: Option<Vec<u8>>,
}

/// A canned response a mock rule returns.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Where and how to forward a request that matched a proxy rule.
#[derive(Debug, Clone)]
pub struct ProxyTarget {
    pub url: String,
    pub method_override: Option<Method>,
    pub headers: HashMap<String, String>,
    pub timeout_ms: u64,
}

/// Exactly one of a mock response or a proxy target. The enum itself is the
/// invariant: there is no representable `Rule` with both or neither.
#[derive(Debug, Clone)]
pub enum RuleAction {
    Mock(MockResponse),
    Proxy(ProxyTarget),
}

/// An ordered rule loaded from a configuration document.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Position in load order; used for diagnostics only, never for matching.
    pub id: usize,
    pub pattern: RequestPattern,
    pub action: RuleAction,
}

/// The active, ordered set of rules. A thin newtype so the Rule Store's
/// snapshot type is self-documenting rather than a bare `Vec`.
#[derive(Debug, Clone, Default)]
pub struct RuleList(pub Vec<Rule>);

impl RuleList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    /// Count of rules whose action is a mock response.
    pub fn mock_count(&self) -> usize {
        self.0
            .iter()
            .filter(|r| matches!(r.action, RuleAction::Mock(_)))
            .count()
    }

    /// Count of rules whose action is a proxy target.
    pub fn proxy_count(&self) -> usize {
        self.0
            .iter()
            .filter(|r| matches!(r.action, RuleAction::Proxy(_)))
            .count()
    }
}

impl From<Vec<Rule>> for RuleList {
    fn from(rules: Vec<Rule>) -> Self {
        RuleList(rules)
    }
}
