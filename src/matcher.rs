//! The Matcher: a pure function selecting the first rule matching a request.
//! Only exact equality on path/method/header/body is supported — no
//! wildcard, regex, or structural body matching.

use crate::config::{Rule, RuleList};

/// The pieces of an incoming request the matcher needs. Kept independent of
/// any particular HTTP framing crate so it stays a pure, easily tested
/// function of plain data.
pub struct MatchRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    /// Raw header pairs as received; name comparison is case-insensitive,
    /// value comparison is case-sensitive, so we keep the original casing.
    pub headers: &'a [(String, String)],
    pub body: &'a [u8],
}

impl<'a> MatchRequest<'a> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Select the first rule in `rules` whose pattern matches `request`, or
/// `None` if no rule matches.
pub fn find_match<'a>(rules: &'a RuleList, request: &MatchRequest<'_>) -> Option<&'a Rule> {
    rules.iter().find(|rule| rule_matches(rule, request))
}

fn rule_matches(rule: &Rule, request: &MatchRequest<'_>) -> bool {
    let pattern = &rule.pattern;

    if !pattern.method.as_str().eq_ignore_ascii_case(request.method) {
        return false;
    }

    if pattern.path != request.path {
        return false;
    }

    if let Some(expected_headers) = &pattern.headers {
        for (name, expected_value) in expected_headers {
            match request.header(name) {
                Some(actual) if actual == expected_value => {}
                _ => return false,
            }
        }
    }

    if let Some(expected_body) = &pattern.body {
        if expected_body.as_slice() != request.body {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Method, MockResponse, ProxyTarget, RequestPattern, RuleAction};
    use std::collections::HashMap;

    fn mock_rule(id: usize, path: &str, method: Method, headers: Option<HashMap<String, String>>, body: Option<Vec<u8>>) -> Rule {
        Rule {
            id,
            pattern: RequestPattern {
                path: path.to_string(),
                method,
                headers,
                body,
            },
            action: RuleAction::Mock(MockResponse {
                status: 200,
                headers: HashMap::new(),
                body: Vec::new(),
            }),
        }
    }

    #[test]
    fn first_match_wins() {
        let rules = RuleList(vec![
            mock_rule(0, "/api/health", Method::Get, None, None),
            mock_rule(1, "/api/health", Method::Get, None, None),
        ]);
        let req = MatchRequest {
            method: "GET",
            path: "/api/health",
            headers: &[],
            body: &[],
        };
        let matched = find_match(&rules, &req).unwrap();
        assert_eq!(matched.id, 0);
    }

    #[test]
    fn method_is_case_insensitive() {
        let rules = RuleList(vec![mock_rule(0, "/x", Method::Get, None, None)]);
        let req = MatchRequest {
            method: "get",
            path: "/x",
            headers: &[],
            body: &[],
        };
        assert!(find_match(&rules, &req).is_some());
    }

    #[test]
    fn path_is_byte_exact() {
        let rules = RuleList(vec![mock_rule(0, "/x", Method::Get, None, None)]);
        let req = MatchRequest {
            method: "GET",
            path: "/x/",
            headers: &[],
            body: &[],
        };
        assert!(find_match(&rules, &req).is_none());
    }

    #[test]
    fn missing_required_header_fails_match() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Bearer t".to_string());
        let rules = RuleList(vec![mock_rule(0, "/u", Method::Post, Some(headers), None)]);

        let req_without = MatchRequest {
            method: "POST",
            path: "/u",
            headers: &[],
            body: &[],
        };
        assert!(find_match(&rules, &req_without).is_none());

        let with_header = vec![("Authorization".to_string(), "Bearer t".to_string())];
        let req_with = MatchRequest {
            method: "POST",
            path: "/u",
            headers: &with_header,
            body: &[],
        };
        assert!(find_match(&rules, &req_with).is_some());
    }

    #[test]
    fn header_value_comparison_is_case_sensitive() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Bearer t".to_string());
        let rules = RuleList(vec![mock_rule(0, "/u", Method::Post, Some(headers), None)]);

        let wrong_case = vec![("Authorization".to_string(), "bearer t".to_string())];
        let req = MatchRequest {
            method: "POST",
            path: "/u",
            headers: &wrong_case,
            body: &[],
        };
        assert!(find_match(&rules, &req).is_none());
    }

    #[test]
    fn body_constraint_must_match_byte_for_byte() {
        let rules = RuleList(vec![mock_rule(
            0,
            "/b",
            Method::Post,
            None,
            Some(b"exact".to_vec()),
        )]);
        let req_mismatch = MatchRequest {
            method: "POST",
            path: "/b",
            headers: &[],
            body: b"other",
        };
        assert!(find_match(&rules, &req_mismatch).is_none());

        let req_match = MatchRequest {
            method: "POST",
            path: "/b",
            headers: &[],
            body: b"exact",
        };
        assert!(find_match(&rules, &req_match).is_some());
    }

    #[test]
    fn absent_body_pattern_accepts_any_body() {
        let rules = RuleList(vec![mock_rule(0, "/b", Method::Post, None, None)]);
        let req = MatchRequest {
            method: "POST",
            path: "/b",
            headers: &[],
            body: b"anything",
        };
        assert!(find_match(&rules, &req).is_some());
    }

    #[test]
    fn never_matching_verb_is_parsed_but_inert() {
        let rule = mock_rule(0, "/x", Method::parse("TRACE"), None, None);
        let rules = RuleList(vec![rule]);
        let req = MatchRequest {
            method: "TRACE",
            path: "/x",
            headers: &[],
            body: &[],
        };
        assert!(find_match(&rules, &req).is_none());
    }

    #[test]
    fn proxy_rule_matches_same_as_mock_rule() {
        let rule = Rule {
            id: 0,
            pattern: RequestPattern {
                path: "/p".to_string(),
                method: Method::Get,
                headers: None,
                body: None,
            },
            action: RuleAction::Proxy(ProxyTarget {
                url: "http://upstream.example/p".to_string(),
                method_override: None,
                headers: HashMap::new(),
                timeout_ms: 1000,
            }),
        };
        let rules = RuleList(vec![rule]);
        let req = MatchRequest {
            method: "GET",
            path: "/p",
            headers: &[],
            body: &[],
        };
        assert!(find_match(&rules, &req).is_some());
    }
}
