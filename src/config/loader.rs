//! Config Loader: turns a filesystem path into a `RuleList`.
//!
//! Parses through a `serde_yaml::Value` intermediate so legacy aliases
//! (`verb`) and loosely-typed fields (status as int or string) can be
//! normalized before strict extraction, rather than deriving `Deserialize`
//! directly onto the rule types.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::warn;

use super::error::ConfigError;
use super::rule::{Method, MockResponse, ProxyTarget, Rule, RuleAction, RuleList, RequestPattern};

const DEFAULT_PROXY_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_MOCK_STATUS: u16 = 200;

/// Load a rule list from a path that is either a single YAML file or a
/// directory of them (non-recursive).
pub fn load_path(path: &Path) -> Result<RuleList, ConfigError> {
    let meta = std::fs::metadata(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if meta.is_dir() {
        load_dir(path)
    } else {
        let rules = load_file(path)?;
        if rules.is_empty() {
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(RuleList(number(rules)))
    }
}

/// Enumerate direct `.yaml`/`.yml` children, sorted lexicographically by
/// filename, parsing each; a parse failure on one file is logged and
/// skipped, not fatal. Fails only if zero files load successfully and zero
/// rules result overall.
fn load_dir(dir: &Path) -> Result<RuleList, ConfigError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| ConfigError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| is_yaml(p))
        .collect();
    entries.sort();

    let mut rules = Vec::new();
    for path in &entries {
        match load_file(path) {
            Ok(mut file_rules) => rules.append(&mut file_rules),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping config file that failed to parse"),
        }
    }

    if rules.is_empty() {
        return Err(ConfigError::Empty {
            path: dir.to_path_buf(),
        });
    }

    Ok(RuleList(number(rules)))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn number(rules: Vec<Rule>) -> Vec<Rule> {
    rules
        .into_iter()
        .enumerate()
        .map(|(id, mut r)| {
            r.id = id;
            r
        })
        .collect()
}

/// Parse a single file: a document is a single rule map or a sequence of
/// rule maps.
fn load_file(path: &Path) -> Result<Vec<Rule>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let value: Value = serde_yaml::from_str(&contents).map_err(|e| ConfigError::Invalid {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let maps: Vec<Value> = match value {
        Value::Sequence(seq) => seq,
        other @ Value::Mapping(_) => vec![other],
        _ => {
            return Err(ConfigError::Invalid {
                file: path.to_path_buf(),
                message: "document must be a rule map or a sequence of rule maps".to_string(),
            })
        }
    };

    maps.into_iter()
        .map(|m| parse_rule(&m).map_err(|message| ConfigError::Invalid {
            file: path.to_path_buf(),
            message,
        }))
        .collect()
}

fn parse_rule(value: &Value) -> Result<Rule, String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| "rule entry must be a mapping".to_string())?;

    let request = map
        .get(Value::from("request"))
        .ok_or_else(|| "rule missing required 'request' key".to_string())?;
    let pattern = parse_request_pattern(request)?;

    let response = map.get(Value::from("response"));
    let proxy = map.get(Value::from("proxy"));

    let action = match (response, proxy) {
        (Some(r), None) => RuleAction::Mock(parse_mock_response(r)?),
        (None, Some(p)) => RuleAction::Proxy(parse_proxy_target(p)?),
        (Some(_), Some(_)) => {
            return Err("rule must contain exactly one of 'response' or 'proxy', found both".to_string())
        }
        (None, None) => {
            return Err("rule must contain exactly one of 'response' or 'proxy'".to_string())
        }
    };

    Ok(Rule {
        id: 0,
        pattern,
        action,
    })
}

fn parse_request_pattern(value: &Value) -> Result<RequestPattern, String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| "'request' must be a mapping".to_string())?;

    let path = map
        .get(Value::from("path"))
        .and_then(Value::as_str)
        .ok_or_else(|| "'request.path' is required".to_string())?
        .to_string();

    let method_raw = map
        .get(Value::from("method"))
        .or_else(|| map.get(Value::from("verb")))
        .and_then(Value::as_str)
        .ok_or_else(|| "'request.method' (or legacy 'verb') is required".to_string())?;
    let method = Method::parse(method_raw);

    let headers = map.get(Value::from("headers")).map(parse_string_map);

    let body = map
        .get(Value::from("body"))
        .and_then(Value::as_str)
        .map(|s| s.as_bytes().to_vec());

    Ok(RequestPattern {
        path,
        method,
        headers,
        body,
    })
}

fn parse_mock_response(value: &Value) -> Result<MockResponse, String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| "'response' must be a mapping".to_string())?;

    let status = map
        .get(Value::from("status"))
        .map(parse_status)
        .unwrap_or(DEFAULT_MOCK_STATUS);

    let headers = map
        .get(Value::from("headers"))
        .map(parse_string_map)
        .unwrap_or_default();

    let body = map
        .get(Value::from("body"))
        .and_then(Value::as_str)
        .ok_or_else(|| "'response.body' is required when 'response' is present".to_string())?
        .as_bytes()
        .to_vec();

    Ok(MockResponse {
        status,
        headers,
        body,
    })
}

fn parse_proxy_target(value: &Value) -> Result<ProxyTarget, String> {
    let map = value
        .as_mapping()
        .ok_or_else(|| "'proxy' must be a mapping".to_string())?;

    let url = map
        .get(Value::from("url"))
        .and_then(Value::as_str)
        .ok_or_else(|| "'proxy.url' is required when 'proxy' is present".to_string())?
        .to_string();

    let method_override = map
        .get(Value::from("method"))
        .or_else(|| map.get(Value::from("verb")))
        .and_then(Value::as_str)
        .map(Method::parse);

    let headers = map
        .get(Value::from("headers"))
        .map(parse_string_map)
        .unwrap_or_default();

    let timeout_ms = map
        .get(Value::from("timeout_ms"))
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_PROXY_TIMEOUT_MS);

    Ok(ProxyTarget {
        url,
        method_override,
        headers,
        timeout_ms,
    })
}

/// Status may appear as an integer or a decimal string; out-of-range or
/// unparseable values fall back to 200.
fn parse_status(value: &Value) -> u16 {
    let parsed: Option<i64> = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if (100..=599).contains(&n) => n as u16,
        _ => DEFAULT_MOCK_STATUS,
    }
}

/// Header mappings accept only string values; non-string values are
/// silently skipped.
fn parse_string_map(value: &Value) -> HashMap<String, String> {
    let mut out = HashMap::new();
    if let Some(map) = value.as_mapping() {
        for (k, v) in map {
            if let (Some(k), Some(v)) = (k.as_str(), v.as_str()) {
                out.insert(k.to_string(), v.to_string());
            }
        }
    }
    out
}
