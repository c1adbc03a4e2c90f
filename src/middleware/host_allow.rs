//! Host allow-list: semantic validation, so it runs after the cheap size
//! guards but before any expensive work.

/// `true` if `allowed` is empty (no restriction configured) or `host`
/// exactly matches one of its entries.
pub fn host_is_allowed(host: Option<&str>, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }
    match host {
        Some(host) => allowed.iter().any(|entry| entry == host),
        None => false,
    }
}
