//! Rule Store: single-writer, many-reader holder of the active rule list.
//!
//! Built on `arc_swap::ArcSwap` so a `snapshot()` is a cheap `Arc` clone
//! that outlives a concurrent `replace()` without ever blocking the
//! writer: a reader that has obtained a snapshot observes a consistent
//! list for the duration of its request, even if a reload happens
//! mid-request.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::RuleList;

pub struct RuleStore {
    rules: ArcSwap<RuleList>,
}

impl RuleStore {
    pub fn new(initial: RuleList) -> Self {
        Self {
            rules: ArcSwap::from_pointee(initial),
        }
    }

    /// An immutable view of the rule list at this instant. Valid for as long
    /// as the caller holds it, regardless of later `replace` calls.
    pub fn snapshot(&self) -> Arc<RuleList> {
        self.rules.load_full()
    }

    /// Atomically swap in a freshly loaded rule list. Never merges with the
    /// previous list; always replaces wholesale.
    pub fn replace(&self, new_list: RuleList) {
        self.rules.store(Arc::new(new_list));
    }

    pub fn count(&self) -> usize {
        self.rules.load().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Method, MockResponse, RequestPattern, Rule, RuleAction};
    use std::collections::HashMap;

    fn rule(path: &str) -> Rule {
        Rule {
            id: 0,
            pattern: RequestPattern {
                path: path.to_string(),
                method: Method::Get,
                headers: None,
                body: None,
            },
            action: RuleAction::Mock(MockResponse {
                status: 200,
                headers: HashMap::new(),
                body: Vec::new(),
            }),
        }
    }

    #[test]
    fn snapshot_survives_replace() {
        let store = RuleStore::new(RuleList(vec![rule("/a")]));
        let snap = store.snapshot();
        store.replace(RuleList(vec![rule("/b")]));
        assert_eq!(snap.0[0].pattern.path, "/a");
        assert_eq!(store.snapshot().0[0].pattern.path, "/b");
    }

    #[test]
    fn count_reflects_current_list() {
        let store = RuleStore::new(RuleList(vec![rule("/a"), rule("/b")]));
        assert_eq!(store.count(), 2);
        store.replace(RuleList(vec![rule("/c")]));
        assert_eq!(store.count(), 1);
    }
}
