//! Config watcher: observes the config path, debounces bursts of filesystem
//! events, and triggers an atomic rule-store reload.
//!
//! The debounce timer resets on every new event rather than sleeping a
//! fixed delay once. Only modify/create events trigger a reload; a file
//! disappearing mid-edit is not itself a reload trigger.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::load_path;
use crate::store::RuleStore;

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Watch `path` and hot-reload `store` whenever the underlying files settle
/// after a burst of changes. Runs until the process exits; reload failures
/// are logged and swallowed, keeping the previous rule list in place.
pub async fn watch(path: PathBuf, store: std::sync::Arc<RuleStore>) -> notify::Result<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(64);

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        if let Ok(event) = res {
            if is_relevant(&event.kind) {
                let _ = tx.blocking_send(event);
            }
        }
    })?;

    let mode = if path.is_dir() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&path, mode)?;
    tracing::info!(path = %path.display(), "watching configuration for changes");

    loop {
        if rx.recv().await.is_none() {
            return Ok(());
        }

        loop {
            tokio::select! {
                _ = tokio::time::sleep(DEBOUNCE) => break,
                more = rx.recv() => {
                    if more.is_none() {
                        return Ok(());
                    }
                }
            }
        }

        reload(&path, &store);
    }
}

fn is_relevant(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

fn reload(path: &Path, store: &RuleStore) {
    tracing::info!(path = %path.display(), "reloading configuration");
    match load_path(path) {
        Ok(rules) => {
            let count = rules.len();
            store.replace(rules);
            tracing::info!(rule_count = count, "configuration reloaded");
        }
        Err(err) => {
            tracing::warn!(%err, "reload failed, keeping previous rule set");
        }
    }
}
