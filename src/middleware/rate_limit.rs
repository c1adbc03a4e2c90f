//! Fixed-window rate limiter, keyed by client identity.
//!
//! Deliberately not the `governor` crate: governor implements GCRA (a
//! token-bucket variant), which can't produce literal fixed-window
//! semantics — exactly N requests succeed inside a window, the (N+1)th
//! fails, and the counter resets only when the window elapses. A `DashMap`
//! keyed by identity, touched under a short per-entry critical section,
//! gets that exactly.

use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Window {
    count: u32,
    started_at: Instant,
}

/// A fixed-window counter per client identity. Entries older than the
/// configured window are reclaimed opportunistically when next touched.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    limit: u32,
    window: Duration,
}

/// Outcome of a `check` call.
pub enum Decision {
    Allowed,
    /// Caller should respond 429 with `Retry-After: <seconds>`.
    Limited { retry_after_secs: u64 },
}

impl RateLimiter {
    pub fn new(limit: u32, window_seconds: u64) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Record one request from `identity` and decide whether it's allowed.
    pub fn check(&self, identity: &str) -> Decision {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(identity.to_string())
            .or_insert_with(|| Window {
                count: 0,
                started_at: now,
            });

        if now.duration_since(entry.started_at) >= self.window {
            entry.count = 0;
            entry.started_at = now;
        }

        if entry.count >= self.limit {
            return Decision::Limited {
                retry_after_secs: self.window.as_secs(),
            };
        }

        entry.count += 1;
        Decision::Allowed
    }
}
