//! Driven port for rate-limit counters.
//!
//! The store owns the per-key counters; callers never read-then-write, so a
//! single call is the atomic unit and concurrent hits from the same client
//! cannot undercount.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Counter state for one key after recording a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Hits recorded in the current window, including this one.
    pub count: u32,
    /// When the current window opened.
    pub window_started_at: DateTime<Utc>,
}

/// Port for rate-limit counter storage.
///
/// Counters are ephemeral abuse-mitigation state: implementations may drop
/// them on restart without correctness impact.
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key` at `now` and return the updated window state.
    ///
    /// Opens a fresh window when none exists or the previous one (of length
    /// `window`) has expired.
    fn hit(&self, key: &str, now: DateTime<Utc>, window: Duration) -> WindowSnapshot;

    /// Drop every counter whose window ended before `now`.
    fn purge_expired(&self, now: DateTime<Utc>);
}

/// Entry count beyond which a hit triggers an opportunistic purge.
const HOUSEKEEPING_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u32,
    window_started_at: DateTime<Utc>,
}

/// Process-local counter store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, CounterEntry>>,
}

impl InMemoryRateLimitStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys, for housekeeping assertions.
    ///
    /// # Panics
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.entries.lock().expect("rate limit store lock").len()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn hit(&self, key: &str, now: DateTime<Utc>, window: Duration) -> WindowSnapshot {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            // A poisoned counter map only affects throttling accuracy; start
            // a fresh window rather than failing the request.
            Err(poisoned) => poisoned.into_inner(),
        };

        if entries.len() > HOUSEKEEPING_THRESHOLD {
            entries.retain(|_, entry| entry.window_started_at + window > now);
        }

        let entry = entries
            .entry(key.to_owned())
            .and_modify(|entry| {
                if entry.window_started_at + window <= now {
                    entry.count = 1;
                    entry.window_started_at = now;
                } else {
                    entry.count = entry.count.saturating_add(1);
                }
            })
            .or_insert(CounterEntry {
                count: 1,
                window_started_at: now,
            });

        WindowSnapshot {
            count: entry.count,
            window_started_at: entry.window_started_at,
        }
    }

    fn purge_expired(&self, now: DateTime<Utc>) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Without the original window length per entry, retain anything that
        // started within the last day; callers use this as coarse cleanup.
        entries.retain(|_, entry| now - entry.window_started_at < Duration::days(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn hits_accumulate_within_a_window() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::minutes(5);

        let first = store.hit("client-a", at(0), window);
        let second = store.hit("client-a", at(10), window);

        assert_eq!(first.count, 1);
        assert_eq!(second.count, 2);
        assert_eq!(second.window_started_at, at(0));
    }

    #[test]
    fn windows_reset_after_expiry() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::minutes(5);

        store.hit("client-a", at(0), window);
        store.hit("client-a", at(10), window);
        let fresh = store.hit("client-a", at(301), window);

        assert_eq!(fresh.count, 1);
        assert_eq!(fresh.window_started_at, at(301));
    }

    #[test]
    fn keys_count_independently() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::minutes(5);

        store.hit("client-a", at(0), window);
        let other = store.hit("client-b", at(0), window);

        assert_eq!(other.count, 1);
    }

    #[test]
    fn purge_drops_stale_entries() {
        let store = InMemoryRateLimitStore::new();
        let window = Duration::minutes(5);

        store.hit("client-a", at(0), window);
        store.purge_expired(at(0) + Duration::days(2));

        assert_eq!(store.tracked_keys(), 0);
    }
}
