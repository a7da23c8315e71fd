//! Fixed-window rate limiting over an injected counter store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;

use crate::domain::ports::RateLimitStore;

/// Limit applied to an endpoint: at most `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Window length.
    pub window: Duration,
    /// Hits allowed within one window.
    pub max_requests: u32,
}

impl RateLimitPolicy {
    /// The newsletter policy: 3 requests per 5 minutes per client.
    #[must_use]
    pub fn newsletter() -> Self {
        Self {
            window: Duration::minutes(5),
            max_requests: 3,
        }
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// When the current window resets.
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Seconds until the window resets, measured from `now`, never negative.
    #[must_use]
    pub fn retry_after_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.reset_at - now).num_seconds().max(0)
    }
}

/// Rate limiter combining a counter store with an injected clock.
///
/// Each check is one atomic store operation; the limiter itself holds no
/// per-key state, so it can be shared freely across handlers.
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter over the given store and clock.
    pub fn new(store: Arc<dyn RateLimitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record a hit for `key` under `policy` and decide whether it may
    /// proceed.
    #[must_use]
    pub fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let now = self.clock.utc();
        let snapshot = self.store.hit(key, now, policy.window);
        let allowed = snapshot.count <= policy.max_requests;
        RateLimitDecision {
            allowed,
            remaining: policy.max_requests.saturating_sub(snapshot.count),
            reset_at: snapshot.window_started_at + policy.window,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::InMemoryRateLimitStore;
    use chrono::{Local, TimeZone};
    use rstest::rstest;
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn starting_at(seconds: i64) -> Self {
            Self(Mutex::new(
                Utc.timestamp_opt(seconds, 0).single().expect("valid time"),
            ))
        }

        fn advance(&self, delta: Duration) {
            let mut now = self.0.lock().expect("clock lock");
            *now += delta;
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock lock")
        }
    }

    fn limiter() -> (RateLimiter, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::starting_at(1_760_000_000));
        let limiter = RateLimiter::new(Arc::new(InMemoryRateLimitStore::new()), clock.clone());
        (limiter, clock)
    }

    #[rstest]
    fn fourth_hit_in_window_is_rejected() {
        let (limiter, _clock) = limiter();
        let policy = RateLimitPolicy::newsletter();

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check("client-a", policy);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let fourth = limiter.check("client-a", policy);
        assert!(!fourth.allowed);
        assert_eq!(fourth.remaining, 0);
    }

    #[rstest]
    fn window_expiry_allows_a_fresh_count() {
        let (limiter, clock) = limiter();
        let policy = RateLimitPolicy::newsletter();

        for _ in 0..4 {
            let _ = limiter.check("client-a", policy);
        }
        clock.advance(policy.window + Duration::seconds(1));

        let fresh = limiter.check("client-a", policy);
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 2);
    }

    #[rstest]
    fn clients_are_limited_independently() {
        let (limiter, _clock) = limiter();
        let policy = RateLimitPolicy::newsletter();

        for _ in 0..4 {
            let _ = limiter.check("client-a", policy);
        }

        let other = limiter.check("client-b", policy);
        assert!(other.allowed);
    }

    #[rstest]
    fn reset_time_reflects_window_start() {
        let (limiter, clock) = limiter();
        let policy = RateLimitPolicy::newsletter();
        let window_start = clock.utc();

        clock.advance(Duration::seconds(30));
        let _ = limiter.check("client-a", policy);
        clock.advance(Duration::seconds(60));
        let decision = limiter.check("client-a", policy);

        assert_eq!(
            decision.reset_at,
            window_start + Duration::seconds(30) + policy.window
        );
        assert_eq!(decision.retry_after_seconds(clock.utc()), 240);
    }
}
