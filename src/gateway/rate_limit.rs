//! Sliding-window rate limiter for the polling endpoint.

use std::collections::HashMap;

/// Default budget: 30 reads per 60 seconds per user.
pub const DEFAULT_MAX_REQUESTS: usize = 30;
pub const DEFAULT_WINDOW_MS: i64 = 60_000;

/// Per-user sliding window over request timestamps. Excess requests are
/// rejected outright, never queued or delayed.
#[derive(Debug)]
pub struct RateLimiter {
    requests: HashMap<String, Vec<i64>>,
    max_requests: usize,
    window_ms: i64,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS)
    }
}

impl RateLimiter {
    pub fn new(max_requests: usize, window_ms: i64) -> Self {
        Self {
            requests: HashMap::new(),
            max_requests,
            window_ms,
        }
    }

    /// Admit or reject a request at `now_ms`. Prunes timestamps that have
    /// left the window, then records the request if under budget.
    pub fn check_at(&mut self, user_id: &str, now_ms: i64) -> bool {
        let window_ms = self.window_ms;
        let timestamps = self.requests.entry(user_id.to_string()).or_default();
        timestamps.retain(|&t| now_ms - t < window_ms);
        if timestamps.len() >= self.max_requests {
            return false;
        }
        timestamps.push(now_ms);
        true
    }

    /// Admit or reject a request right now.
    pub fn check(&mut self, user_id: &str) -> bool {
        self.check_at(user_id, chrono::Utc::now().timestamp_millis())
    }

    /// Evict users whose newest request is older than `max_age_ms`. Run
    /// periodically so idle users don't accumulate.
    pub fn cleanup_at(&mut self, max_age_ms: i64, now_ms: i64) {
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&t| now_ms - t < max_age_ms);
            !timestamps.is_empty()
        });
    }

    pub fn cleanup(&mut self, max_age_ms: i64) {
        self.cleanup_at(max_age_ms, chrono::Utc::now().timestamp_millis());
    }
}
