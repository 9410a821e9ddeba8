//! Timing attack protection utilities
//!
//! Comparisons of secret-derived values must not exit early on the first
//! differing byte, and login outcomes must not reveal which check failed
//! through their response time.

use std::time::{Duration, Instant};

use crate::constants::DEFAULT_MIN_AUTH_MILLIS;

/// Constant-time string comparison
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    constant_time_eq_bytes(a.as_bytes(), b.as_bytes())
}

/// Constant-time byte slice comparison.
///
/// Only the length check short-circuits; lengths of digests are public.
pub fn constant_time_eq_bytes(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (byte_a, byte_b) in a.iter().zip(b.iter()) {
        result |= byte_a ^ byte_b;
    }

    result == 0
}

/// Sleep until `min_duration` has passed since `start_time`
pub async fn add_auth_delay(start_time: Instant, min_duration: Duration) {
    let elapsed = start_time.elapsed();
    if elapsed < min_duration {
        tokio::time::sleep(min_duration - elapsed).await;
    }
}

/// Pads an authentication attempt to a minimum wall-clock duration
#[derive(Debug)]
pub struct AuthTimer {
    start: Instant,
    min_duration: Duration,
}

impl AuthTimer {
    pub fn new(min_duration: Duration) -> Self {
        Self {
            start: Instant::now(),
            min_duration,
        }
    }

    /// Wait until minimum duration has elapsed
    pub async fn wait(self) {
        add_auth_delay(self.start, self.min_duration).await;
    }
}

impl Default for AuthTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_MIN_AUTH_MILLIS))
    }
}
