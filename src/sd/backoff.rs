//! # Retry/backoff policy for the find-service cycle.
//!
//! While a required service is unavailable the client repeats its search with an
//! exponentially growing pause. After the `n`-th search attempt (`retry_count == n`)
//! the client waits `(2 << n) * base`, i.e. `2^(n+1)` seconds with the default base
//! of one second. The very first attempt is preceded by a fixed settle delay that
//! does not depend on the formula.
//!
//! ```rust
//! use std::time::Duration;
//! use fusion_sd_client::sd::backoff::{next_interval, can_retry};
//!
//! assert_eq!(next_interval(1), Duration::from_millis(4000));
//! assert_eq!(next_interval(3), Duration::from_millis(16000));
//! assert!(can_retry(2, 3));
//! assert!(!can_retry(3, 3));
//! ```

use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Wait after the `retry_count`-th search attempt, using the default base.
pub fn next_interval(retry_count: u32) -> Duration {
    scaled_interval(retry_count, DEFAULT_BACKOFF_BASE)
}

/// Whether another search attempt is permitted.
pub fn can_retry(retry_count: u32, max_retries: u32) -> bool {
    retry_count < max_retries
}

// Saturates at u64::MAX milliseconds rather than wrapping.
fn scaled_interval(retry_count: u32, base: Duration) -> Duration {
    let factor = if retry_count >= 63 {
        u64::MAX
    } else {
        2u64 << retry_count
    };
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    Duration::from_millis(factor.saturating_mul(base_ms))
}

/// Retry limits and timing of the search cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of search attempts per pass through the unavailable state.
    pub max_retries: u32,
    /// Settle delay before the first search attempt.
    pub initial_delay: Duration,
    /// Multiplier applied to `2 << retry_count`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    pub fn next_interval(&self, retry_count: u32) -> Duration {
        scaled_interval(retry_count, self.backoff_base)
    }

    pub fn can_retry(&self, retry_count: u32) -> bool {
        can_retry(retry_count, self.max_retries)
    }
}
