// SPDX-FileCopyrightText: 2026 VetDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-query staleness and retry settings.

use std::time::Duration;

use vetdesk_config::model::CacheConfig;

/// Longest staleness window a query may use.
pub const MAX_STALE_TIME: Duration = Duration::from_secs(300);

/// Most retries after the first attempt.
pub const MAX_RETRIES: u32 = 3;

/// Fixed-delay retry for transient failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// No retry: the first failure is returned.
    pub const fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Up to `retries` more attempts (capped at [`MAX_RETRIES`]), `delay` apart.
    pub fn fixed(retries: u32, delay: Duration) -> Self {
        Self {
            retries: retries.min(MAX_RETRIES),
            delay,
        }
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// How long a cached result stays fresh, and how failures are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    stale_time: Duration,
    retry: RetryPolicy,
}

impl QueryOptions {
    /// Options with the given staleness window (capped at five minutes) and no retry.
    pub fn stale_for(stale_time: Duration) -> Self {
        Self {
            stale_time: stale_time.min(MAX_STALE_TIME),
            retry: RetryPolicy::none(),
        }
    }

    /// Results are stale immediately: every read refetches, concurrent reads still share one request.
    pub fn always_stale() -> Self {
        Self::stale_for(Duration::ZERO)
    }

    /// Defaults from the `[cache]` config section.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::stale_for(Duration::from_secs(config.default_stale_secs)).with_retry(
            RetryPolicy::fixed(config.retries, Duration::from_millis(config.retry_delay_ms)),
        )
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::stale_for(Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_time_is_capped_at_five_minutes() {
        let options = QueryOptions::stale_for(Duration::from_secs(3600));
        assert_eq!(options.stale_time(), MAX_STALE_TIME);
    }

    #[test]
    fn retries_are_capped_at_three() {
        let policy = RetryPolicy::fixed(10, Duration::from_millis(100));
        assert_eq!(policy.retries(), 3);
    }

    #[test]
    fn from_config_reads_cache_section() {
        let config = CacheConfig {
            default_stale_secs: 30,
            retries: 2,
            retry_delay_ms: 250,
        };
        let options = QueryOptions::from_config(&config);
        assert_eq!(options.stale_time(), Duration::from_secs(30));
        assert_eq!(options.retry().retries(), 2);
        assert_eq!(options.retry().delay(), Duration::from_millis(250));
    }
}
