//! Retry and pacing for calls to the text-generation service.

use std::sync::Arc;
use std::time::Duration;

use backon::ExponentialBuilder;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

/// Spaces requests at least `interval` apart.
///
/// Clones share the same schedule, so one limiter can sit behind every
/// clone of a client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    next_slot: Arc<Mutex<Option<Instant>>>,
    interval: Duration,
}

impl RateLimiter {
    /// At most `requests_per_second` requests per second; `0` disables pacing.
    pub fn new(requests_per_second: u32) -> Self {
        let interval = if requests_per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(1000 / u64::from(requests_per_second))
        };
        Self {
            next_slot: Arc::new(Mutex::new(None)),
            interval,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait for the next free slot and claim it.
    pub async fn acquire(&self) {
        let mut next = self.next_slot.lock().await;
        let now = Instant::now();
        if let Some(slot) = *next {
            if slot > now {
                sleep_until(slot).await;
            }
        }
        *next = Some(Instant::now() + self.interval);
    }
}

/// Bounded exponential backoff applied to transient API failures.
///
/// Only errors for which [`AiError::is_transient`](crate::AiError::is_transient)
/// holds are retried; everything else is surfaced on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub const fn with_delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    /// Build the backoff schedule for one request.
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay.max(self.min_delay))
            .with_max_times(self.max_retries)
            .with_jitter()
    }
}
