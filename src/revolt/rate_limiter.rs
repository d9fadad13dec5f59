//! Minimum-interval limiter for profile edits.
//!
//! Revolt throttles `PATCH /users/@me` aggressively. Both the `username`
//! command and the rotation loop go through one shared limiter so they
//! cannot push display name changes back to back.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::debug;

/// Enforces a minimum interval between operations.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_operation: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_operation: Mutex::new(None),
        }
    }

    /// Creates a limiter from seconds.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    /// Waits until an operation is allowed and records it.
    ///
    /// Returns how long the caller was held back.
    pub async fn wait_and_acquire(&self) -> Duration {
        let mut last = self.last_operation.lock().await;

        let wait = last.map_or(Duration::ZERO, |t| {
            self.min_interval.saturating_sub(t.elapsed())
        });

        if !wait.is_zero() {
            debug!("Profile update delayed by {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        *last = Some(Instant::now());
        wait
    }
}
