//! Minimum-interval pacing for generation calls.
//!
//! A budget of N calls per minute becomes a minimum gap of `60s / N` between
//! the *starts* of consecutive calls. The limiter only ever sleeps for the
//! remainder of that gap, so a slow call (longer than the interval) is
//! followed immediately by the next one.
//!
//! Time comes from [`tokio::time::Instant`], which is monotonic and can be
//! paused in tests, so pacing is checked without real waiting.
//!
//! The limiter is a plain `&mut` value, not a shared handle: slides are
//! described one at a time and no locking is needed.

use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

/// Enforces a minimum interval between successive generation calls.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// A limiter allowing `calls_per_minute` calls; `0` disables pacing.
    pub fn new(calls_per_minute: u32) -> Self {
        let min_interval = if calls_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / calls_per_minute
        };
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// A limiter that never waits.
    pub fn unlimited() -> Self {
        Self::new(0)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call may start, then record its start time.
    pub async fn acquire(&mut self) {
        if self.min_interval.is_zero() {
            return;
        }
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("Rate limit: waiting {}ms", wait.as_millis());
                sleep(wait).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}
