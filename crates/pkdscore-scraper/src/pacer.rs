//! Fixed-interval request pacing.
//!
//! The public registries and statistics APIs throttle aggressive clients, so
//! collectors space their calls out instead of retrying.

use std::time::Duration;

use tokio::time::Instant;

/// Spaces consecutive requests at least `interval` apart.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last: Option<Instant>,
}

impl Pacer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until `interval` has passed since the previous call, then mark
    /// now as the latest request. The first call returns immediately.
    pub async fn wait(&mut self) {
        self.wait_for(self.interval).await;
    }

    /// Like [`Pacer::wait`] but with a one-off interval.
    pub async fn wait_for(&mut self, interval: Duration) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < interval {
                tokio::time::sleep(interval - elapsed).await;
            }
        }
        self.last = Some(Instant::now());
    }
}
