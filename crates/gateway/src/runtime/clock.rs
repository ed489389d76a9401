//! Time source for the run poller.

use std::time::Duration;

use async_trait::async_trait;

/// Monotonic clock plus the ability to wait on it.
///
/// Production uses [`SystemClock`]; tests drive the poller with a manual
/// clock that advances only when asked.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// [`Clock`] backed by `tokio::time`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
