//! Monotonic time source, injectable so tests don't wait on real timers.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::{Duration, Instant};

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};

/// Abstracts wall-clock and monotonic time for the supervisor tick and
/// join/kill deadlines.
pub trait Clock: Send + Sync {
    /// Current monotonic instant, used for deadline arithmetic.
    fn now(&self) -> Instant;

    /// Current wall-clock time, used for log timestamps.
    fn utc_now(&self) -> DateTime<Utc>;

    /// Suspend the caller for `duration`.
    fn sleep(&self, duration: Duration) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>>;
}

/// Real clock backed by `tokio::time` and `chrono::Utc`.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn sleep(&self, duration: Duration) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Shared handle to a clock implementation.
pub type SharedClock = Arc<dyn Clock>;

/// Build the default production clock handle.
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
