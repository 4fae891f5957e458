//! Time seams: wall clock for token expiry, timer for debouncing.

use std::time::Duration;

use async_trait::async_trait;

/// Wall-clock source in epoch milliseconds.
pub trait Clock {
    /// Current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

/// Clock backed by `chrono` (uses `Date.now()` on wasm).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Cooperative sleep used by the search debouncer.
#[async_trait(?Send)]
pub trait Timer {
    /// Resolve once `duration` has elapsed.
    async fn sleep(&self, duration: Duration);
}
