//! `setTimeout`-based timer.

use std::time::Duration;

use async_trait::async_trait;

use crate::core::clock::Timer;

/// Timer backed by `gloo-timers`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
