//! # Inter-Batch Throttling
//!
//! The remote API rate-limits mutations, so consecutive batches are separated
//! by a pause. The executor calls [`Throttle::pause`] between batches only,
//! never after the last one.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait Throttle: Send + Sync {
    /// Suspend after `completed_batch` (1-based) before the next batch starts
    async fn pause(&self, completed_batch: usize);
}

/// Unconditional fixed pause
#[derive(Debug, Clone)]
pub struct FixedDelayThrottle {
    delay: Duration,
}

impl FixedDelayThrottle {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Throttle for FixedDelayThrottle {
    async fn pause(&self, completed_batch: usize) {
        debug!(
            completed_batch = completed_batch,
            delay_ms = self.delay.as_millis() as u64,
            "⏳ THROTTLE: Waiting before next batch"
        );
        tokio::time::sleep(self.delay).await;
    }
}
