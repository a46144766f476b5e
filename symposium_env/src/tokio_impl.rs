//! Production implementation of DinnerContext using Tokio.

use crate::{DelayRange, DinnerContext};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Production context backed by Tokio and OS entropy.
///
/// This is the "real" implementation used for live runs. Time comes from
/// the system clock, delay draws from `thread_rng`.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,
}

impl TokioContext {
    /// Creates a new TokioContext.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DinnerContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn random_delay(&self, range: DelayRange) -> Duration {
        if range.is_fixed() {
            return range.min;
        }
        let lo = range.min.as_nanos() as u64;
        let hi = range.max.as_nanos() as u64;
        Duration::from_nanos(rand::thread_rng().gen_range(lo..=hi))
    }

    fn seed(&self) -> u64 {
        // Production is not seeded
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_context_time() {
        let ctx = TokioContext::new();
        let t1 = ctx.now();
        ctx.sleep(Duration::from_millis(10)).await;
        let t2 = ctx.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[test]
    fn test_random_delay_within_bounds() {
        let ctx = TokioContext::new();
        let range = DelayRange::from_millis(5, 50);
        for _ in 0..100 {
            let delay = ctx.random_delay(range);
            assert!(delay >= range.min);
            assert!(delay <= range.max);
        }
    }

    #[test]
    fn test_random_delay_fixed_range() {
        let ctx = TokioContext::new();
        let delay = ctx.random_delay(DelayRange::fixed(Duration::from_millis(7)));
        assert_eq!(delay, Duration::from_millis(7));
    }

    #[test]
    fn test_tokio_context_seed() {
        let ctx = TokioContext::new();
        assert_eq!(ctx.seed(), 0);
    }
}
