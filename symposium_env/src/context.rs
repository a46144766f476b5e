//! Core environment context trait for Symposium runs.

use crate::DelayRange;
use async_trait::async_trait;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts time and randomness so the dining engine can run
/// in both production (real clock, OS entropy) and simulation (virtual
/// clock, seeded RNG) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, `thread_rng`
/// - **Simulation**: `SimContext` (in `symposium_sim`) - virtual clock,
///   `ChaCha8Rng` seeded from a `u64`
///
/// # Determinism
///
/// All methods that would normally introduce non-determinism are
/// controlled by the implementation. With a seeded context, every delay
/// a philosopher draws is reproducible from the seed.
#[async_trait]
pub trait DinnerContext: Send + Sync + 'static {
    /// Returns the current monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Samples a delay uniformly from the inclusive range.
    fn random_delay(&self, range: DelayRange) -> Duration;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;

    /// Samples a delay from `range` and sleeps it.
    ///
    /// Every protocol pause (thinking, chopstick handling, biting) goes
    /// through here so the two entropy sources stay behind one seam.
    async fn pause(&self, range: DelayRange) {
        let delay = self.random_delay(range);
        self.sleep(delay).await;
    }
}
