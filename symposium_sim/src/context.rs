//! Simulation context implementing DinnerContext for deterministic testing.

use async_trait::async_trait;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use symposium_env::{DelayRange, DinnerContext};

/// Simulation context backed by deterministic time and RNG.
///
/// This implements `DinnerContext` using:
/// - A virtual clock that can be advanced manually
/// - A seeded ChaCha8 RNG for deterministic delay draws
/// - Simulated sleep that advances virtual time and yields, so a ten
///   second think costs no wall time but still lets every other diner run
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,

    /// Deterministic RNG for delay draws
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(Mutex::new(0)),
            rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time += duration.as_nanos() as u64;
    }

    /// Sets the virtual time to a specific value.
    pub fn set_time(&self, time_ns: u64) {
        let mut time = self.virtual_time_ns.lock().unwrap();
        *time = time_ns;
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.virtual_time_ns.lock().unwrap()
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            rng: Arc::clone(&self.rng),
        }
    }
}

#[async_trait]
impl DinnerContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(*self.virtual_time_ns.lock().unwrap())
    }

    async fn sleep(&self, duration: Duration) {
        // In simulation, sleep advances virtual time and yields so the
        // scheduler can run the other diners
        self.advance_time(duration);
        tokio::task::yield_now().await;
    }

    fn random_delay(&self, range: DelayRange) -> Duration {
        if range.is_fixed() {
            return range.min;
        }
        let lo = range.min.as_nanos() as u64;
        let hi = range.max.as_nanos() as u64;
        let mut rng = self.rng.lock().unwrap();
        Duration::from_nanos(rng.gen_range(lo..=hi))
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_context_time() {
        let ctx = SimContext::new(42);
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.advance_time(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_sim_context_deterministic_delays() {
        let ctx1 = SimContext::new(42);
        let ctx2 = SimContext::new(42);
        let range = DelayRange::from_millis(0, 1000);

        let draws1: Vec<Duration> = (0..32).map(|_| ctx1.random_delay(range)).collect();
        let draws2: Vec<Duration> = (0..32).map(|_| ctx2.random_delay(range)).collect();

        // Same seed = same delay sequence
        assert_eq!(draws1, draws2);

        // Different seed = different sequence
        let ctx3 = SimContext::new(43);
        let draws3: Vec<Duration> = (0..32).map(|_| ctx3.random_delay(range)).collect();
        assert_ne!(draws1, draws3);
    }

    #[test]
    fn test_sim_context_delays_stay_in_range() {
        let ctx = SimContext::new(7);
        let range = DelayRange::from_millis(100, 200);
        for _ in 0..100 {
            let delay = ctx.random_delay(range);
            assert!(delay >= range.min);
            assert!(delay <= range.max);
        }
    }

    #[test]
    fn test_sim_context_seed() {
        let ctx = SimContext::new(12345);
        assert_eq!(ctx.seed(), 12345);
    }

    #[tokio::test]
    async fn test_sleep_advances_virtual_time() {
        let ctx = SimContext::new(42);
        ctx.sleep(Duration::from_secs(10)).await;
        assert_eq!(ctx.now(), Duration::from_secs(10));
    }

    #[test]
    fn test_sim_context_clone_shares_time() {
        let ctx1 = SimContext::new(42);
        let ctx2 = ctx1.clone();

        ctx1.advance_time(Duration::from_secs(5));

        // Both should see the same time
        assert_eq!(ctx1.now(), ctx2.now());
    }
}
