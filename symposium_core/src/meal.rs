//! A meal: a fixed number of servings consumed one bite at a time.

use std::sync::atomic::{AtomicU32, Ordering};
use symposium_env::{DelayRange, DinnerContext};
use tracing::trace;

/// Meal state for one seat.
///
/// Only the owning philosopher takes bites, so the countdown is
/// single-writer. The atomic exists for concurrent readers: status
/// polling, the sim oracle, and stop-time accounting.
#[derive(Debug)]
pub struct Meal {
    /// Bites in a full meal
    servings: u32,

    /// Bites left on the plate
    remaining: AtomicU32,
}

impl Meal {
    /// Serves a full meal of `servings` bites.
    pub fn new(servings: u32) -> Self {
        Self {
            servings,
            remaining: AtomicU32::new(servings),
        }
    }

    /// Bites in a full meal.
    pub fn servings(&self) -> u32 {
        self.servings
    }

    /// Bites left on the plate.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    /// True once the plate is empty.
    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Bites taken so far.
    pub fn bites_taken(&self) -> u32 {
        self.servings - self.remaining()
    }

    /// Takes one bite: a sampled chewing delay, then the decrement.
    ///
    /// Returns the new remaining count. On an already finished meal this
    /// is a no-op returning 0. The delay-then-decrement order means an
    /// observer never sees a bite counted before it was swallowed.
    pub async fn take_bite<C: DinnerContext>(&self, ctx: &C, chew: DelayRange) -> u32 {
        if self.is_finished() {
            return 0;
        }
        ctx.pause(chew).await;
        // single-writer: nobody else decremented between the guard and here
        let left = self.remaining.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!("bite taken, {} left", left);
        left
    }

    /// Restores the meal to a full plate.
    pub fn reset(&self) {
        self.remaining.store(self.servings, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use symposium_env::TokioContext;

    fn instant() -> DelayRange {
        DelayRange::from_millis(0, 0)
    }

    #[test]
    fn test_full_plate() {
        let meal = Meal::new(10);
        assert_eq!(meal.servings(), 10);
        assert_eq!(meal.remaining(), 10);
        assert_eq!(meal.bites_taken(), 0);
        assert!(!meal.is_finished());
    }

    #[tokio::test]
    async fn test_take_bite_counts_down() {
        let ctx = TokioContext::new();
        let meal = Meal::new(3);

        assert_eq!(meal.take_bite(&ctx, instant()).await, 2);
        assert_eq!(meal.take_bite(&ctx, instant()).await, 1);
        assert_eq!(meal.take_bite(&ctx, instant()).await, 0);
        assert!(meal.is_finished());
        assert_eq!(meal.bites_taken(), 3);
    }

    #[tokio::test]
    async fn test_bite_on_empty_plate_is_noop() {
        let ctx = TokioContext::new();
        let meal = Meal::new(1);

        meal.take_bite(&ctx, instant()).await;
        assert!(meal.is_finished());

        assert_eq!(meal.take_bite(&ctx, instant()).await, 0);
        assert_eq!(meal.remaining(), 0);
        assert_eq!(meal.bites_taken(), 1);
    }

    #[tokio::test]
    async fn test_reset_refills_plate() {
        let ctx = TokioContext::new();
        let meal = Meal::new(5);
        meal.take_bite(&ctx, instant()).await;
        meal.take_bite(&ctx, instant()).await;

        meal.reset();
        assert_eq!(meal.remaining(), 5);
        assert_eq!(meal.bites_taken(), 0);
        assert!(!meal.is_finished());
    }
}
