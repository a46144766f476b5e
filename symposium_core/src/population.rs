//! Party size: validated at the edges, clamped in the middle.

use crate::error::TableError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of seats at the table.
///
/// A pure value type: it knows the supported bounds and the clamping
/// rule, nothing else. Whether the size may change right now is the run
/// controller's call (`DinnerService` refuses a resize while a dinner is
/// underway), so no locked flag lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    seats: usize,
}

impl Population {
    /// Smallest party that still contends for chopsticks.
    pub const MIN: usize = 2;

    /// Largest supported party.
    pub const MAX: usize = 10;

    /// Party size used when none is requested.
    pub const DEFAULT: usize = 5;

    /// Validates a requested party size.
    pub fn new(seats: usize) -> Result<Self, TableError> {
        if (Self::MIN..=Self::MAX).contains(&seats) {
            Ok(Self { seats })
        } else {
            Err(TableError::PartySize { given: seats })
        }
    }

    /// Draws a uniformly random party size from the supported range.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self {
            seats: rng.gen_range(Self::MIN..=Self::MAX),
        }
    }

    /// Current number of seats.
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// Adjusts the size by `delta` seats, clamping to the supported
    /// range. Returns the new size; a change that would leave the range
    /// lands on the nearest bound instead.
    pub fn change(&mut self, delta: i32) -> usize {
        let target = self.seats as i64 + delta as i64;
        self.seats = target.clamp(Self::MIN as i64, Self::MAX as i64) as usize;
        self.seats
    }
}

impl Default for Population {
    fn default() -> Self {
        Self {
            seats: Self::DEFAULT,
        }
    }
}

impl std::fmt::Display for Population {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} seats", self.seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_validation_edges() {
        assert!(Population::new(1).is_err());
        assert!(Population::new(2).is_ok());
        assert!(Population::new(10).is_ok());
        assert!(Population::new(11).is_err());
        assert_eq!(
            Population::new(0).unwrap_err(),
            TableError::PartySize { given: 0 }
        );
    }

    #[test]
    fn test_change_clamps_at_minimum() {
        let mut pop = Population::new(2).unwrap();
        assert_eq!(pop.change(-1), 2);
        assert_eq!(pop.change(-100), 2);
        assert_eq!(pop.seats(), 2);
    }

    #[test]
    fn test_change_clamps_at_maximum() {
        let mut pop = Population::new(10).unwrap();
        assert_eq!(pop.change(1), 10);
        assert_eq!(pop.change(100), 10);
        assert_eq!(pop.seats(), 10);
    }

    #[test]
    fn test_change_moves_within_range() {
        let mut pop = Population::default();
        assert_eq!(pop.seats(), 5);
        assert_eq!(pop.change(1), 6);
        assert_eq!(pop.change(-2), 4);
    }

    #[test]
    fn test_random_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let pop = Population::random(&mut rng);
            assert!(pop.seats() >= Population::MIN);
            assert!(pop.seats() <= Population::MAX);
        }
    }
}
