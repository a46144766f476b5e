//! The table: a ring of seats wired to shared chopsticks.

use crate::chopstick::Chopstick;
use crate::config::DinnerConfig;
use crate::error::TableError;
use crate::philosopher::{Philosopher, SeatId};
use crate::population::Population;
use std::sync::Arc;

/// A seated party: `n` philosophers in a ring sharing `n` chopsticks.
///
/// Wiring is the same for every supported size: philosopher `i` reaches
/// first for chopstick `i` and second for chopstick `(i + 1) % n`, so
/// every chopstick is shared by exactly two adjacent seats. With two
/// seats the ring degenerates into both philosophers sharing the same
/// two chopsticks in opposite order, which is exactly the contention the
/// smallest table should have.
#[derive(Debug)]
pub struct Table {
    chopsticks: Vec<Arc<Chopstick>>,
    philosophers: Vec<Arc<Philosopher>>,
}

impl Table {
    /// Seats a party of `seats` philosophers.
    pub fn with_seats(seats: usize, config: &DinnerConfig) -> Result<Self, TableError> {
        let population = Population::new(seats)?;
        Ok(Self::for_population(population, config))
    }

    /// Seats an already validated party.
    pub fn for_population(population: Population, config: &DinnerConfig) -> Self {
        let n = population.seats();
        let chopsticks: Vec<Arc<Chopstick>> =
            (0..n).map(|i| Arc::new(Chopstick::new(i))).collect();
        let philosophers = (0..n)
            .map(|i| {
                let first = Arc::clone(&chopsticks[i]);
                let second = Arc::clone(&chopsticks[(i + 1) % n]);
                Arc::new(Philosopher::new(SeatId(i), first, second, config.servings))
            })
            .collect();
        Self {
            chopsticks,
            philosophers,
        }
    }

    /// Number of seats (and chopsticks) at the table.
    pub fn seats(&self) -> usize {
        self.philosophers.len()
    }

    /// The seated party, in seat order.
    pub fn philosophers(&self) -> &[Arc<Philosopher>] {
        &self.philosophers
    }

    /// The chopsticks, in table order.
    pub fn chopsticks(&self) -> &[Arc<Chopstick>] {
        &self.chopsticks
    }

    /// True once every meal at the table is finished.
    pub fn is_course_finished(&self) -> bool {
        self.philosophers.iter().all(|p| p.meal().is_finished())
    }

    /// Total bites taken across all seats.
    pub fn total_bites(&self) -> u64 {
        self.philosophers
            .iter()
            .map(|p| u64::from(p.meal().bites_taken()))
            .sum()
    }

    /// Restores every meal to a full plate.
    pub fn reset_meals(&self) {
        for phil in &self.philosophers {
            phil.meal().reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_parties_outside_range() {
        let config = DinnerConfig::default();
        assert_eq!(
            Table::with_seats(1, &config).unwrap_err(),
            TableError::PartySize { given: 1 }
        );
        assert_eq!(
            Table::with_seats(11, &config).unwrap_err(),
            TableError::PartySize { given: 11 }
        );
        assert!(Table::with_seats(2, &config).is_ok());
        assert!(Table::with_seats(10, &config).is_ok());
    }

    #[test]
    fn test_two_seat_table_shares_both_chopsticks() {
        let table = Table::with_seats(2, &DinnerConfig::default()).unwrap();
        let p = table.philosophers();

        assert_eq!(p[0].first().index(), 0);
        assert_eq!(p[0].second().index(), 1);
        assert_eq!(p[1].first().index(), 1);
        assert_eq!(p[1].second().index(), 0);
    }

    #[test]
    fn test_ring_wiring_for_every_size() {
        let config = DinnerConfig::default();
        for n in Population::MIN..=Population::MAX {
            let table = Table::with_seats(n, &config).unwrap();
            assert_eq!(table.seats(), n);
            assert_eq!(table.chopsticks().len(), n);

            let mut shared_by = vec![0usize; n];
            for (i, phil) in table.philosophers().iter().enumerate() {
                assert_eq!(phil.seat(), SeatId(i));
                assert_eq!(phil.first().index(), i);
                assert_eq!(phil.second().index(), (i + 1) % n);
                shared_by[phil.first().index()] += 1;
                shared_by[phil.second().index()] += 1;
            }
            // every chopstick is reached for by exactly two neighbors
            assert!(shared_by.iter().all(|&count| count == 2));
        }
    }

    #[test]
    fn test_fresh_table_state() {
        let table = Table::with_seats(5, &DinnerConfig::default()).unwrap();
        assert!(!table.is_course_finished());
        assert_eq!(table.total_bites(), 0);
        assert!(table.chopsticks().iter().all(|c| !c.is_held()));
    }

    #[test]
    fn test_reset_meals_refills_every_plate() {
        let config = DinnerConfig::default().with_servings(2);
        let table = Table::with_seats(3, &config).unwrap();
        table.reset_meals();
        for phil in table.philosophers() {
            assert_eq!(phil.meal().remaining(), 2);
        }
    }
}
