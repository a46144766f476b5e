//! Ground truth oracle for simulation.
//!
//! The Oracle is the harness-side auditor of a running table:
//! - Wiring audit: the ring topology is exactly as constructed
//! - Consumption ledger: plates only count down, never past zero
//! - Endgame audit: empty plates, free chopsticks, conserved bite totals

use symposium_core::{SeatId, Table};
use thiserror::Error;

/// An invariant the oracle caught the table breaking.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleViolation {
    /// Chopstick count does not match seat count
    #[error("table has {chopsticks} chopsticks for {seats} seats")]
    ChopstickCount { seats: usize, chopsticks: usize },

    /// A seat reaches for the wrong chopstick pair
    #[error("{seat} reaches for chopsticks {first} and {second}, expected {expected_first} and {expected_second}")]
    MiswiredSeat {
        seat: SeatId,
        first: usize,
        second: usize,
        expected_first: usize,
        expected_second: usize,
    },

    /// A chopstick is not shared by exactly two neighbors
    #[error("chopstick {index} is reached for by {sharers} seats, expected exactly 2")]
    SharingDegree { index: usize, sharers: usize },

    /// A plate shows more food than it was served
    #[error("{seat} shows {remaining} bites remaining on a {servings}-serving meal")]
    LedgerOverflow {
        seat: SeatId,
        remaining: u32,
        servings: u32,
    },

    /// A plate refilled between observations without a reset
    #[error("{seat} went from {before} to {after} bites remaining between observations")]
    LedgerRegression { seat: SeatId, before: u32, after: u32 },

    /// The course ended with food still on a plate
    #[error("course ended but {seat} still has {remaining} bites left")]
    UnfinishedMeal { seat: SeatId, remaining: u32 },

    /// A chopstick was still in someone's hand after the course
    #[error("chopstick {index} still held by {holder} after the course")]
    ChopstickLeak { index: usize, holder: SeatId },

    /// Total bites do not add up to seats times servings
    #[error("table counted {counted} bites, expected {expected}")]
    BitesMismatch { counted: u64, expected: u64 },
}

/// The Oracle - audits a table against the invariants the engine
/// promises, from the outside, using only the observer surface.
pub struct Oracle {
    /// Servings per plate at this table
    servings: u32,

    /// Last remaining count seen per seat, for the monotonicity check
    last_remaining: Vec<u32>,

    /// Samples taken so far
    observations: u64,
}

impl Oracle {
    /// Creates an oracle for the given table.
    pub fn new(table: &Table) -> Self {
        let servings = table
            .philosophers()
            .first()
            .map(|p| p.meal().servings())
            .unwrap_or(0);
        Self {
            servings,
            last_remaining: vec![servings; table.seats()],
            observations: 0,
        }
    }

    /// Number of ledger samples taken so far.
    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Checks the ring topology: `n` chopsticks for `n` seats, seat `i`
    /// wired to chopsticks `i` and `(i + 1) % n`, every chopstick shared
    /// by exactly two neighbors.
    pub fn audit_wiring(table: &Table) -> Result<(), OracleViolation> {
        let n = table.seats();
        if table.chopsticks().len() != n {
            return Err(OracleViolation::ChopstickCount {
                seats: n,
                chopsticks: table.chopsticks().len(),
            });
        }

        let mut sharers = vec![0usize; n];
        for (i, phil) in table.philosophers().iter().enumerate() {
            let first = phil.first().index();
            let second = phil.second().index();
            if first != i || second != (i + 1) % n {
                return Err(OracleViolation::MiswiredSeat {
                    seat: phil.seat(),
                    first,
                    second,
                    expected_first: i,
                    expected_second: (i + 1) % n,
                });
            }
            sharers[first] += 1;
            sharers[second] += 1;
        }
        for (index, &count) in sharers.iter().enumerate() {
            if count != 2 {
                return Err(OracleViolation::SharingDegree {
                    index,
                    sharers: count,
                });
            }
        }
        Ok(())
    }

    /// Samples the consumption ledger: every plate within bounds and
    /// never refilling between observations.
    pub fn observe(&mut self, table: &Table) -> Result<(), OracleViolation> {
        self.observations += 1;
        for (i, phil) in table.philosophers().iter().enumerate() {
            let remaining = phil.meal().remaining();
            if remaining > self.servings {
                return Err(OracleViolation::LedgerOverflow {
                    seat: phil.seat(),
                    remaining,
                    servings: self.servings,
                });
            }
            if remaining > self.last_remaining[i] {
                return Err(OracleViolation::LedgerRegression {
                    seat: phil.seat(),
                    before: self.last_remaining[i],
                    after: remaining,
                });
            }
            self.last_remaining[i] = remaining;
        }
        Ok(())
    }

    /// Tells the ledger a legitimate reset happened (stop refills all
    /// plates), so the next observation starts from full again.
    pub fn note_reset(&mut self) {
        for slot in &mut self.last_remaining {
            *slot = self.servings;
        }
    }

    /// Endgame audit for a completed course: every plate empty, every
    /// chopstick back on the table, and the bite total conserved.
    pub fn audit_final(&self, table: &Table) -> Result<(), OracleViolation> {
        for phil in table.philosophers() {
            let remaining = phil.meal().remaining();
            if remaining > 0 {
                return Err(OracleViolation::UnfinishedMeal {
                    seat: phil.seat(),
                    remaining,
                });
            }
        }
        for stick in table.chopsticks() {
            if let Some(holder) = stick.holder() {
                return Err(OracleViolation::ChopstickLeak {
                    index: stick.index(),
                    holder,
                });
            }
        }
        let expected = table.seats() as u64 * u64::from(self.servings);
        let counted = table.total_bites();
        if counted != expected {
            return Err(OracleViolation::BitesMismatch { counted, expected });
        }
        Ok(())
    }
}
