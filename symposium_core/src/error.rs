//! Error types for the dining engine.
//!
//! Three separate families, one per failure mode:
//! - `TableError`: rejected construction parameters (fail fast)
//! - `ChopstickError`: ownership preconditions broken at release time
//!   (fatal to the offending philosopher's task, never to the process)
//! - `ServiceError`: lifecycle calls that do not fit the current state
//!   (reported no-ops)

use crate::philosopher::SeatId;
use thiserror::Error;

/// Errors raised while seating a party.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// Requested party size falls outside the supported range
    #[error("cannot seat a party of {given} (supported range is 2..=10)")]
    PartySize { given: usize },
}

/// A chopstick release that broke its ownership precondition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChopstickError {
    /// Release of a chopstick nobody holds
    #[error("chopstick {index} released while not held")]
    NotHeld { index: usize },

    /// Release of a chopstick held by a different seat
    #[error("chopstick {index} is held by {holder} but was released by {releaser}")]
    HeldByOther {
        index: usize,
        holder: SeatId,
        releaser: SeatId,
    },
}

/// Service control calls that do not fit the current lifecycle state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// Start while a dinner is already underway
    #[error("a dinner is already underway")]
    AlreadyRunning,

    /// Stop with no dinner underway
    #[error("no dinner is underway")]
    NotRunning,

    /// Resize while the party is seated and dining
    #[error("party size is locked while a dinner is underway")]
    SeatsLocked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_actors() {
        let err = ChopstickError::HeldByOther {
            index: 3,
            holder: SeatId(2),
            releaser: SeatId(4),
        };
        let msg = err.to_string();
        assert!(msg.contains("chopstick 3"));
        assert!(msg.contains("seat 2"));
        assert!(msg.contains("seat 4"));
    }

    #[test]
    fn test_party_size_message() {
        let err = TableError::PartySize { given: 17 };
        assert!(err.to_string().contains("17"));
    }
}
