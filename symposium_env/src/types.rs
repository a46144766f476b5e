//! Common types for the Symposium environment abstraction.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inclusive duration interval that protocol delays are sampled from.
///
/// Constructors uphold `min <= max`. A zero-width range is legal and
/// always yields `min`, which is how tests pin a delay to a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    /// Shortest delay the range can yield
    pub min: Duration,

    /// Longest delay the range can yield
    pub max: Duration,
}

impl DelayRange {
    /// Creates a range from explicit bounds.
    pub fn new(min: Duration, max: Duration) -> Self {
        debug_assert!(min <= max, "DelayRange bounds out of order");
        Self { min, max }
    }

    /// Creates a range from millisecond bounds.
    pub fn from_millis(min: u64, max: u64) -> Self {
        Self::new(Duration::from_millis(min), Duration::from_millis(max))
    }

    /// Creates a range from second bounds.
    pub fn from_secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    /// Creates a zero-width range that always yields `value`.
    pub fn fixed(value: Duration) -> Self {
        Self::new(value, value)
    }

    /// Returns true if the range can only yield one value.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

impl std::fmt::Display for DelayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..={:?}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_range() {
        let range = DelayRange::fixed(Duration::from_millis(250));
        assert!(range.is_fixed());
        assert_eq!(range.min, range.max);
    }

    #[test]
    fn test_constructors_agree() {
        assert_eq!(
            DelayRange::from_millis(1000, 10_000),
            DelayRange::from_secs(1, 10)
        );
    }
}
