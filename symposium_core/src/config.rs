//! Timing and sizing knobs for a dinner.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use symposium_env::DelayRange;

/// Configuration for a dinner run.
///
/// The defaults reproduce the classic pacing: ten servings per meal,
/// one to ten seconds of thinking between attempts, up to a second of
/// chopstick handling after each pickup, up to a second of chewing per
/// bite, and a five second stop grace before stragglers are aborted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DinnerConfig {
    /// Bites in a full meal
    pub servings: u32,

    /// Thinking pause between eat attempts
    pub think_delay: DelayRange,

    /// Pause after each chopstick pickup
    pub handling_delay: DelayRange,

    /// Chewing time per bite
    pub bite_delay: DelayRange,

    /// How long `stop` waits for each dining task before aborting it
    pub stop_grace: Duration,
}

impl Default for DinnerConfig {
    fn default() -> Self {
        Self {
            servings: 10,
            think_delay: DelayRange::from_secs(1, 10),
            handling_delay: DelayRange::from_millis(0, 1000),
            bite_delay: DelayRange::from_millis(0, 1000),
            stop_grace: Duration::from_secs(5),
        }
    }
}

impl DinnerConfig {
    /// Millisecond-scale preset for real-runtime tests and demos.
    ///
    /// Same protocol, same contention pattern, a thousandfold faster.
    pub fn quick() -> Self {
        Self {
            servings: 10,
            think_delay: DelayRange::from_millis(1, 10),
            handling_delay: DelayRange::from_millis(0, 2),
            bite_delay: DelayRange::from_millis(0, 2),
            stop_grace: Duration::from_secs(1),
        }
    }

    /// Overrides the number of servings per meal.
    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    /// Overrides the stop grace period.
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }
}
