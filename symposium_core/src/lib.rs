//! Symposium Core - Dining Philosophers Contention Engine
//!
//! A ring of philosophers shares one chopstick with each neighbor and
//! alternates between thinking and eating until every meal is gone. The
//! engine keeps three properties on purpose:
//! 1. **Abandon on contention**: a philosopher peeks before reaching and
//!    walks away if a chopstick looks busy, rather than waiting with one
//!    in hand. Livelock-prone by construction, and exactly the behavior
//!    under study.
//! 2. **Real cancellation**: stop signals every dining task, joins each
//!    one under a grace period, aborts and recovers the stragglers, and
//!    resets the meals. No silently leaked tasks.
//! 3. **Observable state**: phases, plate countdowns, chopstick holders,
//!    and attempt counters are all readable while the dinner runs.

pub mod chopstick;
pub mod config;
pub mod error;
pub mod meal;
pub mod philosopher;
pub mod population;
pub mod service;
pub mod table;

// Re-export key types for convenience
pub use chopstick::Chopstick;
pub use config::DinnerConfig;
pub use error::{ChopstickError, ServiceError, TableError};
pub use meal::Meal;
pub use philosopher::{CourseOutcome, Phase, Philosopher, SeatId};
pub use population::Population;
pub use service::{DinnerService, RunState, StopReport};
pub use table::Table;
