//! Symposium Deterministic Simulation Testing (DST) Harness
//!
//! This crate runs the dining engine inside a controlled environment
//! where the sources of non-determinism are intercepted:
//! - **Time**: a virtual clock that advances when tasks sleep
//! - **Randomness**: every delay draw comes from a single 64-bit seed
//!
//! Task interleaving stays with the tokio scheduler, so a seed pins the
//! delay sequence and the virtual timeline rather than the exact thread
//! schedule. In practice that is enough to rerun a misbehaving seed and
//! watch the same contention pattern unfold.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                       │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │ SimContext (Virtual Clock + Seeded ChaCha8 RNG)    │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │       │                              │                   │
//! │  ┌────▼─────┐   chopsticks      ┌────▼─────┐             │
//! │  │ Diner #1 │◄─────────────────►│ Diner #2 │    ...      │
//! │  └──────────┘                   └──────────┘             │
//! │       ▲                              ▲                   │
//! │       │                              │                   │
//! │  ┌────┴──────────────────────────────┴────┐              │
//! │  │                Oracle                  │              │
//! │  │  (wiring audit + consumption ledger)   │              │
//! │  └────────────────────────────────────────┘              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use symposium_sim::ScenarioRunner;
//! use symposium_sim::scenarios::ScenarioId;
//!
//! let runner = ScenarioRunner::new(42, 5);
//! let result = runner.run(ScenarioId::FullTable);
//! assert!(result.passed);
//! ```

mod context;
mod oracle;
mod runner;
pub mod scenarios;

pub use context::SimContext;
pub use oracle::{Oracle, OracleViolation};
pub use runner::{ScenarioMetrics, ScenarioResult, ScenarioRunner};
