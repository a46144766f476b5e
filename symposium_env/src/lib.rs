//! Symposium Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the dining engine
//! to run in both **Production** (tokio) and **Simulation** (virtual clock)
//! environments.
//!
//! # Core Concept
//!
//! Every philosopher delay (thinking, chopstick handling, biting) goes
//! through a [`DinnerContext`], which controls the two sources of
//! non-determinism:
//! - Time (`now()`, `sleep()`)
//! - Randomness (`random_delay()`)
//!
//! By deriving all delay draws from a single 64-bit seed, a misbehaving
//! run becomes reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use symposium_env::{DelayRange, DinnerContext};
//!
//! async fn think<Ctx: DinnerContext>(ctx: &Ctx) {
//!     // Sample 1-10s and suspend; instant under a virtual clock.
//!     ctx.pause(DelayRange::from_secs(1, 10)).await;
//! }
//! ```

mod context;
mod types;
mod tokio_impl;

pub use context::DinnerContext;
pub use types::DelayRange;
pub use tokio_impl::TokioContext;
