//! Run lifecycle: start a dinner, observe it, stop it cleanly.

use crate::config::DinnerConfig;
use crate::error::{ChopstickError, ServiceError, TableError};
use crate::philosopher::{CourseOutcome, SeatId};
use crate::population::Population;
use crate::table::Table;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use symposium_env::DinnerContext;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Lifecycle state of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    /// No dinner underway, table may be rebuilt
    Idle,
    /// Dining tasks are live, party size is locked
    Running,
}

/// Accounting of how a stop went.
#[derive(Debug, Clone, Serialize)]
pub struct StopReport {
    /// Seats whose course had already finished
    pub finished: Vec<SeatId>,

    /// Seats that honored the cancellation signal
    pub cancelled: Vec<SeatId>,

    /// Seats aborted after the grace period ran out
    pub stragglers: Vec<SeatId>,

    /// Seats whose task ended with a protocol error
    pub failures: Vec<(SeatId, String)>,

    /// Wall time from start to this stop
    pub elapsed: Duration,
}

impl StopReport {
    /// True when every seat wound down on its own, with no aborts and no
    /// protocol errors.
    pub fn is_clean(&self) -> bool {
        self.stragglers.is_empty() && self.failures.is_empty()
    }
}

/// One spawned dining task.
struct Worker {
    seat: SeatId,
    handle: JoinHandle<Result<CourseOutcome, ChopstickError>>,
}

/// Book-keeping for a dinner in progress.
struct ActiveRun {
    shutdown: watch::Sender<bool>,
    workers: Vec<Worker>,
    started_at: Duration,
}

/// Controls the dinner lifecycle: Idle -> Running -> Idle.
///
/// The service owns the table across runs. `start` spawns one tokio task
/// per philosopher and keeps every join handle; `stop` is a real
/// cancellation: signal the party, join each task under a grace period,
/// abort the stragglers, recover their chopsticks, and reset every meal
/// so the next start begins a fresh course.
///
/// Dropping a running service drops the shutdown sender; dining tasks
/// observe the closed channel at their next cancellation point and exit,
/// though nothing joins them. Prefer `stop`.
pub struct DinnerService<C: DinnerContext> {
    ctx: Arc<C>,
    config: DinnerConfig,
    population: Population,
    table: Table,
    run: Option<ActiveRun>,
}

impl<C: DinnerContext> DinnerService<C> {
    /// Seats a validated party, idle.
    pub fn new(ctx: Arc<C>, population: Population, config: DinnerConfig) -> Self {
        let table = Table::for_population(population, &config);
        Self {
            ctx,
            config,
            population,
            table,
            run: None,
        }
    }

    /// Seats a party of `seats` philosophers, idle.
    pub fn with_seats(ctx: Arc<C>, seats: usize, config: DinnerConfig) -> Result<Self, TableError> {
        let population = Population::new(seats)?;
        Ok(Self::new(ctx, population, config))
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        if self.run.is_some() {
            RunState::Running
        } else {
            RunState::Idle
        }
    }

    /// Current party size.
    pub fn seats(&self) -> usize {
        self.population.seats()
    }

    /// The table, for status polling at any time.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The active configuration.
    pub fn config(&self) -> &DinnerConfig {
        &self.config
    }

    /// Starts the dinner: one dining task per seat, all sharing a fresh
    /// shutdown channel.
    ///
    /// Starting while a dinner is underway changes nothing and returns
    /// `ServiceError::AlreadyRunning`.
    pub fn start(&mut self) -> Result<(), ServiceError> {
        if self.run.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let workers = self
            .table
            .philosophers()
            .iter()
            .map(|phil| {
                let phil = Arc::clone(phil);
                let ctx = Arc::clone(&self.ctx);
                let config = self.config.clone();
                let shutdown = shutdown_rx.clone();
                Worker {
                    seat: phil.seat(),
                    handle: tokio::spawn(async move {
                        phil.dine(ctx.as_ref(), &config, shutdown).await
                    }),
                }
            })
            .collect();

        info!("dinner started with {}", self.population);
        self.run = Some(ActiveRun {
            shutdown: shutdown_tx,
            workers,
            started_at: self.ctx.now(),
        });
        Ok(())
    }

    /// Stops the dinner and returns the accounting.
    ///
    /// Signals cancellation, then joins every dining task under the
    /// configured grace period. A task that misses its deadline is
    /// aborted and reported as a straggler; any chopstick it still held
    /// is recovered so the table stays usable. Meals are reset to full
    /// plates before the service goes back to `Idle`. Stragglers and
    /// per-seat protocol errors never fail the stop itself.
    ///
    /// Stopping while idle changes nothing and returns
    /// `ServiceError::NotRunning`.
    pub async fn stop(&mut self) -> Result<StopReport, ServiceError> {
        let Some(run) = self.run.take() else {
            return Err(ServiceError::NotRunning);
        };
        let ActiveRun {
            shutdown,
            workers,
            started_at,
        } = run;

        // receivers are gone if every course already finished
        let _ = shutdown.send(true);
        info!(
            "stop requested, allowing {:?} per seat to wind down",
            self.config.stop_grace
        );

        let mut finished = Vec::new();
        let mut cancelled = Vec::new();
        let mut stragglers = Vec::new();
        let mut failures = Vec::new();

        for Worker { seat, mut handle } in workers {
            match timeout(self.config.stop_grace, &mut handle).await {
                Ok(Ok(Ok(CourseOutcome::Finished))) => finished.push(seat),
                Ok(Ok(Ok(CourseOutcome::Cancelled))) => cancelled.push(seat),
                Ok(Ok(Err(err))) => {
                    error!("{} abandoned the protocol: {}", seat, err);
                    failures.push((seat, err.to_string()));
                }
                Ok(Err(join_err)) => {
                    error!("{} did not join cleanly: {}", seat, join_err);
                    failures.push((seat, join_err.to_string()));
                }
                Err(_elapsed) => {
                    warn!(
                        "{} still dining after {:?}, aborting",
                        seat, self.config.stop_grace
                    );
                    handle.abort();
                    let _ = handle.await;
                    stragglers.push(seat);
                }
            }
        }

        // No tasks remain past this point. Any holder still attributed
        // belongs to an aborted or failed seat; recover the chopstick so
        // the next start is not wedged.
        for stick in self.table.chopsticks() {
            if let Some(stale) = stick.force_release() {
                warn!(
                    "recovered chopstick {} still attributed to {}",
                    stick.index(),
                    stale
                );
            }
        }

        self.table.reset_meals();
        let elapsed = self.ctx.now().saturating_sub(started_at);
        let report = StopReport {
            finished,
            cancelled,
            stragglers,
            failures,
            elapsed,
        };
        info!(
            "dinner stopped after {:?}: {} finished, {} cancelled, {} stragglers",
            report.elapsed,
            report.finished.len(),
            report.cancelled.len(),
            report.stragglers.len()
        );
        Ok(report)
    }

    /// Adjusts the party size by `delta` seats, clamped to the supported
    /// range, and reseats the table at the new size.
    ///
    /// Returns the size now in effect. While a dinner is underway the
    /// size is locked: nothing changes and `ServiceError::SeatsLocked`
    /// comes back.
    pub fn resize(&mut self, delta: i32) -> Result<usize, ServiceError> {
        if self.run.is_some() {
            return Err(ServiceError::SeatsLocked);
        }
        let before = self.population.seats();
        let after = self.population.change(delta);
        if after == before {
            debug!("resize by {} clamped, staying at {}", delta, before);
        } else {
            self.table = Table::for_population(self.population, &self.config);
            info!("table reseated from {} to {} seats", before, after);
        }
        Ok(after)
    }
}
