//! Scenario runner - executes contention scenarios against the engine.

use crate::context::SimContext;
use crate::oracle::Oracle;
use crate::scenarios::ScenarioId;

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use symposium_core::{DinnerConfig, DinnerService, Population, RunState, ServiceError, Table};
use symposium_env::DinnerContext;
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Seats the runner was configured with
    pub seats: usize,

    /// Whether the scenario passed all assertions
    pub passed: bool,

    /// Wall time the scenario took
    pub wall_ms: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during the run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioMetrics {
    /// Bites taken across all completed courses
    pub bites: u64,

    /// Eat attempts walked away from because a chopstick looked busy
    pub abandoned: u64,

    /// Seats aborted during stops
    pub stragglers: u64,

    /// Courses run to empty plates
    pub courses: u64,

    /// Virtual seconds on the sim clock when the scenario ended
    pub virtual_secs: f64,
}

/// Runs contention scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Number of seats for size-configurable scenarios
    seats: usize,

    /// Servings per plate
    servings: u32,

    /// Wall-clock deadline per course in seconds
    max_wall_secs: f64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64, seats: usize) -> Self {
        Self {
            seed,
            seats,
            servings: 10,
            max_wall_secs: 30.0,
        }
    }

    /// Sets the servings per plate.
    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    /// Sets the wall-clock deadline per course.
    pub fn with_deadline(mut self, secs: f64) -> Self {
        self.max_wall_secs = secs;
        self
    }

    /// Runs a scenario on a fresh runtime and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime.block_on(self.run_scenario(scenario)),
            Err(e) => self.failed(scenario, 0, format!("could not build runtime: {}", e)),
        }
    }

    /// Runs a scenario on the current runtime.
    pub async fn run_scenario(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        let started = Instant::now();

        let outcome = match scenario {
            ScenarioId::FullTable => self.run_full_table().await,
            ScenarioId::TableForTwo => self.run_table_for_two().await,
            ScenarioId::Restart => self.run_restart().await,
            ScenarioId::Resize => self.run_resize().await,
            ScenarioId::Gauntlet => self.run_gauntlet().await,
        };
        let wall_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(metrics) => {
                info!(
                    "✓ {} complete: {} bites over {} courses, {:.1} virtual secs, {} ms wall",
                    scenario.name(),
                    metrics.bites,
                    metrics.courses,
                    metrics.virtual_secs,
                    wall_ms
                );
                ScenarioResult {
                    scenario,
                    seed: self.seed,
                    seats: self.seats,
                    passed: true,
                    wall_ms,
                    failure_reason: None,
                    metrics,
                }
            }
            Err(reason) => {
                warn!("✗ {} failed: {}", scenario.name(), reason);
                self.failed(scenario, wall_ms, reason)
            }
        }
    }

    fn failed(&self, scenario: ScenarioId, wall_ms: u64, reason: String) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            seats: self.seats,
            passed: false,
            wall_ms,
            failure_reason: Some(reason),
            metrics: ScenarioMetrics::default(),
        }
    }

    fn config(&self) -> DinnerConfig {
        DinnerConfig::default().with_servings(self.servings)
    }

    /// Polls the table until the course settles, sampling the ledger on
    /// every pass. The deadline is wall time: virtual delays cost
    /// nothing, so a healthy course settles in wall milliseconds.
    async fn drive_course(
        &self,
        service: &DinnerService<SimContext>,
        oracle: &mut Oracle,
    ) -> Result<(), String> {
        let deadline = Instant::now() + Duration::from_secs_f64(self.max_wall_secs);
        while !Self::course_settled(service.table()) {
            oracle
                .observe(service.table())
                .map_err(|v| v.to_string())?;
            if Instant::now() > deadline {
                if service.table().is_course_finished() {
                    return Err("plates emptied but a chopstick never came back down".to_string());
                }
                return Err(format!(
                    "course did not finish within {:.0}s of wall time",
                    self.max_wall_secs
                ));
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        oracle
            .observe(service.table())
            .map_err(|v| v.to_string())?;
        Ok(())
    }

    /// The course is over only once every plate is empty and every
    /// chopstick is back on the table. Empty plates alone are not
    /// enough: the finished flag flips on the final bite, strictly
    /// before that eater puts its chopsticks down, and the endgame
    /// audit must not run inside that gap.
    fn course_settled(table: &Table) -> bool {
        table.is_course_finished() && table.chopsticks().iter().all(|c| !c.is_held())
    }

    fn sum_abandoned(service: &DinnerService<SimContext>) -> u64 {
        service
            .table()
            .philosophers()
            .iter()
            .map(|p| p.abandoned_attempts())
            .sum()
    }

    /// DST-001: FullTable - the configured party eats to empty plates.
    ///
    /// **Assertions**: wiring audit, ledger stays within bounds and only
    /// counts down, endgame audit, every seat reports Finished, clean stop.
    async fn run_full_table(&self) -> Result<ScenarioMetrics, String> {
        info!("DST-001: FullTable - {} seats to empty plates", self.seats);

        let ctx = SimContext::shared(self.seed);
        let mut service = DinnerService::with_seats(Arc::clone(&ctx), self.seats, self.config())
            .map_err(|e| e.to_string())?;

        Oracle::audit_wiring(service.table()).map_err(|v| v.to_string())?;
        let mut oracle = Oracle::new(service.table());

        service.start().map_err(|e| e.to_string())?;
        self.drive_course(&service, &mut oracle).await?;

        let bites = service.table().total_bites();
        oracle
            .audit_final(service.table())
            .map_err(|v| v.to_string())?;

        let report = service.stop().await.map_err(|e| e.to_string())?;
        if report.finished.len() != self.seats {
            return Err(format!(
                "only {} of {} seats finished their course",
                report.finished.len(),
                self.seats
            ));
        }
        if !report.is_clean() {
            return Err(format!("stop was not clean: {:?}", report));
        }

        Ok(ScenarioMetrics {
            bites,
            abandoned: Self::sum_abandoned(&service),
            stragglers: report.stragglers.len() as u64,
            courses: 1,
            virtual_secs: ctx.now().as_secs_f64(),
        })
    }

    /// DST-002: TableForTwo - the smallest table, end to end.
    ///
    /// Two seats share the same two chopsticks in opposite order.
    /// **Assertions**: exactly 20 bites, both chopsticks free afterwards.
    async fn run_table_for_two(&self) -> Result<ScenarioMetrics, String> {
        info!("DST-002: TableForTwo - two seats, twenty bites");

        let ctx = SimContext::shared(self.seed);
        let config = DinnerConfig::default();
        let mut service =
            DinnerService::with_seats(Arc::clone(&ctx), 2, config).map_err(|e| e.to_string())?;

        Oracle::audit_wiring(service.table()).map_err(|v| v.to_string())?;
        let mut oracle = Oracle::new(service.table());

        service.start().map_err(|e| e.to_string())?;
        self.drive_course(&service, &mut oracle).await?;

        let bites = service.table().total_bites();
        if bites != 20 {
            return Err(format!("expected exactly 20 bites, counted {}", bites));
        }
        oracle
            .audit_final(service.table())
            .map_err(|v| v.to_string())?;

        let report = service.stop().await.map_err(|e| e.to_string())?;
        if report.finished.len() != 2 {
            return Err(format!(
                "only {} of 2 seats finished their course",
                report.finished.len()
            ));
        }

        Ok(ScenarioMetrics {
            bites,
            abandoned: Self::sum_abandoned(&service),
            stragglers: report.stragglers.len() as u64,
            courses: 1,
            virtual_secs: ctx.now().as_secs_f64(),
        })
    }

    /// DST-003: Restart - stop a dinner mid-course, then run a fresh one.
    ///
    /// **Assertions**: after stop the service is idle, every plate is
    /// full again, every chopstick is on the table; the second course
    /// then completes like any other.
    async fn run_restart(&self) -> Result<ScenarioMetrics, String> {
        info!("DST-003: Restart - interrupt, reset, dine again");

        let ctx = SimContext::shared(self.seed);
        let mut service = DinnerService::with_seats(Arc::clone(&ctx), self.seats, self.config())
            .map_err(|e| e.to_string())?;
        let mut oracle = Oracle::new(service.table());

        service.start().map_err(|e| e.to_string())?;

        // let the party make visible progress before pulling the plug
        let target = 3u64.min(self.seats as u64 * u64::from(self.servings));
        let deadline = Instant::now() + Duration::from_secs_f64(self.max_wall_secs);
        while service.table().total_bites() < target {
            oracle
                .observe(service.table())
                .map_err(|v| v.to_string())?;
            if Instant::now() > deadline {
                return Err(format!(
                    "no progress: fewer than {} bites within the deadline",
                    target
                ));
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let first_report = service.stop().await.map_err(|e| e.to_string())?;
        if service.state() != RunState::Idle {
            return Err("service not idle after stop".to_string());
        }
        for phil in service.table().philosophers() {
            if phil.meal().remaining() != phil.meal().servings() {
                return Err(format!(
                    "{} kept a partial plate across the stop",
                    phil.seat()
                ));
            }
        }
        for stick in service.table().chopsticks() {
            if stick.is_held() {
                return Err(format!("chopstick {} held while idle", stick.index()));
            }
        }
        oracle.note_reset();

        // fresh course from full plates
        service.start().map_err(|e| e.to_string())?;
        self.drive_course(&service, &mut oracle).await?;

        let bites = service.table().total_bites();
        oracle
            .audit_final(service.table())
            .map_err(|v| v.to_string())?;
        let second_report = service.stop().await.map_err(|e| e.to_string())?;
        if second_report.finished.len() != self.seats {
            return Err(format!(
                "only {} of {} seats finished the second course",
                second_report.finished.len(),
                self.seats
            ));
        }

        Ok(ScenarioMetrics {
            bites,
            abandoned: Self::sum_abandoned(&service),
            stragglers: (first_report.stragglers.len() + second_report.stragglers.len()) as u64,
            courses: 1,
            virtual_secs: ctx.now().as_secs_f64(),
        })
    }

    /// DST-004: Resize - clamping, the running lock, and a rebuilt table.
    ///
    /// **Assertions**: resizes clamp at 2 and 10, a resize during a run
    /// is refused without changing anything, and the rebuilt table runs
    /// a full course.
    async fn run_resize(&self) -> Result<ScenarioMetrics, String> {
        info!("DST-004: Resize - clamped bounds and the running lock");

        let ctx = SimContext::shared(self.seed);
        let mut service =
            DinnerService::with_seats(Arc::clone(&ctx), Population::MIN, self.config())
                .map_err(|e| e.to_string())?;

        // clamp at the bottom, then at the top
        let seats = service.resize(-5).map_err(|e| e.to_string())?;
        if seats != Population::MIN {
            return Err(format!("expected clamp to {}, got {}", Population::MIN, seats));
        }
        let seats = service.resize(100).map_err(|e| e.to_string())?;
        if seats != Population::MAX {
            return Err(format!("expected clamp to {}, got {}", Population::MAX, seats));
        }

        // locked while a dinner runs
        service.start().map_err(|e| e.to_string())?;
        match service.resize(1) {
            Err(ServiceError::SeatsLocked) => {}
            other => return Err(format!("resize while running returned {:?}", other)),
        }
        if service.seats() != Population::MAX {
            return Err("party size changed while locked".to_string());
        }
        service.stop().await.map_err(|e| e.to_string())?;

        // rebuild mid-range and run the course
        let seats = service.resize(-3).map_err(|e| e.to_string())?;
        if seats != 7 {
            return Err(format!("expected 7 seats after resize, got {}", seats));
        }
        Oracle::audit_wiring(service.table()).map_err(|v| v.to_string())?;
        let mut oracle = Oracle::new(service.table());

        service.start().map_err(|e| e.to_string())?;
        self.drive_course(&service, &mut oracle).await?;

        let bites = service.table().total_bites();
        oracle
            .audit_final(service.table())
            .map_err(|v| v.to_string())?;
        let report = service.stop().await.map_err(|e| e.to_string())?;
        if report.finished.len() != 7 {
            return Err(format!(
                "only {} of 7 seats finished their course",
                report.finished.len()
            ));
        }

        Ok(ScenarioMetrics {
            bites,
            abandoned: Self::sum_abandoned(&service),
            stragglers: report.stragglers.len() as u64,
            courses: 1,
            virtual_secs: ctx.now().as_secs_f64(),
        })
    }

    /// DST-005: Gauntlet - every supported size runs to empty plates.
    ///
    /// Each size gets its own derived seed and fresh table.
    /// **Assertion**: no size deadlocks or stalls out.
    async fn run_gauntlet(&self) -> Result<ScenarioMetrics, String> {
        info!("DST-005: Gauntlet - every table size, back to back");

        let mut metrics = ScenarioMetrics::default();
        for seats in Population::MIN..=Population::MAX {
            let seed = self
                .seed
                .wrapping_add(seats as u64)
                .wrapping_mul(0x9e3779b97f4a7c15);
            let ctx = SimContext::shared(seed);
            let mut service = DinnerService::with_seats(Arc::clone(&ctx), seats, self.config())
                .map_err(|e| format!("{} seats: {}", seats, e))?;

            Oracle::audit_wiring(service.table())
                .map_err(|v| format!("{} seats: {}", seats, v))?;
            let mut oracle = Oracle::new(service.table());

            service.start().map_err(|e| format!("{} seats: {}", seats, e))?;
            self.drive_course(&service, &mut oracle)
                .await
                .map_err(|e| format!("{} seats: {}", seats, e))?;

            let bites = service.table().total_bites();
            oracle
                .audit_final(service.table())
                .map_err(|v| format!("{} seats: {}", seats, v))?;
            let report = service
                .stop()
                .await
                .map_err(|e| format!("{} seats: {}", seats, e))?;
            if report.finished.len() != seats {
                return Err(format!(
                    "{} seats: only {} finished their course",
                    seats,
                    report.finished.len()
                ));
            }

            metrics.bites += bites;
            metrics.abandoned += Self::sum_abandoned(&service);
            metrics.courses += 1;
            metrics.virtual_secs += ctx.now().as_secs_f64();
            debug!("  {} seats ✓ ({} bites)", seats, bites);
        }
        Ok(metrics)
    }
}
