//! The dining cycle: think, reach for both chopsticks, eat, repeat.
//!
//! The protocol is deliberately the naive one. A philosopher peeks at a
//! chopstick before reaching for it and walks away from the whole
//! attempt if it looks busy, so nobody knowingly waits while holding a
//! chopstick. The peek is not atomic with the reach, which leaves a
//! narrow window where a blocking wait with one chopstick in hand can
//! still happen, and the retry loop is livelock-prone under adversarial
//! timing. That behavior is the system under study here and must not be
//! "fixed" with resource ordering or arbitration.

use crate::chopstick::Chopstick;
use crate::config::DinnerConfig;
use crate::error::ChopstickError;
use crate::meal::Meal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use symposium_env::DinnerContext;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Seat number at the table. Philosophers, meals, and chopstick
/// ownership are all tracked by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeatId(pub usize);

impl SeatId {
    /// Zero-based position around the table.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SeatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "seat {}", self.0)
    }
}

/// What a philosopher was doing at the moment of observation.
///
/// A philosopher whose meal is finished keeps reporting `Thinking`;
/// finishing is an exit outcome, not a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Between eat attempts
    Thinking,
    /// Checking or picking up the first chopstick
    ReachingForFirst,
    /// Checking or picking up the second chopstick
    ReachingForSecond,
    /// Both chopsticks in hand, taking a bite
    Eating,
}

/// Lock-free phase slot readable by observers while the owner dines.
#[derive(Debug)]
struct PhaseCell(AtomicU8);

impl PhaseCell {
    fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    fn set(&self, phase: Phase) {
        let code = match phase {
            Phase::Thinking => 0,
            Phase::ReachingForFirst => 1,
            Phase::ReachingForSecond => 2,
            Phase::Eating => 3,
        };
        self.0.store(code, Ordering::SeqCst);
    }

    fn get(&self) -> Phase {
        match self.0.load(Ordering::SeqCst) {
            0 => Phase::Thinking,
            1 => Phase::ReachingForFirst,
            2 => Phase::ReachingForSecond,
            _ => Phase::Eating,
        }
    }
}

/// How a dining task exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CourseOutcome {
    /// The meal was eaten to the last bite
    Finished,
    /// The shutdown signal arrived first
    Cancelled,
}

/// What came of a single eat attempt.
enum EatAttempt {
    /// Both chopsticks were acquired and a bite was taken
    Ate,
    /// A chopstick looked busy, everything held was put back
    Abandoned,
    /// The shutdown signal arrived after an acquire already in flight
    Interrupted,
}

/// One seat at the table: a philosopher, their meal, and the two
/// chopsticks shared with the neighbors.
///
/// All state an observer can read (phase, meal countdown, counters) is
/// atomic, so a status poller never blocks the dining task.
#[derive(Debug)]
pub struct Philosopher {
    seat: SeatId,
    first: Arc<Chopstick>,
    second: Arc<Chopstick>,
    meal: Meal,
    phase: PhaseCell,

    /// Completed eat cycles (bites taken)
    cycles: AtomicU64,

    /// Attempts walked away from because a chopstick looked busy
    abandoned: AtomicU64,
}

impl Philosopher {
    /// Seats a philosopher with their chopstick pair and a full meal.
    pub fn new(seat: SeatId, first: Arc<Chopstick>, second: Arc<Chopstick>, servings: u32) -> Self {
        Self {
            seat,
            first,
            second,
            meal: Meal::new(servings),
            phase: PhaseCell::new(),
            cycles: AtomicU64::new(0),
            abandoned: AtomicU64::new(0),
        }
    }

    /// This philosopher's seat.
    pub fn seat(&self) -> SeatId {
        self.seat
    }

    /// Chopstick reached for first.
    pub fn first(&self) -> &Arc<Chopstick> {
        &self.first
    }

    /// Chopstick reached for second.
    pub fn second(&self) -> &Arc<Chopstick> {
        &self.second
    }

    /// This philosopher's meal.
    pub fn meal(&self) -> &Meal {
        &self.meal
    }

    /// Current phase as last published by the dining task.
    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    /// Completed eat cycles so far.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::SeqCst)
    }

    /// Eat attempts walked away from so far.
    pub fn abandoned_attempts(&self) -> u64 {
        self.abandoned.load(Ordering::SeqCst)
    }

    /// Runs the dining cycle until the meal is finished or shutdown is
    /// signalled.
    ///
    /// Cancellation points: the top of every cycle, anywhere inside the
    /// think pause, and right after each chopstick acquire that was
    /// already in flight when the signal arrived. In the last case the
    /// acquire completes, everything held is put back, and the task
    /// exits. Pauses other than thinking are short and run to completion.
    pub async fn dine<C: DinnerContext>(
        &self,
        ctx: &C,
        config: &DinnerConfig,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<CourseOutcome, ChopstickError> {
        loop {
            if *shutdown.borrow() {
                debug!("{} leaves the table", self.seat);
                return Ok(CourseOutcome::Cancelled);
            }
            if self.meal.is_finished() {
                debug!(
                    "{} finished the meal after {} cycles",
                    self.seat,
                    self.cycles()
                );
                return Ok(CourseOutcome::Finished);
            }

            self.phase.set(Phase::Thinking);
            tokio::select! {
                _ = ctx.pause(config.think_delay) => {}
                _ = shutdown.changed() => {
                    debug!("{} leaves the table mid-thought", self.seat);
                    return Ok(CourseOutcome::Cancelled);
                }
            }

            match self.eat(ctx, config, &shutdown).await? {
                EatAttempt::Ate => {
                    self.cycles.fetch_add(1, Ordering::SeqCst);
                }
                EatAttempt::Abandoned => {
                    self.abandoned.fetch_add(1, Ordering::SeqCst);
                }
                EatAttempt::Interrupted => {
                    self.phase.set(Phase::Thinking);
                    debug!("{} leaves the table mid-reach", self.seat);
                    return Ok(CourseOutcome::Cancelled);
                }
            }
        }
    }

    /// One eat attempt: peek, reach, peek, reach, bite, put both back.
    ///
    /// The peek-then-acquire pairs are intentionally not atomic. A
    /// chopstick that looked free can be gone by the time the reach
    /// lands; the blocking acquire then parks until the neighbor is done,
    /// which matches a diner committed to a chopstick they already
    /// touched.
    async fn eat<C: DinnerContext>(
        &self,
        ctx: &C,
        config: &DinnerConfig,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<EatAttempt, ChopstickError> {
        self.phase.set(Phase::ReachingForFirst);
        if self.first.is_held() {
            trace!("{} backs off, first chopstick busy", self.seat);
            self.phase.set(Phase::Thinking);
            return Ok(EatAttempt::Abandoned);
        }
        self.first.acquire(self.seat).await;
        if *shutdown.borrow() {
            self.first.release(self.seat)?;
            return Ok(EatAttempt::Interrupted);
        }
        ctx.pause(config.handling_delay).await;

        self.phase.set(Phase::ReachingForSecond);
        if self.second.is_held() {
            trace!("{} backs off, second chopstick busy", self.seat);
            self.first.release(self.seat)?;
            self.phase.set(Phase::Thinking);
            return Ok(EatAttempt::Abandoned);
        }
        self.second.acquire(self.seat).await;
        if *shutdown.borrow() {
            // put both back even if the first release reports a problem
            let first = self.first.release(self.seat);
            let second = self.second.release(self.seat);
            first?;
            second?;
            return Ok(EatAttempt::Interrupted);
        }
        ctx.pause(config.handling_delay).await;

        self.phase.set(Phase::Eating);
        let left = self.meal.take_bite(ctx, config.bite_delay).await;
        trace!("{} took a bite, {} left", self.seat, left);

        self.first.release(self.seat)?;
        self.second.release(self.seat)?;
        self.phase.set(Phase::Thinking);
        Ok(EatAttempt::Ate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use symposium_env::TokioContext;
    use tokio::time::timeout;

    fn pair() -> (Arc<Chopstick>, Arc<Chopstick>) {
        (Arc::new(Chopstick::new(0)), Arc::new(Chopstick::new(1)))
    }

    fn never_shutdown() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    #[tokio::test]
    async fn test_uncontended_philosopher_finishes() {
        let ctx = TokioContext::new();
        let config = DinnerConfig::quick().with_servings(4);
        let (first, second) = pair();
        let phil = Philosopher::new(SeatId(0), Arc::clone(&first), Arc::clone(&second), 4);

        let (_tx, rx) = never_shutdown();
        let outcome = timeout(Duration::from_secs(10), phil.dine(&ctx, &config, rx))
            .await
            .expect("solo dinner must finish quickly")
            .unwrap();

        assert_eq!(outcome, CourseOutcome::Finished);
        assert_eq!(phil.meal().remaining(), 0);
        assert_eq!(phil.cycles(), 4);
        assert!(!first.is_held());
        assert!(!second.is_held());
    }

    #[tokio::test]
    async fn test_empty_meal_finishes_immediately() {
        let ctx = TokioContext::new();
        let config = DinnerConfig::quick().with_servings(0);
        let (first, second) = pair();
        let phil = Philosopher::new(SeatId(0), first, second, 0);

        let (_tx, rx) = never_shutdown();
        let outcome = phil.dine(&ctx, &config, rx).await.unwrap();
        assert_eq!(outcome, CourseOutcome::Finished);
        assert_eq!(phil.cycles(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_thinking() {
        let ctx = TokioContext::new();
        let mut config = DinnerConfig::quick();
        config.think_delay = symposium_env::DelayRange::from_secs(60, 60);
        let (first, second) = pair();
        let phil = Arc::new(Philosopher::new(SeatId(0), first, second, 10));

        let (tx, rx) = never_shutdown();
        let runner = Arc::clone(&phil);
        let ctx = Arc::new(ctx);
        let task_ctx = Arc::clone(&ctx);
        let task = tokio::spawn(async move { runner.dine(task_ctx.as_ref(), &config, rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        let outcome = timeout(Duration::from_secs(1), task)
            .await
            .expect("signal must cut the 60s think short")
            .unwrap()
            .unwrap();
        assert_eq!(outcome, CourseOutcome::Cancelled);
        assert_eq!(phil.meal().remaining(), 10);
    }

    #[tokio::test]
    async fn test_abandons_when_first_chopstick_busy() {
        let ctx = TokioContext::new();
        let mut config = DinnerConfig::quick();
        config.think_delay = symposium_env::DelayRange::from_millis(1, 2);
        let (first, second) = pair();
        // a neighbor keeps the first chopstick for the whole test
        first.acquire(SeatId(9)).await;

        let phil = Arc::new(Philosopher::new(
            SeatId(0),
            Arc::clone(&first),
            Arc::clone(&second),
            10,
        ));
        let (tx, rx) = never_shutdown();
        let runner = Arc::clone(&phil);
        let ctx = Arc::new(ctx);
        let task_ctx = Arc::clone(&ctx);
        let task = tokio::spawn(async move { runner.dine(task_ctx.as_ref(), &config, rx).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        let outcome = timeout(Duration::from_secs(1), task).await.unwrap().unwrap().unwrap();

        assert_eq!(outcome, CourseOutcome::Cancelled);
        assert!(phil.abandoned_attempts() > 0);
        assert_eq!(phil.meal().remaining(), 10);
        assert_eq!(phil.cycles(), 0);
        // the busy chopstick never changed hands
        assert_eq!(first.holder(), Some(SeatId(9)));
        assert!(!second.is_held());
    }

    #[tokio::test]
    async fn test_two_neighbors_share_a_pair_to_completion() {
        // The two-seat table in miniature: opposite reach order over the
        // same two chopsticks.
        let ctx = Arc::new(TokioContext::new());
        let config = DinnerConfig::quick().with_servings(5);
        let (a, b) = pair();

        let p0 = Arc::new(Philosopher::new(SeatId(0), Arc::clone(&a), Arc::clone(&b), 5));
        let p1 = Arc::new(Philosopher::new(SeatId(1), Arc::clone(&b), Arc::clone(&a), 5));

        let (_tx, rx) = never_shutdown();
        let mut tasks = Vec::new();
        for phil in [Arc::clone(&p0), Arc::clone(&p1)] {
            let ctx = Arc::clone(&ctx);
            let config = config.clone();
            let rx = rx.clone();
            tasks.push(tokio::spawn(async move {
                phil.dine(ctx.as_ref(), &config, rx).await
            }));
        }

        for task in tasks {
            let outcome = timeout(Duration::from_secs(30), task)
                .await
                .expect("both diners must finish")
                .unwrap()
                .unwrap();
            assert_eq!(outcome, CourseOutcome::Finished);
        }
        assert_eq!(p0.meal().bites_taken() + p1.meal().bites_taken(), 10);
        assert!(!a.is_held());
        assert!(!b.is_held());
    }
}
