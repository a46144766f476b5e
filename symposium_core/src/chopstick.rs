//! A shared chopstick: binary mutual exclusion with owner tracking.

use crate::error::ChopstickError;
use crate::philosopher::SeatId;
use std::sync::Mutex;
use tokio::sync::Notify;
use tracing::trace;

/// One chopstick on the table, shared by exactly two neighboring seats.
///
/// The holder is a single `Option<SeatId>` slot behind a mutex, so two
/// simultaneous holders cannot even be represented. Waiting is
/// cooperative: a blocked philosopher parks on `freed` until the current
/// holder puts the chopstick down.
#[derive(Debug)]
pub struct Chopstick {
    /// Position on the table, also its identity in logs and errors
    index: usize,

    /// Current holder, `None` while the chopstick lies on the table
    holder: Mutex<Option<SeatId>>,

    /// Wakes the waiting neighbor on release
    freed: Notify,
}

impl Chopstick {
    /// Creates a free chopstick at the given table position.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            holder: Mutex::new(None),
            freed: Notify::new(),
        }
    }

    /// Position of this chopstick on the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Non-blocking occupancy check.
    ///
    /// The answer is advisory: the chopstick can change hands right after
    /// this returns. The dining protocol deliberately leans on that gap
    /// (see `Philosopher::dine`).
    pub fn is_held(&self) -> bool {
        self.holder.lock().unwrap().is_some()
    }

    /// Seat currently holding this chopstick, if any.
    pub fn holder(&self) -> Option<SeatId> {
        *self.holder.lock().unwrap()
    }

    /// Waits until the chopstick is free, then marks it held by `seat`.
    ///
    /// At most one task ever waits here at a time: each chopstick has two
    /// sharers and the holder never re-acquires. A release that lands
    /// between the occupancy check and the park stores a permit in
    /// `freed`, so the wakeup cannot be lost.
    pub async fn acquire(&self, seat: SeatId) {
        loop {
            {
                let mut holder = self.holder.lock().unwrap();
                if holder.is_none() {
                    *holder = Some(seat);
                    trace!("chopstick {} picked up by {}", self.index, seat);
                    return;
                }
            }
            self.freed.notified().await;
        }
    }

    /// Puts the chopstick down and wakes the waiting neighbor.
    ///
    /// Only the holder may release. Anything else is a broken
    /// precondition reported to the caller, who treats it as fatal to the
    /// offending philosopher's task.
    pub fn release(&self, seat: SeatId) -> Result<(), ChopstickError> {
        let mut holder = self.holder.lock().unwrap();
        match *holder {
            Some(current) if current == seat => {
                *holder = None;
                drop(holder);
                trace!("chopstick {} put down by {}", self.index, seat);
                self.freed.notify_one();
                Ok(())
            }
            Some(current) => Err(ChopstickError::HeldByOther {
                index: self.index,
                holder: current,
                releaser: seat,
            }),
            None => Err(ChopstickError::NotHeld { index: self.index }),
        }
    }

    /// Clears the holder regardless of who it is, waking any waiter.
    ///
    /// Recovery path for tasks that were aborted mid-protocol; the normal
    /// cycle always goes through `release`. Returns the seat that was
    /// still attributed, if any.
    pub(crate) fn force_release(&self) -> Option<SeatId> {
        let mut holder = self.holder.lock().unwrap();
        let previous = holder.take();
        drop(holder);
        if previous.is_some() {
            self.freed.notify_one();
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_acquire_marks_held() {
        let stick = Chopstick::new(0);
        assert!(!stick.is_held());

        stick.acquire(SeatId(1)).await;
        assert!(stick.is_held());
        assert_eq!(stick.holder(), Some(SeatId(1)));
    }

    #[tokio::test]
    async fn test_release_frees() {
        let stick = Chopstick::new(0);
        stick.acquire(SeatId(1)).await;
        stick.release(SeatId(1)).unwrap();

        assert!(!stick.is_held());
        assert_eq!(stick.holder(), None);
    }

    #[tokio::test]
    async fn test_release_not_held_is_error() {
        let stick = Chopstick::new(2);
        let err = stick.release(SeatId(0)).unwrap_err();
        assert_eq!(err, ChopstickError::NotHeld { index: 2 });
    }

    #[tokio::test]
    async fn test_release_by_wrong_seat_is_error() {
        let stick = Chopstick::new(5);
        stick.acquire(SeatId(1)).await;

        let err = stick.release(SeatId(2)).unwrap_err();
        assert_eq!(
            err,
            ChopstickError::HeldByOther {
                index: 5,
                holder: SeatId(1),
                releaser: SeatId(2),
            }
        );
        // still held by the rightful owner
        assert_eq!(stick.holder(), Some(SeatId(1)));
    }

    #[tokio::test]
    async fn test_acquire_blocks_until_release() {
        let stick = Arc::new(Chopstick::new(0));
        stick.acquire(SeatId(0)).await;

        let contender = Arc::clone(&stick);
        let waiter = tokio::spawn(async move {
            contender.acquire(SeatId(1)).await;
        });

        // the contender cannot finish while the holder keeps the stick
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        stick.release(SeatId(0)).unwrap();
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake after release")
            .unwrap();
        assert_eq!(stick.holder(), Some(SeatId(1)));
    }

    #[tokio::test]
    async fn test_release_before_park_is_not_lost() {
        // Exercises the stored-permit path: release fires while the
        // contender is between its occupancy check and the park.
        let stick = Arc::new(Chopstick::new(0));
        for round in 0..50u64 {
            stick.acquire(SeatId(0)).await;
            let contender = Arc::clone(&stick);
            let waiter = tokio::spawn(async move {
                contender.acquire(SeatId(1)).await;
            });
            tokio::time::sleep(Duration::from_micros(round % 7)).await;
            stick.release(SeatId(0)).unwrap();
            timeout(Duration::from_secs(1), waiter)
                .await
                .expect("handoff must complete")
                .unwrap();
            stick.release(SeatId(1)).unwrap();
        }
    }

    #[tokio::test]
    async fn test_force_release_reports_previous_holder() {
        let stick = Chopstick::new(1);
        assert_eq!(stick.force_release(), None);

        stick.acquire(SeatId(3)).await;
        assert_eq!(stick.force_release(), Some(SeatId(3)));
        assert!(!stick.is_held());
    }
}
