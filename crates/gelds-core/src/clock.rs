//! Time source for production cycles.
//!
//! Worker threads never call `thread::sleep` directly: they sleep on a
//! [`Clock`] so that tests can drive cycles with a simulated clock and
//! so that cancellation can interrupt a sleep immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::id::TimerId;

/// Why [`Clock::sleep_until`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wake {
    /// The deadline was reached.
    Elapsed,
    /// The cancel flag was observed set before the deadline.
    Cancelled,
}

/// A monotonic time source that worker threads can sleep on.
///
/// Times are offsets from the clock's own origin. The registration
/// hooks ([`arm`](Clock::arm), [`disarm`](Clock::disarm)) let a
/// simulated clock account for every pending timer, including one whose
/// thread has not started running yet.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;

    /// Register that `timer` will next fire at `deadline`.
    ///
    /// Called by the engine inside the purchase transaction, before the
    /// worker thread is spawned.
    fn arm(&self, _timer: TimerId, _deadline: Duration) {}

    /// Block the calling thread until `deadline`, or until `cancel` is
    /// observed set.
    ///
    /// Implementations must re-check `cancel` whenever the thread is
    /// unparked or [`interrupt`](Clock::interrupt) is called.
    fn sleep_until(&self, timer: TimerId, deadline: Duration, cancel: &AtomicBool) -> Wake;

    /// Forget `timer`. Called when its worker thread exits.
    fn disarm(&self, _timer: TimerId) {}

    /// Wake every sleeper so it re-checks its cancel flag.
    fn interrupt(&self) {}
}

/// Wall-clock implementation backed by [`Instant`].
///
/// Sleeps with `thread::park_timeout`, so unparking the worker thread
/// wakes it immediately regardless of the remaining cycle time.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// A clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep_until(&self, _timer: TimerId, deadline: Duration, cancel: &AtomicBool) -> Wake {
        loop {
            if cancel.load(Ordering::Acquire) {
                return Wake::Cancelled;
            }
            let now = self.now();
            match deadline.checked_sub(now) {
                Some(remaining) if !remaining.is_zero() => thread::park_timeout(remaining),
                _ => return Wake::Elapsed,
            }
        }
    }
}

// Compile-time assertion: SystemClock must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<SystemClock>();
};
