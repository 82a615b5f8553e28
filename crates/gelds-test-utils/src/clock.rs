//! Simulated clock.
//!
//! [`ManualClock`] only moves when a test calls
//! [`advance`](ManualClock::advance). Every worker timer is registered
//! with the clock (at purchase via `arm`, then on each `sleep_until`),
//! so `advance` can step time from deadline to deadline and wait until
//! every worker whose deadline has passed has submitted its credit and
//! gone back to sleep. When `advance` returns, the game state reflects
//! all cycles that completed in the elapsed interval.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use gelds_core::{Clock, TimerId, Wake};

/// Real time allowed for worker threads to catch up after each step.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

struct Inner {
    now: Duration,
    timers: HashMap<TimerId, Duration>,
}

/// Deterministic [`Clock`] driven by the test thread.
pub struct ManualClock {
    inner: Mutex<Inner>,
    changed: Condvar,
}

impl ManualClock {
    /// A clock at time zero with no timers.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                now: Duration::ZERO,
                timers: HashMap::new(),
            }),
            changed: Condvar::new(),
        }
    }

    /// A new clock behind an `Arc`, ready to hand to an engine.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move time forward by `by`, firing every deadline on the way in
    /// chronological order.
    ///
    /// Returns once all timers are due strictly after the new time.
    ///
    /// # Panics
    ///
    /// If worker threads fail to settle within a generous real-time
    /// bound, which indicates a deadlock in the code under test.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.lock();
        let target = inner.now + by;
        loop {
            let next = inner
                .timers
                .values()
                .copied()
                .filter(|&d| d > inner.now)
                .min()
                .map_or(target, |d| d.min(target));
            inner.now = next;
            self.changed.notify_all();
            inner = self.settle_locked(inner);
            if inner.now >= target {
                return;
            }
        }
    }

    /// Wait until no registered timer is due.
    pub fn settle(&self) {
        let inner = self.lock();
        drop(self.settle_locked(inner));
    }

    fn settle_locked<'a>(&'a self, mut inner: MutexGuard<'a, Inner>) -> MutexGuard<'a, Inner> {
        let give_up = Instant::now() + SETTLE_TIMEOUT;
        while inner.timers.values().any(|&d| d <= inner.now) {
            let left = give_up.saturating_duration_since(Instant::now());
            if left.is_zero() {
                panic!(
                    "ManualClock: {} timer(s) still due at {:?} after {:?}",
                    inner.timers.values().filter(|&&d| d <= inner.now).count(),
                    inner.now,
                    SETTLE_TIMEOUT
                );
            }
            let (guard, _) = self
                .changed
                .wait_timeout(inner, left)
                .unwrap_or_else(PoisonError::into_inner);
            inner = guard;
        }
        inner
    }

    /// Number of registered timers.
    pub fn armed_timers(&self) -> usize {
        self.lock().timers.len()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.lock().now
    }

    fn arm(&self, timer: TimerId, deadline: Duration) {
        self.lock().timers.insert(timer, deadline);
        self.changed.notify_all();
    }

    fn sleep_until(&self, timer: TimerId, deadline: Duration, cancel: &AtomicBool) -> Wake {
        let mut inner = self.lock();
        inner.timers.insert(timer, deadline);
        self.changed.notify_all();
        loop {
            if cancel.load(Ordering::Acquire) {
                return Wake::Cancelled;
            }
            if inner.now >= deadline {
                return Wake::Elapsed;
            }
            inner = self
                .changed
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn disarm(&self, timer: TimerId) {
        self.lock().timers.remove(&timer);
        self.changed.notify_all();
    }

    fn interrupt(&self) {
        let _guard = self.lock();
        self.changed.notify_all();
    }
}
