//! Generation-tagged cancellation tokens for production threads.
//!
//! Each worker thread holds a [`ProductionToken`] naming the generation
//! it was started under. A reset bumps the generation and cancels every
//! token of the retired generation; a credit is applied only if its
//! token is still current. The check runs under the engine's state lock,
//! so a completion that races a reset is discarded deterministically.

use std::sync::atomic::{AtomicBool, Ordering};

use gelds_core::{Generation, JobId};

/// Capability to credit one job's cycles within one generation.
#[derive(Debug)]
pub struct ProductionToken {
    generation: Generation,
    job: JobId,
    /// Cooperative cancellation flag, also polled by the clock while the
    /// thread sleeps.
    cancelled: AtomicBool,
}

// Compile-time assertion: ProductionToken must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ProductionToken>();
};

impl ProductionToken {
    /// A live token for `job` in `generation`.
    pub fn new(generation: Generation, job: JobId) -> Self {
        Self {
            generation,
            job,
            cancelled: AtomicBool::new(false),
        }
    }

    /// The generation this token was issued in.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The job this token credits.
    pub fn job(&self) -> JobId {
        self.job
    }

    /// Revoke the token. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the token has been revoked.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// The raw flag, for [`Clock::sleep_until`](gelds_core::Clock::sleep_until).
    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.cancelled
    }

    /// Whether a credit under this token may be applied to a state of
    /// `current` generation.
    pub fn is_current(&self, current: Generation) -> bool {
        !self.is_cancelled() && self.generation == current
    }
}
