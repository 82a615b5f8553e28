//! Engine counters.
//!
//! [`EngineMetrics`] is updated with relaxed atomics from the controller
//! and from worker threads; [`MetricsSnapshot`] is the plain-value copy
//! handed to callers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counters for one engine instance. Not reset by
/// [`GameEngine::reset`](crate::GameEngine::reset).
#[derive(Debug, Default)]
pub struct EngineMetrics {
    credits_applied: AtomicU64,
    stale_credits_discarded: AtomicU64,
    rejected_operations: AtomicU64,
    worker_faults: AtomicU64,
    snapshots_published: AtomicU64,
    resets: AtomicU64,
}

impl EngineMetrics {
    pub(crate) fn record_credit(&self) {
        self.credits_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale_credit(&self) {
        self.stale_credits_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejected_operations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fault(&self) {
        self.worker_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_publish(&self) {
        self.snapshots_published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            credits_applied: self.credits_applied.load(Ordering::Relaxed),
            stale_credits_discarded: self.stale_credits_discarded.load(Ordering::Relaxed),
            rejected_operations: self.rejected_operations.load(Ordering::Relaxed),
            worker_faults: self.worker_faults.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Production cycles credited.
    pub credits_applied: u64,
    /// Completions discarded because their generation was retired.
    pub stale_credits_discarded: u64,
    /// Operations that failed validation (funds, ownership, unknown job).
    pub rejected_operations: u64,
    /// Workers whose production thread could not be started.
    pub worker_faults: u64,
    /// Snapshots committed, including the initial one.
    pub snapshots_published: u64,
    /// Completed resets.
    pub resets: u64,
}
