//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a job in the catalog.
///
/// Job IDs are fixed by the catalog configuration and survive resets:
/// a reset recreates every job at level 1 under the same ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for JobId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies one lifetime of the game state.
///
/// Incremented on every reset. Worker threads carry the generation they
/// were started under; a credit tagged with a retired generation is
/// discarded instead of applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(pub u64);

impl Generation {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Generation {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing snapshot version.
///
/// Every committed mutation (click, purchase, upgrade, credit, reset)
/// publishes exactly one new version. Versions keep increasing across
/// resets so observers can order snapshots without consulting the
/// generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotVersion(pub u64);

impl SnapshotVersion {
    /// The version that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SnapshotVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SnapshotVersion {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a snapshot subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter for unique [`TimerId`] allocation.
static TIMER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-worker timer identifier.
///
/// Allocated from a monotonic atomic counter via [`TimerId::next`].
/// A worker bought again after a reset gets a fresh timer, so a clock
/// never confuses the retired thread's registration with the new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Allocate a fresh, unique timer ID. Thread-safe.
    pub fn next() -> Self {
        Self(TIMER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_ids_are_unique() {
        let a = TimerId::next();
        let b = TimerId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn generation_and_version_advance() {
        assert_eq!(Generation(0).next(), Generation(1));
        assert_eq!(SnapshotVersion(41).next(), SnapshotVersion(42));
        assert_eq!(JobId::from(7).to_string(), "7");
    }
}
