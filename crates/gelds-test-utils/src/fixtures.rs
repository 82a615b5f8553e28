//! Reusable catalog fixtures.
//!
//! Two standard setups for engine testing:
//!
//! - [`steady_curve`]: one job costing 100, earning 10 per 2 s cycle,
//!   doubling cost and earn per level.
//! - [`twin_curves`]: two jobs costing 10 with 1 s cycles, earning 5 and
//!   7, so simultaneous completions sum to 12.
//!
//! Fixtures return core types only; engine tests wrap them in their own
//! `JobSpec`s.

use std::time::Duration;

use gelds_core::{CostCurve, JobId};

/// Job id used by [`steady_curve`] setups.
pub const STEADY: JobId = JobId(1);

/// Cost 100, earn 10, 2 s cycles; cost and earn double per level.
pub fn steady_curve() -> CostCurve {
    CostCurve::new(100u64, 10u64, Duration::from_secs(2))
}

/// First job of [`twin_curves`].
pub const TWIN_A: JobId = JobId(1);

/// Second job of [`twin_curves`].
pub const TWIN_B: JobId = JobId(2);

/// Two 1 s jobs costing 10, earning 5 and 7.
pub fn twin_curves() -> [(JobId, CostCurve); 2] {
    [
        (TWIN_A, CostCurve::new(10u64, 5u64, Duration::from_secs(1))),
        (TWIN_B, CostCurve::new(10u64, 7u64, Duration::from_secs(1))),
    ]
}

/// `count` jobs with ids `1..=count`, each costing 1 and earning its id
/// per `cycle`. Used by stress tests.
pub fn many_curves(count: u32, cycle: Duration) -> Vec<(JobId, CostCurve)> {
    (1..=count)
        .map(|id| (JobId(id), CostCurve::new(1u64, u64::from(id), cycle)))
        .collect()
}
