//! Game state as observed by callers: jobs, workers, and snapshots.
//!
//! A [`GameSnapshot`] is immutable once published. Mutations clone the
//! current snapshot, apply the change to the clone, and publish the
//! clone as the next version, so an observer always holds a complete,
//! self-consistent state.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;

use gelds_core::{CostCurve, Currency, Generation, JobId, ProductionTier, SnapshotVersion};

use crate::config::GameConfig;

/// A catalog entry at its current level.
#[derive(Clone, Debug)]
pub struct Job {
    id: JobId,
    name: Arc<str>,
    level: u32,
    curve: Arc<CostCurve>,
}

impl Job {
    pub(crate) fn new(id: JobId, name: Arc<str>, curve: Arc<CostCurve>) -> Self {
        Self {
            id,
            name,
            level: 1,
            curve,
        }
    }

    /// Catalog identifier.
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current level (starts at 1).
    pub fn level(&self) -> u32 {
        self.level
    }

    /// The job's cost curve.
    pub fn curve(&self) -> &CostCurve {
        &self.curve
    }

    /// The tier at the current level.
    pub fn tier(&self) -> ProductionTier {
        self.curve.tier(self.level)
    }

    /// Price of buying a worker for this job right now.
    pub fn purchase_cost(&self) -> Currency {
        self.curve.cost(self.level)
    }

    /// Price of the next upgrade.
    pub fn upgrade_cost(&self) -> Currency {
        self.curve.cost(self.level.saturating_add(1))
    }

    /// Earnings of a cycle completing at the current level.
    pub fn earn(&self) -> Currency {
        self.curve.earn(self.level)
    }

    /// Duration of a cycle starting at the current level.
    pub fn cycle_duration(&self) -> Duration {
        self.curve.duration(self.level)
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        self.level = level;
    }
}

/// Whether a worker is producing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerStatus {
    /// The production thread is running.
    Producing,
    /// The production thread could not be started; the worker earns
    /// nothing until the next reset.
    Faulted {
        /// Why scheduling failed.
        reason: String,
    },
}

/// An owned worker, bound to one job by ID.
///
/// The worker stores no tier: every cycle looks the job up
/// by ID so upgrades take effect without rebuilding the worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Worker {
    job_id: JobId,
    status: WorkerStatus,
    cycles_completed: u64,
    earned: Currency,
}

impl Worker {
    pub(crate) fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            status: WorkerStatus::Producing,
            cycles_completed: 0,
            earned: Currency::zero(),
        }
    }

    /// The job this worker produces for.
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Production status.
    pub fn status(&self) -> &WorkerStatus {
        &self.status
    }

    /// Whether the worker is producing.
    pub fn is_producing(&self) -> bool {
        self.status == WorkerStatus::Producing
    }

    /// Number of cycles credited in this generation.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Total Gelds this worker has credited in this generation.
    pub fn earned(&self) -> &Currency {
        &self.earned
    }

    pub(crate) fn record_cycle(&mut self, earn: &Currency) {
        self.cycles_completed += 1;
        self.earned = &self.earned + earn;
    }

    pub(crate) fn set_status(&mut self, status: WorkerStatus) {
        self.status = status;
    }
}

/// An immutable, fully consistent copy of the game state.
#[derive(Clone, Debug)]
pub struct GameSnapshot {
    pub(crate) version: SnapshotVersion,
    pub(crate) generation: Generation,
    pub(crate) stashed_money: Currency,
    pub(crate) jobs: IndexMap<JobId, Job>,
    pub(crate) workers: IndexMap<JobId, Worker>,
    pub(crate) click_power: Currency,
    pub(crate) click_upgraded: bool,
}

impl GameSnapshot {
    /// The state a fresh game starts in: no money, no workers, every
    /// job at level 1.
    pub fn initial(config: &GameConfig, generation: Generation, version: SnapshotVersion) -> Self {
        let jobs = config
            .catalog
            .iter()
            .map(|spec| {
                let job = Job::new(spec.id, Arc::from(spec.name.as_str()), Arc::new(spec.curve.clone()));
                (spec.id, job)
            })
            .collect();
        Self {
            version,
            generation,
            stashed_money: Currency::zero(),
            jobs,
            workers: IndexMap::new(),
            click_power: config.click.base_power.clone(),
            click_upgraded: false,
        }
    }

    /// Publication counter; strictly increasing across all mutations.
    pub fn version(&self) -> SnapshotVersion {
        self.version
    }

    /// Reset counter this state belongs to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Current balance.
    pub fn stashed_money(&self) -> &Currency {
        &self.stashed_money
    }

    /// The catalog, in configuration order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    /// Look up a job by ID.
    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.jobs.get(&id)
    }

    /// Owned workers, in purchase order.
    pub fn workers(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    /// Look up the worker for a job.
    pub fn worker(&self, id: JobId) -> Option<&Worker> {
        self.workers.get(&id)
    }

    /// Number of owned workers.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Whether a worker has been bought for `id`.
    pub fn is_owned(&self, id: JobId) -> bool {
        self.workers.contains_key(&id)
    }

    /// Gelds credited per manual click.
    pub fn click_power(&self) -> &Currency {
        &self.click_power
    }

    /// Whether the click upgrade has been bought.
    pub fn click_upgraded(&self) -> bool {
        self.click_upgraded
    }

    /// Whether the balance covers `cost`.
    pub fn can_afford(&self, cost: &Currency) -> bool {
        &self.stashed_money >= cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_empty() {
        let config = GameConfig::default();
        let snap = GameSnapshot::initial(&config, Generation(3), SnapshotVersion(9));
        assert!(snap.stashed_money().is_zero());
        assert_eq!(snap.worker_count(), 0);
        assert_eq!(snap.generation(), Generation(3));
        assert_eq!(snap.version(), SnapshotVersion(9));
        assert_eq!(snap.click_power(), &Currency::from(1u64));
        assert!(snap.jobs().all(|j| j.level() == 1));
        let ids: Vec<_> = snap.jobs().map(Job::id).collect();
        assert_eq!(ids, vec![JobId(1), JobId(2), JobId(3)]);
    }

    #[test]
    fn job_display_values_track_level() {
        let config = GameConfig::default();
        let snap = GameSnapshot::initial(&config, Generation(0), SnapshotVersion(0));
        let mut job = snap.job(JobId(1)).unwrap().clone();
        assert_eq!(job.purchase_cost(), Currency::from(10u64));
        assert_eq!(job.upgrade_cost(), Currency::from(20u64));
        job.set_level(3);
        assert_eq!(job.tier().level, 3);
        assert_eq!(job.purchase_cost(), Currency::from(40u64));
        assert_eq!(job.earn(), Currency::from(4u64));
    }

    #[test]
    fn worker_records_cycles() {
        let mut w = Worker::new(JobId(1));
        assert!(w.is_producing());
        w.record_cycle(&Currency::from(5u64));
        w.record_cycle(&Currency::from(7u64));
        assert_eq!(w.cycles_completed(), 2);
        assert_eq!(w.earned(), &Currency::from(12u64));
        w.set_status(WorkerStatus::Faulted {
            reason: "spawn failed".into(),
        });
        assert!(!w.is_producing());
    }
}
