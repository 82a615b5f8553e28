//! User-facing [`GameEngine`] API and shutdown handling.
//!
//! # Architecture
//!
//! ```text
//! Caller thread(s)                 Engine core (Mutex)            Worker threads (1 per job)
//!     |                                  |                               |
//!     |--click/add_worker/upgrade------->| economy::* on snapshot        |
//!     |                                  | commit: version + 1           |
//!     |                                  |   latest.store(snap)          |
//!     |                                  |   hub.publish(snap)           |
//!     |<--Arc<GameSnapshot>--------------|                               |
//!     |                                  |                               | clock.sleep_until(deadline)
//!     |                                  |<--complete_cycle(token)-------|
//!     |                                  | token.is_current(generation)? |
//!     |                                  | economy::credit_cycle         |
//!     |                                  | commit                        |
//!     |                                  |--next duration--------------->| deadline += next
//!     |                                  |                               |
//!     |--reset()------------------------>| generation + 1, cancel tokens |
//!     |                                  | take handles, commit initial  |
//!     |  unpark + interrupt + join ----------------------------------->  | exit
//! ```
//!
//! Every mutation, including worker credits, runs under the one state
//! lock, so money changes are totally ordered and each yields a strictly
//! increasing [`SnapshotVersion`]. Threads are only ever joined outside
//! the lock.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use gelds_core::{
    Clock, Currency, GameError, Generation, JobId, SnapshotVersion, SubscriberId, SystemClock,
};

use crate::config::{ConfigError, GameConfig};
use crate::economy;
use crate::generation::ProductionToken;
use crate::metrics::{EngineMetrics, MetricsSnapshot};
use crate::publish::{LatestSnapshot, SnapshotHub, Subscription};
use crate::scheduler::{self, ProductionLedger, WorkerHandle};
use crate::state::GameSnapshot;

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`GameEngine::shutdown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Number of worker threads joined.
    pub workers_joined: usize,
}

// ── Core ─────────────────────────────────────────────────────────

/// Everything guarded by the state lock.
struct Core {
    snapshot: Arc<GameSnapshot>,
    workers: IndexMap<JobId, WorkerHandle>,
    hub: SnapshotHub,
    running: bool,
}

impl Core {
    /// Cancel every production token and take the handles.
    fn retire_workers(&mut self) -> SmallVec<[WorkerHandle; 8]> {
        for handle in self.workers.values() {
            handle.cancel();
        }
        self.workers.drain(..).map(|(_, handle)| handle).collect()
    }
}

/// Starts the production thread for a purchased worker.
type SpawnWorker = fn(
    Arc<dyn ProductionLedger>,
    Arc<dyn Clock>,
    Arc<ProductionToken>,
    Duration,
) -> io::Result<WorkerHandle>;

/// State shared between the engine handle and its worker threads.
struct Shared {
    config: GameConfig,
    core: Mutex<Core>,
    latest: LatestSnapshot,
    clock: Arc<dyn Clock>,
    spawn: SpawnWorker,
    metrics: EngineMetrics,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Core> {
        // Snapshots are replaced whole, so a panic mid-operation leaves
        // the previous commit intact.
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `next` as the new current state.
    fn commit(&self, core: &mut Core, mut next: GameSnapshot) -> Arc<GameSnapshot> {
        next.version = core.snapshot.version.next();
        let snapshot = Arc::new(next);
        core.snapshot = Arc::clone(&snapshot);
        self.latest.store(Arc::clone(&snapshot));
        core.hub.publish(&snapshot);
        self.metrics.record_publish();
        snapshot
    }

    fn reject(&self, op: &'static str, err: GameError) -> GameError {
        self.metrics.record_rejection();
        debug!(op, error = %err, "operation rejected");
        err
    }
}

impl ProductionLedger for Shared {
    fn complete_cycle(&self, token: &ProductionToken) -> Option<Duration> {
        let mut core = self.lock();
        if !core.running || !token.is_current(core.snapshot.generation) {
            self.metrics.record_stale_credit();
            debug!(
                job = %token.job(),
                token_generation = %token.generation(),
                current_generation = %core.snapshot.generation,
                "discarded stale credit"
            );
            return None;
        }
        match economy::credit_cycle(&core.snapshot, token.job()) {
            Ok((next, earned, next_cycle)) => {
                let snapshot = self.commit(&mut core, next);
                self.metrics.record_credit();
                debug!(
                    job = %token.job(),
                    earned = %earned,
                    money = %snapshot.stashed_money,
                    version = %snapshot.version,
                    "cycle credited"
                );
                Some(next_cycle)
            }
            Err(err) => {
                warn!(job = %token.job(), error = %err, "credit rejected, stopping worker");
                None
            }
        }
    }
}

// ── GameEngine ───────────────────────────────────────────────────

/// The game controller.
///
/// Owns the game state, validates and applies every operation as one
/// atomic commit, runs one production thread per owned worker, and
/// publishes each committed [`GameSnapshot`] to all subscribers.
///
/// All methods take `&self`; share the engine across threads with an
/// `Arc`. Dropping the engine shuts it down.
pub struct GameEngine {
    shared: Arc<Shared>,
}

// Compile-time assertion: GameEngine must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<GameEngine>();
};

impl GameEngine {
    /// Create an engine driven by the wall clock.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create an engine driven by `clock`.
    ///
    /// Tests pass a simulated clock here to step production cycles
    /// deterministically.
    pub fn with_clock(config: GameConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigError> {
        Self::build(config, clock, scheduler::spawn_worker)
    }

    fn build(
        config: GameConfig,
        clock: Arc<dyn Clock>,
        spawn: SpawnWorker,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let initial = Arc::new(GameSnapshot::initial(
            &config,
            Generation(0),
            SnapshotVersion(0),
        ));
        let metrics = EngineMetrics::default();
        metrics.record_publish();
        info!(jobs = config.catalog.len(), "game engine started");

        let shared = Arc::new(Shared {
            latest: LatestSnapshot::new(Arc::clone(&initial)),
            core: Mutex::new(Core {
                snapshot: initial,
                workers: IndexMap::new(),
                hub: SnapshotHub::new(),
                running: true,
            }),
            config,
            clock,
            spawn,
            metrics,
        });
        Ok(Self { shared })
    }

    /// The most recently committed snapshot.
    pub fn snapshot(&self) -> Arc<GameSnapshot> {
        self.shared.latest.load()
    }

    /// Subscribe to snapshot updates. The current snapshot is delivered
    /// first.
    pub fn subscribe(&self) -> Result<Subscription, GameError> {
        let mut core = self.shared.lock();
        if !core.running {
            return Err(GameError::ShutDown);
        }
        let current = Arc::clone(&core.snapshot);
        Ok(core.hub.subscribe(&current))
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.shared.lock().hub.unsubscribe(id)
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.shared.lock().hub.len()
    }

    /// Credit `amount` Gelds.
    pub fn click_money(&self, amount: &Currency) -> Result<Arc<GameSnapshot>, GameError> {
        self.transact("click_money", |state| Ok(economy::click(state, amount)))
    }

    /// Credit the current click power.
    pub fn click(&self) -> Result<Arc<GameSnapshot>, GameError> {
        self.transact("click", |state| Ok(economy::click(state, state.click_power())))
    }

    /// Buy a worker for `job` and start its production cycles.
    ///
    /// If the production thread cannot be started the purchase still
    /// stands, and the returned snapshot shows the worker as
    /// [`Faulted`](crate::WorkerStatus::Faulted).
    pub fn add_worker(&self, job: JobId) -> Result<Arc<GameSnapshot>, GameError> {
        let mut core = self.shared.lock();
        if !core.running {
            return Err(GameError::ShutDown);
        }
        let (mut next, first_cycle) = economy::buy_worker(&core.snapshot, job)
            .map_err(|err| self.shared.reject("add_worker", err))?;

        let token = Arc::new(ProductionToken::new(next.generation, job));
        let deadline = self.shared.clock.now() + first_cycle;
        let ledger: Arc<dyn ProductionLedger> = self.shared.clone();
        match (self.shared.spawn)(ledger, Arc::clone(&self.shared.clock), token, deadline) {
            Ok(handle) => {
                core.workers.insert(job, handle);
            }
            Err(err) => {
                self.shared.metrics.record_fault();
                warn!(job = %job, error = %err, "failed to start production thread");
                next = economy::mark_faulted(&next, job, err.to_string());
            }
        }

        let snapshot = self.shared.commit(&mut core, next);
        debug!(
            job = %job,
            money = %snapshot.stashed_money,
            first_cycle_ms = first_cycle.as_millis() as u64,
            "worker added"
        );
        Ok(snapshot)
    }

    /// Raise `job` one level.
    pub fn upgrade_job(&self, job: JobId) -> Result<Arc<GameSnapshot>, GameError> {
        let snapshot = self.transact("upgrade_job", |state| economy::upgrade_job(state, job))?;
        if let Some(entry) = snapshot.job(job) {
            debug!(job = %job, level = entry.level(), money = %snapshot.stashed_money, "job upgraded");
        }
        Ok(snapshot)
    }

    /// Buy the one-time click upgrade.
    pub fn buy_click_upgrade(&self) -> Result<Arc<GameSnapshot>, GameError> {
        let click = &self.shared.config.click;
        self.transact("buy_click_upgrade", |state| {
            economy::buy_click_upgrade(state, click)
        })
    }

    /// Start a new game: stop every worker, zero the balance, and return
    /// every job to level 1.
    ///
    /// When this returns, no production thread of the previous game is
    /// alive, and no completion that raced the reset has been credited.
    pub fn reset(&self) -> Result<Arc<GameSnapshot>, GameError> {
        let (snapshot, retired) = {
            let mut core = self.shared.lock();
            if !core.running {
                return Err(GameError::ShutDown);
            }
            let generation = core.snapshot.generation.next();
            let retired = core.retire_workers();
            let fresh = GameSnapshot::initial(&self.shared.config, generation, core.snapshot.version);
            (self.shared.commit(&mut core, fresh), retired)
        };

        let stopped = scheduler::stop_all(retired, self.shared.clock.as_ref());
        self.shared.metrics.record_reset();
        info!(
            generation = %snapshot.generation,
            workers_stopped = stopped,
            "game reset"
        );
        Ok(snapshot)
    }

    /// Stop all production and disconnect subscribers.
    ///
    /// Idempotent. Later operations fail with [`GameError::ShutDown`];
    /// [`snapshot`](Self::snapshot) keeps returning the final state.
    pub fn shutdown(&self) -> ShutdownReport {
        let start = Instant::now();
        let retired = {
            let mut core = self.shared.lock();
            if !core.running {
                return ShutdownReport {
                    total_ms: 0,
                    workers_joined: 0,
                };
            }
            core.running = false;
            core.hub.clear();
            core.retire_workers()
        };

        let workers_joined = scheduler::stop_all(retired, self.shared.clock.as_ref());
        let total_ms = start.elapsed().as_millis() as u64;
        info!(workers_joined, total_ms, "game engine shut down");
        ShutdownReport {
            total_ms,
            workers_joined,
        }
    }

    /// Whether the engine accepts operations.
    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Current counter values.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// The validated configuration.
    pub fn config(&self) -> &GameConfig {
        &self.shared.config
    }

    /// Run a pure economy operation against the current state and commit
    /// its result.
    fn transact<F>(&self, op: &'static str, apply: F) -> Result<Arc<GameSnapshot>, GameError>
    where
        F: FnOnce(&GameSnapshot) -> Result<GameSnapshot, GameError>,
    {
        let mut core = self.shared.lock();
        if !core.running {
            return Err(GameError::ShutDown);
        }
        match apply(&core.snapshot) {
            Ok(next) => Ok(self.shared.commit(&mut core, next)),
            Err(err) => Err(self.shared.reject(op, err)),
        }
    }
}

impl Drop for GameEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("GameEngine")
            .field("version", &snapshot.version)
            .field("generation", &snapshot.generation)
            .field("workers", &snapshot.worker_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gelds_core::InsufficientFunds;
    use gelds_test_utils::{fixtures, ManualClock};

    use crate::config::JobSpec;
    use crate::state::WorkerStatus;

    fn engine() -> (GameEngine, Arc<ManualClock>) {
        let clock = ManualClock::shared();
        let config = GameConfig::with_catalog(vec![JobSpec::new(
            fixtures::STEADY,
            "steady",
            fixtures::steady_curve(),
        )]);
        let engine = GameEngine::with_clock(config, clock.clone()).unwrap();
        (engine, clock)
    }

    fn gelds(v: u64) -> Currency {
        Currency::from(v)
    }

    #[test]
    fn invalid_config_rejected() {
        let err = GameEngine::with_clock(GameConfig::with_catalog(vec![]), ManualClock::shared())
            .unwrap_err();
        assert_eq!(err, ConfigError::EmptyCatalog);
    }

    #[test]
    fn versions_strictly_increase() {
        let (engine, _clock) = engine();
        let v0 = engine.snapshot().version();
        let a = engine.click_money(&gelds(1)).unwrap().version();
        let b = engine.click().unwrap().version();
        assert!(v0 < a && a < b);
        assert_eq!(engine.snapshot().version(), b);
    }

    #[test]
    fn rejected_operation_publishes_nothing() {
        let (engine, _clock) = engine();
        let before = engine.snapshot();
        let err = engine.add_worker(JobId(1)).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientFunds(InsufficientFunds {
                required: gelds(100),
                available: gelds(0),
            })
        );
        assert_eq!(engine.snapshot().version(), before.version());
        assert_eq!(engine.metrics().rejected_operations, 1);
    }

    #[test]
    fn click_uses_click_power() {
        let (engine, _clock) = engine();
        engine.click().unwrap();
        assert_eq!(engine.snapshot().stashed_money(), &gelds(1));
        engine.click_money(&gelds(999)).unwrap();
        let snap = engine.buy_click_upgrade().unwrap();
        assert!(snap.stashed_money().is_zero());
        engine.click().unwrap();
        assert_eq!(engine.snapshot().stashed_money(), &gelds(5));
        assert_eq!(
            engine.buy_click_upgrade().unwrap_err(),
            GameError::ClickUpgradeOwned
        );
    }

    #[test]
    fn subscribe_replays_current_then_follows() {
        let (engine, _clock) = engine();
        engine.click().unwrap();
        let sub = engine.subscribe().unwrap();
        let first = sub.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(first.stashed_money(), &gelds(1));
        engine.click().unwrap();
        let second = sub.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(second.stashed_money(), &gelds(2));
        assert!(second.version() > first.version());

        assert_eq!(engine.subscriber_count(), 1);
        assert!(engine.unsubscribe(sub.id()));
        assert_eq!(engine.subscriber_count(), 0);
    }

    #[test]
    fn shutdown_is_idempotent_and_final() {
        let (engine, clock) = engine();
        engine.click_money(&gelds(100)).unwrap();
        engine.add_worker(JobId(1)).unwrap();
        let sub = engine.subscribe().unwrap();

        let report = engine.shutdown();
        assert_eq!(report.workers_joined, 1);
        assert_eq!(clock.armed_timers(), 0);
        assert!(!engine.is_running());

        let again = engine.shutdown();
        assert_eq!(again.workers_joined, 0);

        assert_eq!(engine.click().unwrap_err(), GameError::ShutDown);
        assert_eq!(engine.reset().unwrap_err(), GameError::ShutDown);
        assert_eq!(engine.subscribe().unwrap_err(), GameError::ShutDown);
        sub.latest();
        assert!(sub.is_closed());
        // The final state remains readable.
        assert!(engine.snapshot().is_owned(JobId(1)));
    }

    #[test]
    fn reset_keeps_versions_increasing() {
        let (engine, _clock) = engine();
        let before = engine.click().unwrap().version();
        let after = engine.reset().unwrap();
        assert!(after.version() > before);
        assert_eq!(after.generation(), Generation(1));
        assert!(after.stashed_money().is_zero());
        assert_eq!(engine.metrics().resets, 1);
    }

    #[test]
    fn click_upgrade_affordability_tracks_config_cost() {
        let (engine, _clock) = engine();
        let cost = engine.config().click.upgrade_cost.clone();
        assert_eq!(cost, gelds(1000));

        let short = engine.click_money(&gelds(999)).unwrap();
        assert!(!short.can_afford(&cost));
        assert!(matches!(
            engine.buy_click_upgrade().unwrap_err(),
            GameError::InsufficientFunds(_)
        ));

        let funded = engine.click().unwrap();
        assert!(funded.can_afford(&cost));
        let bought = engine.buy_click_upgrade().unwrap();
        assert!(bought.click_upgraded());
        assert!(!bought.can_afford(&gelds(1)));
    }

    #[test]
    fn spawn_failure_commits_faulted_worker() {
        let clock = ManualClock::shared();
        let config = GameConfig::with_catalog(vec![JobSpec::new(
            fixtures::STEADY,
            "steady",
            fixtures::steady_curve(),
        )]);
        let engine = GameEngine::build(config, clock.clone(), |_, _, _, _| {
            Err(io::Error::other("thread limit reached"))
        })
        .unwrap();
        engine.click_money(&gelds(150)).unwrap();

        let snap = engine.add_worker(fixtures::STEADY).unwrap();
        assert_eq!(engine.metrics().worker_faults, 1);
        assert_eq!(engine.snapshot().version(), snap.version());
        assert_eq!(snap.stashed_money(), &gelds(50));
        match snap.worker(fixtures::STEADY).unwrap().status() {
            WorkerStatus::Faulted { reason } => assert!(reason.contains("thread limit")),
            other => panic!("expected a faulted worker, got {other:?}"),
        }
        assert_eq!(clock.armed_timers(), 0);

        clock.advance(Duration::from_secs(10));
        assert_eq!(engine.snapshot().stashed_money(), &gelds(50));
        assert_eq!(
            engine.add_worker(fixtures::STEADY).unwrap_err(),
            GameError::AlreadyOwned {
                job: fixtures::STEADY
            }
        );
        assert_eq!(engine.shutdown().workers_joined, 0);
    }

    #[test]
    fn idle_subscriber_holds_only_the_newest() {
        let (engine, _clock) = engine();
        let sub = engine.subscribe().unwrap();
        for _ in 0..10_000 {
            engine.click_money(&gelds(1)).unwrap();
        }
        assert_eq!(sub.pending(), 1);
        let newest = sub.latest().unwrap();
        assert_eq!(newest.version(), engine.snapshot().version());
        assert_eq!(newest.stashed_money(), &gelds(10_000));
        assert_eq!(engine.subscriber_count(), 1);
    }

    #[test]
    fn drop_joins_workers() {
        let (engine, clock) = engine();
        engine.click_money(&gelds(100)).unwrap();
        engine.add_worker(JobId(1)).unwrap();
        assert_eq!(clock.armed_timers(), 1);
        drop(engine);
        assert_eq!(clock.armed_timers(), 0);
    }
}
