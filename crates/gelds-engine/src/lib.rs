//! Game-state and economy engine for Gelds.
//!
//! Provides [`GameEngine`], the controller that owns the game state,
//! validates purchases and upgrades, runs one production thread per
//! owned worker, and publishes immutable [`GameSnapshot`]s to any
//! number of subscribers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod economy;
pub mod game;
pub mod generation;
pub mod metrics;
pub mod publish;
pub(crate) mod scheduler;
pub mod state;

pub use config::{ClickConfig, ConfigError, GameConfig, JobSpec};
pub use game::{GameEngine, ShutdownReport};
pub use generation::ProductionToken;
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use publish::Subscription;
pub use state::{GameSnapshot, Job, Worker, WorkerStatus};
