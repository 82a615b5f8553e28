//! Gelds: an idle-game economy engine.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the Gelds sub-crates. For most users, adding `gelds` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use gelds::prelude::*;
//!
//! let engine = GameEngine::new(GameConfig::default()).unwrap();
//! for _ in 0..10 {
//!     engine.click().unwrap();
//! }
//! let snap = engine.add_worker(JobId(1)).unwrap();
//! assert!(snap.is_owned(JobId(1)));
//! assert!(snap.stashed_money().is_zero());
//!
//! let err = engine.add_worker(JobId(1)).unwrap_err();
//! assert_eq!(err, GameError::AlreadyOwned { job: JobId(1) });
//!
//! let report = engine.shutdown();
//! assert_eq!(report.workers_joined, 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `gelds-core` | Currency, cost curves, IDs, errors, the `Clock` trait |
//! | [`engine`] | `gelds-engine` | Game state, economy rules, the controller, subscriptions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`gelds-core`).
///
/// [`types::Currency`] for balances, [`types::CostCurve`] for per-level
/// pricing, and the [`types::Clock`] trait that drives production.
pub use gelds_core as types;

/// Game engine (`gelds-engine`).
///
/// [`engine::GameEngine`] owns the state and runs the workers; the pure
/// rules in [`engine::economy`] can be used to preview an operation.
pub use gelds_engine as engine;

/// Common imports for typical Gelds usage.
///
/// ```rust
/// use gelds::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use gelds_core::{Clock, CostCurve, Currency, Growth, JobId, ProductionTier, SystemClock};

    // Errors
    pub use gelds_core::{CurveError, GameError, InsufficientFunds};

    // Engine
    pub use gelds_engine::{
        ClickConfig, ConfigError, GameConfig, GameEngine, GameSnapshot, Job, JobSpec,
        MetricsSnapshot, ShutdownReport, Subscription, Worker, WorkerStatus,
    };
}
