//! Core types for the Gelds idle-game engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the exact [`Currency`] type, the pure [`CostCurve`] that maps a job
//! level to its [`ProductionTier`], strongly-typed identifiers, the
//! [`Clock`] abstraction worker threads sleep on, and the error types
//! shared by every other crate in the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod currency;
pub mod error;
pub mod id;
pub mod tier;

pub use clock::{Clock, SystemClock, Wake};
pub use currency::Currency;
pub use error::{CurveError, GameError, InsufficientFunds};
pub use id::{Generation, JobId, SnapshotVersion, SubscriberId, TimerId};
pub use tier::{CostCurve, Growth, ProductionTier};
