//! Error types for the Gelds engine.
//!
//! Organized by subsystem: currency arithmetic, cost-curve validation,
//! and game operations. Every game operation failure is recoverable:
//! the operation is a no-op and the state is left unchanged.

use std::error::Error;
use std::fmt;

use crate::currency::Currency;
use crate::id::JobId;

/// A debit larger than the available balance.
///
/// Returned by [`Currency::try_subtract`] and wrapped in
/// [`GameError::InsufficientFunds`] by purchases and upgrades.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsufficientFunds {
    /// The amount the operation needed.
    pub required: Currency,
    /// The balance at the time of the attempt.
    pub available: Currency,
}

impl fmt::Display for InsufficientFunds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insufficient funds: need {} but only {} available",
            self.required, self.available
        )
    }
}

impl Error for InsufficientFunds {}

/// Structural problems in a [`CostCurve`](crate::tier::CostCurve).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CurveError {
    /// The level-1 cost is zero.
    ZeroBaseCost,
    /// A growth ratio has a zero denominator.
    ZeroDenominator,
    /// The cost ratio would not make every level strictly more expensive.
    CostNotIncreasing {
        /// Description of the violated condition.
        reason: String,
    },
    /// The earn ratio is below one, so earnings would shrink with level.
    EarnShrinking,
    /// The base or minimum cycle duration is under one millisecond.
    DurationTooShort,
    /// The per-level duration keep percentage is outside `1..=100`.
    InvalidKeepPercent {
        /// The configured percentage.
        value: u32,
    },
}

impl fmt::Display for CurveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBaseCost => write!(f, "base cost must be positive"),
            Self::ZeroDenominator => write!(f, "growth ratio denominator must be positive"),
            Self::CostNotIncreasing { reason } => write!(f, "cost not increasing: {reason}"),
            Self::EarnShrinking => write!(f, "earn growth ratio must be at least 1"),
            Self::DurationTooShort => write!(f, "cycle durations must be at least 1ms"),
            Self::InvalidKeepPercent { value } => {
                write!(f, "duration keep percent must be in 1..=100, got {value}")
            }
        }
    }
}

impl Error for CurveError {}

/// Errors from game operations (purchases, upgrades, clicks, resets).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    /// The balance does not cover the cost.
    InsufficientFunds(InsufficientFunds),
    /// A worker for this job was already bought.
    AlreadyOwned {
        /// The job that is already owned.
        job: JobId,
    },
    /// The click upgrade was already bought.
    ClickUpgradeOwned,
    /// The job ID is not in the catalog.
    UnknownJob {
        /// The unknown job ID.
        job: JobId,
    },
    /// The job is at the highest representable level.
    LevelOverflow {
        /// The job that cannot be upgraded further.
        job: JobId,
    },
    /// The engine has been shut down.
    ShutDown,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFunds(e) => write!(f, "{e}"),
            Self::AlreadyOwned { job } => write!(f, "job {job} already has a worker"),
            Self::ClickUpgradeOwned => write!(f, "click upgrade already bought"),
            Self::UnknownJob { job } => write!(f, "job {job} is not in the catalog"),
            Self::LevelOverflow { job } => write!(f, "job {job} is at the maximum level"),
            Self::ShutDown => write!(f, "engine is shut down"),
        }
    }
}

impl Error for GameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InsufficientFunds(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InsufficientFunds> for GameError {
    fn from(e: InsufficientFunds) -> Self {
        Self::InsufficientFunds(e)
    }
}
