//! Game configuration, validation, and error types.
//!
//! [`GameConfig`] is the builder-input for a [`GameEngine`](crate::GameEngine).
//! It holds the job catalog and the click economy; the engine keeps it
//! for its whole lifetime and rebuilds the initial state from it on
//! every reset.

use std::collections::HashSet;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use gelds_core::{CostCurve, Currency, CurveError, Growth, JobId};

// ── JobSpec ────────────────────────────────────────────────────────

/// One catalog entry.
#[derive(Clone, Debug)]
pub struct JobSpec {
    /// Stable identifier, unique within the catalog.
    pub id: JobId,
    /// Display name.
    pub name: String,
    /// Level-to-tier mapping.
    pub curve: CostCurve,
}

impl JobSpec {
    /// Construct a catalog entry.
    pub fn new(id: JobId, name: impl Into<String>, curve: CostCurve) -> Self {
        Self {
            id,
            name: name.into(),
            curve,
        }
    }
}

// ── ClickConfig ────────────────────────────────────────────────────

/// Manual-click economy: the base click yield and the one-time
/// click upgrade.
#[derive(Clone, Debug)]
pub struct ClickConfig {
    /// Gelds per click before the upgrade. Default: 1.
    pub base_power: Currency,
    /// Gelds per click after the upgrade. Default: 5.
    pub upgraded_power: Currency,
    /// Price of the upgrade. Default: 1000.
    pub upgrade_cost: Currency,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            base_power: Currency::from(1u64),
            upgraded_power: Currency::from(5u64),
            upgrade_cost: Currency::from(1000u64),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`GameConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The catalog has no jobs.
    EmptyCatalog,
    /// Two catalog entries share an ID.
    DuplicateJob {
        /// The repeated ID.
        job: JobId,
    },
    /// A job's cost curve is invalid.
    Curve {
        /// The job whose curve failed.
        job: JobId,
        /// The underlying curve error.
        reason: CurveError,
    },
    /// The click upgrade would not raise click power.
    ClickUpgradeNotBetter,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "job catalog is empty"),
            Self::DuplicateJob { job } => write!(f, "job {job} appears more than once"),
            Self::Curve { job, reason } => write!(f, "job {job}: {reason}"),
            Self::ClickUpgradeNotBetter => {
                write!(f, "upgraded click power must exceed base click power")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Curve { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

// ── GameConfig ─────────────────────────────────────────────────────

/// Complete configuration for a game engine.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Purchasable jobs, in display order.
    pub catalog: Vec<JobSpec>,
    /// Manual-click economy.
    pub click: ClickConfig,
}

impl GameConfig {
    /// A config with the given catalog and the default click economy.
    pub fn with_catalog(catalog: Vec<JobSpec>) -> Self {
        Self {
            catalog,
            click: ClickConfig::default(),
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        let mut seen = HashSet::with_capacity(self.catalog.len());
        for spec in &self.catalog {
            if !seen.insert(spec.id) {
                return Err(ConfigError::DuplicateJob { job: spec.id });
            }
            spec.curve.validate().map_err(|reason| ConfigError::Curve {
                job: spec.id,
                reason,
            })?;
        }
        if self.click.upgraded_power <= self.click.base_power {
            return Err(ConfigError::ClickUpgradeNotBetter);
        }
        Ok(())
    }
}

/// The "Box-Until-Death" catalog: three automatic boxing gloves.
impl Default for GameConfig {
    fn default() -> Self {
        let catalog = vec![
            JobSpec::new(
                JobId(1),
                "Automatic Box-Glove 1",
                CostCurve::new(10u64, 1u64, Duration::from_secs(1)),
            ),
            JobSpec::new(
                JobId(2),
                "Automatic Box-Glove 2",
                CostCurve::new(100u64, 15u64, Duration::from_secs(3))
                    .with_earn_growth(Growth::new(9, 5))
                    .with_duration_decay(95, Duration::from_secs(1)),
            ),
            JobSpec::new(
                JobId(3),
                "Automatic Box-Glove 3",
                CostCurve::new(1000u64, 200u64, Duration::from_secs(5))
                    .with_cost_growth(Growth::new(5, 2))
                    .with_duration_decay(90, Duration::from_secs(2)),
            ),
        ];
        Self::with_catalog(catalog)
    }
}
