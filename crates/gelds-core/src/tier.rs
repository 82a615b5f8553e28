//! Production tiers and the per-job cost curve.
//!
//! A job's tier at level `L` is a pure function of `L`: the same level
//! always yields the same cost, earn, and cycle duration. Tiers are not
//! stored; [`CostCurve::tier`] recomputes them on demand, which lets the
//! engine validate upgrades without side effects.

use std::time::Duration;

use num_bigint::BigUint;

use crate::currency::Currency;
use crate::error::CurveError;

/// A growth ratio `numer / denom` applied once per level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Growth {
    /// Numerator.
    pub numer: u32,
    /// Denominator.
    pub denom: u32,
}

impl Growth {
    /// Construct a ratio.
    pub const fn new(numer: u32, denom: u32) -> Self {
        Self { numer, denom }
    }

    /// An integer multiplier.
    pub const fn times(factor: u32) -> Self {
        Self {
            numer: factor,
            denom: 1,
        }
    }

    /// No growth.
    pub const fn flat() -> Self {
        Self { numer: 1, denom: 1 }
    }

    /// `floor(base * (numer / denom)^steps)`, exact.
    fn apply(&self, base: &Currency, steps: u32) -> Currency {
        if steps == 0 || self.numer == self.denom {
            return base.clone();
        }
        let numer = BigUint::from(self.numer).pow(steps);
        let denom = BigUint::from(self.denom).pow(steps);
        Currency::from_biguint(base.as_biguint() * numer / denom)
    }
}

/// One level of a job: what it costs to reach, what a cycle earns, and
/// how long a cycle takes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductionTier {
    /// The level this tier describes (1-based).
    pub level: u32,
    /// Cost to buy the job at this level, or to upgrade into it.
    pub cost: Currency,
    /// Earnings credited per completed cycle.
    pub earn: Currency,
    /// Length of one production cycle.
    pub duration: Duration,
}

/// Deterministic mapping from level to [`ProductionTier`].
///
/// * `cost(L) = floor(base_cost * cost_growth^(L-1))`
/// * `earn(L) = floor(base_earn * earn_growth^(L-1))`
/// * `duration(L) = max(min_duration, base_duration * (keep/100)^(L-1))`
///
/// [`validate`](Self::validate) guarantees `cost(L+1) > cost(L)`,
/// `earn(L+1) >= earn(L)`, and a non-zero duration at every level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostCurve {
    /// Cost at level 1.
    pub base_cost: Currency,
    /// Per-level cost multiplier. Must exceed 1.
    pub cost_growth: Growth,
    /// Earnings per cycle at level 1.
    pub base_earn: Currency,
    /// Per-level earn multiplier. Must be at least 1.
    pub earn_growth: Growth,
    /// Cycle duration at level 1.
    pub base_duration: Duration,
    /// Percentage of the previous level's duration kept per level
    /// (100 = constant duration).
    pub duration_keep_percent: u32,
    /// Floor for the cycle duration.
    pub min_duration: Duration,
}

impl CostCurve {
    /// A curve that doubles cost and earn each level with a constant
    /// cycle duration.
    pub fn new(base_cost: impl Into<Currency>, base_earn: impl Into<Currency>, base_duration: Duration) -> Self {
        Self {
            base_cost: base_cost.into(),
            cost_growth: Growth::times(2),
            base_earn: base_earn.into(),
            earn_growth: Growth::times(2),
            base_duration,
            duration_keep_percent: 100,
            min_duration: base_duration,
        }
    }

    /// Replace the cost growth ratio.
    pub fn with_cost_growth(mut self, growth: Growth) -> Self {
        self.cost_growth = growth;
        self
    }

    /// Replace the earn growth ratio.
    pub fn with_earn_growth(mut self, growth: Growth) -> Self {
        self.earn_growth = growth;
        self
    }

    /// Shrink the cycle to `keep_percent` of the previous level's
    /// duration each level, never below `min_duration`.
    pub fn with_duration_decay(mut self, keep_percent: u32, min_duration: Duration) -> Self {
        self.duration_keep_percent = keep_percent;
        self.min_duration = min_duration;
        self
    }

    /// Check the monotonicity guarantees.
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.base_cost.is_zero() {
            return Err(CurveError::ZeroBaseCost);
        }
        if self.cost_growth.denom == 0 || self.earn_growth.denom == 0 {
            return Err(CurveError::ZeroDenominator);
        }
        let Growth { numer, denom } = self.cost_growth;
        if numer <= denom {
            return Err(CurveError::CostNotIncreasing {
                reason: format!("growth {numer}/{denom} is not above 1"),
            });
        }
        // floor(x * r) - floor(x) >= 1 whenever x * (r - 1) >= 1, and the
        // smallest x on the curve is base_cost.
        if self.base_cost.scale(u64::from(numer - denom)) < Currency::from(denom) {
            return Err(CurveError::CostNotIncreasing {
                reason: format!(
                    "base cost {} times growth step {}/{} rounds to no increase",
                    self.base_cost,
                    numer - denom,
                    denom
                ),
            });
        }
        if self.earn_growth.numer < self.earn_growth.denom {
            return Err(CurveError::EarnShrinking);
        }
        if self.base_duration < Duration::from_millis(1) || self.min_duration < Duration::from_millis(1) {
            return Err(CurveError::DurationTooShort);
        }
        if !(1..=100).contains(&self.duration_keep_percent) {
            return Err(CurveError::InvalidKeepPercent {
                value: self.duration_keep_percent,
            });
        }
        Ok(())
    }

    /// Cost to reach `level`. Levels below 1 are treated as 1.
    pub fn cost(&self, level: u32) -> Currency {
        self.cost_growth.apply(&self.base_cost, level.max(1) - 1)
    }

    /// Earnings per cycle at `level`.
    pub fn earn(&self, level: u32) -> Currency {
        self.earn_growth.apply(&self.base_earn, level.max(1) - 1)
    }

    /// Cycle duration at `level`.
    pub fn duration(&self, level: u32) -> Duration {
        let min = millis(self.min_duration);
        let mut ms = millis(self.base_duration);
        if self.duration_keep_percent < 100 {
            let keep = u128::from(self.duration_keep_percent);
            for _ in 1..level.max(1) {
                if ms <= min {
                    break;
                }
                ms = u64::try_from(u128::from(ms) * keep / 100).unwrap_or(u64::MAX);
            }
        }
        Duration::from_millis(ms.max(min).max(1))
    }

    /// The full tier for `level`.
    pub fn tier(&self, level: u32) -> ProductionTier {
        ProductionTier {
            level: level.max(1),
            cost: self.cost(level),
            earn: self.earn(level),
            duration: self.duration(level),
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
