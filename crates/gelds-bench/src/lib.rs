//! Benchmark profiles for the Gelds engine.
//!
//! - [`idle_catalog`]: `n` jobs whose cycles never complete during a
//!   benchmark, so measurements see only controller overhead.
//! - [`funded_engine`]: an engine on a simulated clock with a large
//!   balance already credited.
//! - [`big_currency`]: a value with a given number of decimal digits.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;
use std::time::Duration;

use gelds_core::{Clock, CostCurve, Currency, JobId};
use gelds_engine::{GameConfig, GameEngine, JobSpec};

/// `n` jobs with ids `1..=n`, each costing 10 with one-hour cycles.
pub fn idle_catalog(n: u32) -> GameConfig {
    let catalog = (1..=n)
        .map(|id| {
            JobSpec::new(
                JobId(id),
                format!("bench-{id}"),
                CostCurve::new(10u64, u64::from(id), Duration::from_secs(3600)),
            )
        })
        .collect();
    GameConfig::with_catalog(catalog)
}

/// An engine over [`idle_catalog`] holding `balance`.
///
/// # Panics
///
/// If the catalog fails validation, which would be a bug in this crate.
pub fn funded_engine(jobs: u32, clock: Arc<dyn Clock>, balance: &Currency) -> GameEngine {
    let engine = GameEngine::with_clock(idle_catalog(jobs), clock).expect("bench catalog is valid");
    engine.click_money(balance).expect("engine is running");
    engine
}

/// `1` followed by `digits - 1` zeros.
pub fn big_currency(digits: usize) -> Currency {
    let text = format!("1{}", "0".repeat(digits.saturating_sub(1)));
    Currency::parse_decimal(&text).unwrap_or_else(Currency::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_catalog_is_valid() {
        idle_catalog(8).validate().unwrap();
    }

    #[test]
    fn big_currency_has_requested_digits() {
        assert_eq!(big_currency(1), Currency::from(1u64));
        assert_eq!(big_currency(40).to_string().len(), 40);
    }
}
