//! Pure economy rules.
//!
//! Each function takes the current snapshot and returns the next one,
//! or an error with the input untouched. None of them have side effects
//! or touch the clock, so the engine can run them inside its critical
//! section and commit the result atomically, and callers can use them to
//! preview an operation ("can I afford this upgrade?").
//!
//! The returned snapshot keeps the input's version; the engine assigns
//! the next version when it commits.

use std::time::Duration;

use gelds_core::{Currency, GameError, JobId};

use crate::config::ClickConfig;
use crate::state::{GameSnapshot, Worker, WorkerStatus};

/// Credit a manual click of `amount`. Never fails.
pub fn click(state: &GameSnapshot, amount: &Currency) -> GameSnapshot {
    let mut next = state.clone();
    next.stashed_money = &state.stashed_money + amount;
    next
}

/// Buy a worker for `job` at the job's current level.
///
/// Returns the next state and the duration of the worker's first cycle.
///
/// # Errors
///
/// * [`GameError::UnknownJob`] if `job` is not in the catalog.
/// * [`GameError::AlreadyOwned`] if a worker for `job` exists.
/// * [`GameError::InsufficientFunds`] if the balance is below
///   `cost(level)`.
pub fn buy_worker(state: &GameSnapshot, job: JobId) -> Result<(GameSnapshot, Duration), GameError> {
    let entry = state.jobs.get(&job).ok_or(GameError::UnknownJob { job })?;
    if state.workers.contains_key(&job) {
        return Err(GameError::AlreadyOwned { job });
    }
    let remaining = state.stashed_money.try_subtract(&entry.purchase_cost())?;
    let first_cycle = entry.cycle_duration();

    let mut next = state.clone();
    next.stashed_money = remaining;
    next.workers.insert(job, Worker::new(job));
    Ok((next, first_cycle))
}

/// Raise `job` one level, paying `cost(level + 1)`.
///
/// Allowed whether or not a worker is owned; a worker bought later
/// produces at the upgraded level.
///
/// # Errors
///
/// * [`GameError::UnknownJob`] if `job` is not in the catalog.
/// * [`GameError::LevelOverflow`] at `u32::MAX`.
/// * [`GameError::InsufficientFunds`] if the balance is below the cost.
pub fn upgrade_job(state: &GameSnapshot, job: JobId) -> Result<GameSnapshot, GameError> {
    let entry = state.jobs.get(&job).ok_or(GameError::UnknownJob { job })?;
    let level = entry
        .level()
        .checked_add(1)
        .ok_or(GameError::LevelOverflow { job })?;
    let remaining = state.stashed_money.try_subtract(&entry.curve().cost(level))?;

    let mut next = state.clone();
    next.stashed_money = remaining;
    if let Some(upgraded) = next.jobs.get_mut(&job) {
        upgraded.set_level(level);
    }
    Ok(next)
}

/// Buy the one-time click upgrade.
///
/// # Errors
///
/// * [`GameError::ClickUpgradeOwned`] if it was already bought.
/// * [`GameError::InsufficientFunds`] if the balance is below its price.
pub fn buy_click_upgrade(state: &GameSnapshot, click: &ClickConfig) -> Result<GameSnapshot, GameError> {
    if state.click_upgraded {
        return Err(GameError::ClickUpgradeOwned);
    }
    let remaining = state.stashed_money.try_subtract(&click.upgrade_cost)?;

    let mut next = state.clone();
    next.stashed_money = remaining;
    next.click_power = click.upgraded_power.clone();
    next.click_upgraded = true;
    Ok(next)
}

/// Complete one production cycle of `job`'s worker.
///
/// The payout is the job's earn at its level *now*, so an upgrade
/// bought mid-cycle pays out on this completion. The returned duration
/// is that of the next cycle, which starts at this instant.
///
/// Returns the next state, the amount credited, and the next cycle's
/// duration.
///
/// # Errors
///
/// [`GameError::UnknownJob`] if `job` has no worker in this state.
pub fn credit_cycle(
    state: &GameSnapshot,
    job: JobId,
) -> Result<(GameSnapshot, Currency, Duration), GameError> {
    let entry = state.jobs.get(&job).ok_or(GameError::UnknownJob { job })?;
    if !state.workers.contains_key(&job) {
        return Err(GameError::UnknownJob { job });
    }
    let earn = entry.earn();
    let next_cycle = entry.cycle_duration();

    let mut next = state.clone();
    next.stashed_money = &state.stashed_money + &earn;
    if let Some(worker) = next.workers.get_mut(&job) {
        worker.record_cycle(&earn);
    }
    Ok((next, earn, next_cycle))
}

/// Mark `job`'s worker as unable to produce.
pub fn mark_faulted(state: &GameSnapshot, job: JobId, reason: impl Into<String>) -> GameSnapshot {
    let mut next = state.clone();
    if let Some(worker) = next.workers.get_mut(&job) {
        worker.set_status(WorkerStatus::Faulted {
            reason: reason.into(),
        });
    }
    next
}
