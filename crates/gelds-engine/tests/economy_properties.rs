//! Property tests for the pure economy rules.
//!
//! Random operation sequences are applied to a snapshot. The balance must
//! always equal everything clicked and credited minus everything spent,
//! and a rejected operation must leave the state untouched.

use std::time::Duration;

use gelds_core::{Currency, Generation, JobId, SnapshotVersion};
use gelds_engine::{economy, ClickConfig, GameConfig, GameSnapshot};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Click(u64),
    Buy(u32),
    Upgrade(u32),
    Credit(u32),
    ClickUpgrade,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..5_000).prop_map(Op::Click),
        (0u32..5).prop_map(Op::Buy),
        (0u32..5).prop_map(Op::Upgrade),
        (0u32..5).prop_map(Op::Credit),
        Just(Op::ClickUpgrade),
    ]
}

/// Fields an operation may change.
fn fingerprint(s: &GameSnapshot) -> (Currency, Vec<u32>, Vec<(JobId, u64)>, bool) {
    (
        s.stashed_money().clone(),
        s.jobs().map(|j| j.level()).collect(),
        s.workers()
            .map(|w| (w.job_id(), w.cycles_completed()))
            .collect(),
        s.click_upgraded(),
    )
}

proptest! {
    #[test]
    fn balance_matches_ledger(ops in prop::collection::vec(op(), 1..80)) {
        let config = GameConfig::default();
        let click = ClickConfig::default();
        let mut state = GameSnapshot::initial(&config, Generation(0), SnapshotVersion(0));
        let mut inflow = Currency::zero();
        let mut spent = Currency::zero();

        for op in ops {
            let before = fingerprint(&state);
            let result = match op {
                Op::Click(amount) => {
                    let amount = Currency::from(amount);
                    inflow = inflow + &amount;
                    Ok(economy::click(&state, &amount))
                }
                Op::Buy(id) => match economy::buy_worker(&state, JobId(id)) {
                    Ok((next, first_cycle)) => {
                        prop_assert!(first_cycle >= Duration::from_millis(1));
                        spent = spent + &state.job(JobId(id)).unwrap().purchase_cost();
                        Ok(next)
                    }
                    Err(e) => Err(e),
                },
                Op::Upgrade(id) => match economy::upgrade_job(&state, JobId(id)) {
                    Ok(next) => {
                        spent = spent + &state.job(JobId(id)).unwrap().upgrade_cost();
                        Ok(next)
                    }
                    Err(e) => Err(e),
                },
                Op::Credit(id) => match economy::credit_cycle(&state, JobId(id)) {
                    Ok((next, earned, _)) => {
                        inflow = inflow + &earned;
                        Ok(next)
                    }
                    Err(e) => Err(e),
                },
                Op::ClickUpgrade => match economy::buy_click_upgrade(&state, &click) {
                    Ok(next) => {
                        spent = spent + &click.upgrade_cost;
                        Ok(next)
                    }
                    Err(e) => Err(e),
                },
            };
            match result {
                Ok(next) => state = next,
                Err(_) => {
                    prop_assert_eq!(fingerprint(&state), before);
                }
            }
            prop_assert_eq!(
                state.stashed_money(),
                &inflow.try_subtract(&spent).unwrap()
            );
        }
    }
}
