//! Gelds Quickstart: a short session of the default "Box-Until-Death" game.
//!
//! Demonstrates:
//!   1. Creating an engine with the default catalog
//!   2. Subscribing to snapshots from another thread
//!   3. Clicking, buying a worker, and upgrading its job
//!   4. Resetting and shutting down
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example quickstart

use std::thread;
use std::time::Duration;

use gelds_core::{Currency, JobId};
use gelds_engine::{GameConfig, GameEngine};
use tracing::info;
use tracing_subscriber::EnvFilter;

const FIRST_GLOVE: JobId = JobId(1);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();

    let engine = GameEngine::new(GameConfig::default())?;

    // ─── Observer ───────────────────────────────────────────────

    let sub = engine.subscribe()?;
    let observer = thread::Builder::new()
        .name("observer".into())
        .spawn(move || {
            let mut last = None;
            while let Some(snap) = sub.recv() {
                let money = snap.stashed_money().to_human_readable();
                if last.as_ref() != Some(&money) {
                    println!("v{:>4}  {:>8} Gelds  workers={}", snap.version(), money, snap.worker_count());
                    last = Some(money);
                }
            }
        })?;

    // ─── Play ───────────────────────────────────────────────────

    for _ in 0..10 {
        engine.click()?;
    }
    let snap = engine.add_worker(FIRST_GLOVE)?;
    if let Some(job) = snap.job(FIRST_GLOVE) {
        info!(job = job.name(), earn = %job.earn(), "bought first worker");
    }

    thread::sleep(Duration::from_millis(3500));

    // Fund an upgrade directly and watch the earn double.
    engine.click_money(&Currency::from(20u64))?;
    let snap = engine.upgrade_job(FIRST_GLOVE)?;
    if let Some(job) = snap.job(FIRST_GLOVE) {
        info!(level = job.level(), earn = %job.earn(), next = %job.upgrade_cost(), "upgraded");
    }

    thread::sleep(Duration::from_millis(2500));
    let snap = engine.snapshot();
    for worker in snap.workers() {
        info!(
            job = %worker.job_id(),
            cycles = worker.cycles_completed(),
            earned = %worker.earned(),
            "worker summary"
        );
    }

    // ─── Reset and shut down ────────────────────────────────────

    let fresh = engine.reset()?;
    info!(generation = %fresh.generation(), money = %fresh.stashed_money(), "reset");

    let report = engine.shutdown();
    info!(workers_joined = report.workers_joined, total_ms = report.total_ms, "done");
    if observer.join().is_err() {
        return Err("observer thread panicked".into());
    }
    Ok(())
}
