//! Production threads: one per owned worker.
//!
//! A worker thread sleeps on the engine [`Clock`] until its cycle
//! deadline, then submits the completion to the [`ProductionLedger`]
//! (the engine's single serialization point), which credits the cycle
//! and returns the duration of the next one. The thread never touches
//! game state directly.
//!
//! Deadlines are anchored: the next cycle starts at the previous
//! deadline, not at the moment the credit was applied, so cycle counts
//! depend only on elapsed clock time.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, warn};

use gelds_core::{Clock, JobId, TimerId, Wake};

use crate::generation::ProductionToken;

/// Where worker threads submit completed cycles.
pub(crate) trait ProductionLedger: Send + Sync {
    /// Credit one completed cycle for `token`'s job.
    ///
    /// Returns the next cycle's duration, or `None` when the token is
    /// no longer current and the thread must exit.
    fn complete_cycle(&self, token: &ProductionToken) -> Option<Duration>;
}

/// Why a worker thread stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExitReason {
    /// Cancelled while sleeping.
    Cancelled,
    /// The ledger rejected a completion from a retired generation.
    Stale,
}

/// Summary returned by a worker thread when it exits.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WorkerExit {
    pub cycles: u64,
    pub reason: ExitReason,
}

/// Engine-side handle for one production thread.
pub(crate) struct WorkerHandle {
    token: Arc<ProductionToken>,
    thread: JoinHandle<WorkerExit>,
}

impl WorkerHandle {
    pub fn job(&self) -> JobId {
        self.token.job()
    }

    /// Revoke the thread's token. The thread exits at its next wake-up
    /// or completion.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Unpark the thread if it is sleeping on a wall clock.
    pub fn wake(&self) {
        self.thread.thread().unpark();
    }
}

/// Arm the first deadline and start the production thread for
/// `token`'s job.
///
/// The deadline is registered with the clock before the thread exists,
/// so a simulated clock advanced immediately after the purchase still
/// waits for this worker's first completion.
pub(crate) fn spawn_worker(
    ledger: Arc<dyn ProductionLedger>,
    clock: Arc<dyn Clock>,
    token: Arc<ProductionToken>,
    first_deadline: Duration,
) -> io::Result<WorkerHandle> {
    let timer = TimerId::next();
    clock.arm(timer, first_deadline);

    let thread_clock = Arc::clone(&clock);
    let thread_token = Arc::clone(&token);
    let spawned = thread::Builder::new()
        .name(format!("gelds-worker-{}", token.job()))
        .spawn(move || run_cycles(ledger, thread_clock, thread_token, timer, first_deadline));

    match spawned {
        Ok(thread) => Ok(WorkerHandle { token, thread }),
        Err(e) => {
            clock.disarm(timer);
            Err(e)
        }
    }
}

/// Main loop of a production thread.
fn run_cycles(
    ledger: Arc<dyn ProductionLedger>,
    clock: Arc<dyn Clock>,
    token: Arc<ProductionToken>,
    timer: TimerId,
    mut deadline: Duration,
) -> WorkerExit {
    let mut cycles = 0u64;
    let reason = loop {
        if clock.sleep_until(timer, deadline, token.cancel_flag()) == Wake::Cancelled {
            break ExitReason::Cancelled;
        }
        match ledger.complete_cycle(&token) {
            Some(next) => {
                cycles += 1;
                deadline += next;
            }
            None => break ExitReason::Stale,
        }
    };
    clock.disarm(timer);
    WorkerExit { cycles, reason }
}

/// Cancel, wake, and join every handle. Returns the number of threads
/// joined cleanly.
pub(crate) fn stop_all<I>(handles: I, clock: &dyn Clock) -> usize
where
    I: IntoIterator<Item = WorkerHandle>,
{
    let handles: SmallVec<[WorkerHandle; 8]> = handles.into_iter().collect();
    for handle in &handles {
        handle.cancel();
        handle.wake();
    }
    clock.interrupt();

    let mut joined = 0;
    for handle in handles {
        let job = handle.job();
        match handle.thread.join() {
            Ok(exit) => {
                debug!(job = %job, cycles = exit.cycles, reason = ?exit.reason, "production thread joined");
                joined += 1;
            }
            Err(_) => warn!(job = %job, "production thread panicked"),
        }
    }
    joined
}
