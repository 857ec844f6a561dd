use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::thread::{self, JoinHandle};

use crate::engine::hashing::FileDigester;
use crate::{CancelFlag, WorkUnit};

use super::completion::{CompletionTracker, ResultLease};

/// Single digest worker: take units from work_rx, hash them, forward on the lease.
/// Exits when the work queue is closed and drained, when cancelled, or when the writer is gone.
/// Dropping the lease on exit is what lets the last worker close the result queue.
fn digest_worker_loop(
    id: usize,
    work_rx: Receiver<WorkUnit>,
    lease: ResultLease<WorkUnit>,
    cancel: CancelFlag,
) {
    let mut digester = FileDigester::new();
    let mut processed = 0_usize;
    while let Ok(mut unit) = work_rx.recv() {
        if cancel.is_cancelled() {
            debug!("worker {id}: cancelled");
            break;
        }
        digester.process(&mut unit);
        if lease.send(unit).is_err() {
            debug!("worker {id}: result queue has no receiver, stopping");
            break;
        }
        processed += 1;
    }
    debug!("worker {id}: exiting after {processed} files");
    drop(work_rx);
    drop(lease);
}

/// Spawn `num_workers` digest workers sharing `work_rx`. Takes ownership of `result_tx`: the result
/// queue closes once every worker has exited.
pub fn spawn_digest_workers(
    work_rx: Receiver<WorkUnit>,
    result_tx: Sender<WorkUnit>,
    num_workers: usize,
    cancel: &CancelFlag,
) -> Vec<JoinHandle<()>> {
    CompletionTracker::leases(num_workers, result_tx)
        .into_iter()
        .enumerate()
        .map(|(id, lease)| {
            let work_rx = work_rx.clone();
            let cancel = cancel.clone();
            thread::spawn(move || digest_worker_loop(id, work_rx, lease, cancel))
        })
        .collect()
}
