//! Completion tracking for the result queue: closed exactly once, by whichever worker finishes last.

use crossbeam_channel::{SendError, Sender};
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Counts live digest workers and owns the master sender of the result queue.
///
/// Each worker holds a [`ResultLease`]. Dropping a lease releases that worker's sender and then
/// decrements the counter; the lease that takes it from 1 to 0 drops the master sender, which
/// disconnects the writer's receiver. Because release happens in `Drop`, a worker that panics
/// still counts down.
pub struct CompletionTracker<T> {
    remaining: AtomicUsize,
    master: Mutex<Option<Sender<T>>>,
}

impl<T> CompletionTracker<T> {
    /// Build a tracker for `workers` workers (at least 1) and hand out exactly that many leases.
    pub fn leases(workers: usize, result_tx: Sender<T>) -> Vec<ResultLease<T>> {
        let workers = workers.max(1);
        let tracker = Arc::new(CompletionTracker {
            remaining: AtomicUsize::new(workers),
            master: Mutex::new(Some(result_tx)),
        });
        let master = tracker.master.lock().unwrap_or_else(PoisonError::into_inner);
        let leases = (0..workers)
            .map(|_| ResultLease {
                tx: master.as_ref().cloned(),
                tracker: Arc::clone(&tracker),
            })
            .collect();
        drop(master);
        leases
    }

    /// Workers that have not finished yet.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Returns true for the one caller that observed the last worker finishing.
    fn release(&self) -> bool {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) != 1 {
            return false;
        }
        let master = self
            .master
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(master);
        true
    }
}

/// A worker's handle on the result queue. Send through it; drop it when the worker is done.
pub struct ResultLease<T> {
    tx: Option<Sender<T>>,
    tracker: Arc<CompletionTracker<T>>,
}

impl<T> ResultLease<T> {
    /// Blocks while the result queue is full. Errs once the writer has gone away.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        match &self.tx {
            Some(tx) => tx.send(value),
            None => Err(SendError(value)),
        }
    }

    pub fn tracker(&self) -> &CompletionTracker<T> {
        &self.tracker
    }
}

impl<T> Drop for ResultLease<T> {
    fn drop(&mut self) {
        // Own sender goes first so the channel can disconnect as soon as the master is dropped.
        drop(self.tx.take());
        if self.tracker.release() {
            debug!("last digest worker finished; result queue closed");
        }
    }
}
