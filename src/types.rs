//! Public and internal types for the hashwalker API and pipeline.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::utils::config::PackagePaths;

/// SHA-1 digest bytes.
pub type Sha1Digest = [u8; 20];

/// What to hash and where to write it. Fixed for the duration of one run.
#[derive(Clone, Debug)]
pub struct TaskSpec {
    /// Directory to walk.
    pub root: PathBuf,
    /// Exclude patterns (glob syntax, matched against base names, e.g. `*.jpg`, `node_modules`).
    pub exclude: Vec<String>,
    /// Output file for `path,hexdigest,size` records.
    pub output: PathBuf,
}

impl Default for TaskSpec {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            exclude: Vec::new(),
            output: PathBuf::from(PackagePaths::get().output_filename()),
        }
    }
}

/// Run options that are not part of the task itself.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Override digest worker count. When None, derived from available threads and the FD limit.
    pub num_workers: Option<usize>,
    /// Show a progress counter while writing records.
    pub verbose: bool,
    /// Set to request early termination; output written so far is kept and flushed.
    pub cancel: CancelFlag,
}

/// Shared flag that asks the walker and workers to stop early.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One file pending or done. Owned by exactly one pipeline stage at a time.
#[derive(Debug)]
pub struct WorkUnit {
    pub path: PathBuf,
    /// Size in bytes from the walk's metadata; never re-read afterwards.
    pub size: u64,
    pub digest: Option<Sha1Digest>,
    pub failure: Option<UnitFailure>,
}

impl WorkUnit {
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            digest: None,
            failure: None,
        }
    }
}

/// Why a single file produced no record.
#[derive(Debug, thiserror::Error)]
pub enum UnitFailure {
    #[error("open failed: {0}")]
    Open(#[source] io::Error),
    #[error("read failed after open: {0}")]
    Read(#[source] io::Error),
}

/// Summary of one run, returned alongside the output.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Units the walker sent to the workers.
    pub enumerated: usize,
    /// Records written to the output.
    pub written: usize,
    /// Files that were enumerated but could not be hashed.
    pub failed: Vec<(PathBuf, String)>,
    /// Entries the walker could not read.
    pub skipped: Vec<(PathBuf, String)>,
    pub cancelled: bool,
    pub elapsed: Duration,
}
