//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

use crate::utils::fd_limit::max_workers_by_fd_limit;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    output_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                output_filename: format!("{pkg}_output.txt"),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Default output file (`hashwalker_output.txt`).
    pub fn output_filename(&self) -> &str {
        &self.output_filename
    }

    /// Optional settings file looked up in the working directory (`.hashwalker.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Worker threads ----

/// Digest worker count limits.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    /// Available threads (from rayon); set by [`WorkerThreadLimits::current()`].
    pub all_threads: usize,
    /// Never run fewer workers than this.
    pub floor: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            all_threads: 0, // use current() to set from rayon
            floor: Self::FLOOR_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const FLOOR_THREADS: usize = 1;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            ..Self::default()
        }
    }

    /// Worker count for a run: the override if given, else all threads; capped by the FD limit, floored at 1.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        let wanted = requested.unwrap_or(self.all_threads);
        let capped = match max_workers_by_fd_limit() {
            Some(fd_cap) if fd_cap < wanted => {
                log::debug!("Capping workers {} -> {} (FD limit ~80%)", wanted, fd_cap);
                fd_cap
            }
            _ => wanted,
        };
        capped.max(self.floor)
    }
}

// ---- Queues ----

/// Bounded queue sizes between pipeline stages.
pub struct QueueCaps;

impl QueueCaps {
    /// Work queue slots per digest worker (walker → workers).
    pub const WORK_SLOTS_PER_WORKER: usize = 5;
    /// Result queue capacity (workers → writer).
    pub const RESULT_CAP: usize = 64;

    pub fn work_cap(num_workers: usize) -> usize {
        num_workers.max(1) * Self::WORK_SLOTS_PER_WORKER
    }
}

// ---- Hashing ----

/// Hashing buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Per-worker read buffer (bytes). 256 KB.
    pub const HASH_READ_CHUNK_SIZE: usize = 256 * 1024;
}

// ---- Output ----

/// Buffer size for the record writer (bytes).
pub const OUTPUT_BUFFER_SIZE: usize = 64 * 1024;
