//! hashwalker: walk a directory tree and write `path,sha1,size` for every regular file.
//!
//! One walker thread feeds a bounded work queue; a pool of digest workers hashes files and feeds a
//! bounded result queue; a single writer drains it into the output. See [`pipeline`].

pub mod engine;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use anyhow::Context;
use log::debug;
use std::fs::File;

use crate::engine::tools::{ExclusionMatcher, check_root};
use crate::pipeline::{PipelineContext, run_to_sink};

/// Result alias used by public hashwalker API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: hash everything under `task.root` into `task.output`.
///
/// Invalid exclude patterns, a missing root, or an output file that cannot be created fail the
/// run before any thread starts. Per-file problems never fail it; they are listed in the returned
/// [`RunReport`]. Set `opts.cancel` from another thread to stop early with a flushed, partial output.
pub fn run_task(task: &TaskSpec, opts: &Opts) -> Result<RunReport> {
    debug!(
        "{} CONFIG:{:#?} {:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        task,
        opts
    );

    let matcher = ExclusionMatcher::new(&task.exclude)?;
    if !matcher.is_empty() {
        debug!("Excluding names matching {:?}", matcher.patterns());
    }
    check_root(&task.root)?;
    let file = File::create(&task.output)
        .with_context(|| format!("create output file {}", task.output.display()))?;
    let output_canonical = task.output.canonicalize().ok();

    let ctx = PipelineContext::new(&task.root, matcher, opts.cancel.clone())
        .with_output(output_canonical);
    let (file, report) = run_to_sink(ctx, file, opts)?;
    file.sync_all()
        .with_context(|| format!("sync output file {}", task.output.display()))?;
    Ok(report)
}
