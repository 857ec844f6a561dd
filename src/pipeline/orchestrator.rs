use anyhow::Result;
use log::debug;
use std::io::Write;
use std::path::Path;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::engine::progress::{ProgressBar, create_counter};
use crate::engine::tools::{ExclusionMatcher, check_root};
use crate::pipeline::{
    self, PipelineContext, PipelineTuning, WalkSummary, WriterOutcome, spawn_digest_workers,
    spawn_walk_thread, spawn_writer_thread,
};
use crate::utils::config::WorkerThreadLimits;
use crate::{Opts, RunReport};

/// Join handles for every pipeline thread.
pub struct PipelineHandles<W> {
    pub walk_handle: JoinHandle<WalkSummary>,
    pub worker_handles: Vec<JoinHandle<()>>,
    pub writer_handle: JoinHandle<Result<WriterOutcome<W>>>,
}

/// Start walk → work queue → digest workers → result queue → writer.
/// Caller must pass the handles to [`shutdown_pipeline_handles`].
pub fn run_pipeline<W>(
    ctx: PipelineContext,
    tuning: &PipelineTuning,
    sink: W,
    progress: Option<ProgressBar>,
) -> PipelineHandles<W>
where
    W: Write + Send + 'static,
{
    let channels = pipeline::create_pipeline_channels(tuning);

    let writer_handle = spawn_writer_thread(channels.result_rx, sink, progress);
    // Workers take the only result sender; the queue closes when the last of them exits.
    let worker_handles = spawn_digest_workers(
        channels.work_rx,
        channels.result_tx,
        tuning.num_workers,
        &ctx.cancel,
    );
    let walk_handle = spawn_walk_thread(channels.work_tx, ctx);

    PipelineHandles {
        walk_handle,
        worker_handles,
        writer_handle,
    }
}

/// Wait for the writer (it returns once the result queue closes), then the walk and workers.
/// A writer error is returned only after every thread has been joined.
pub fn shutdown_pipeline_handles<W>(
    handles: PipelineHandles<W>,
) -> Result<(WriterOutcome<W>, WalkSummary)> {
    let PipelineHandles {
        walk_handle,
        worker_handles,
        writer_handle,
    } = handles;

    let written = writer_handle
        .join()
        .map_err(|_| anyhow::anyhow!("writer thread panicked"));
    let walk = walk_handle
        .join()
        .map_err(|_| anyhow::anyhow!("walk thread panicked"));
    let mut worker_panicked = false;
    for h in worker_handles {
        worker_panicked |= h.join().is_err();
    }

    let outcome = written??;
    let walk = walk?;
    if worker_panicked {
        anyhow::bail!("digest worker panicked");
    }
    Ok((outcome, walk))
}

/// Run the whole pipeline over `ctx.root` into `sink`. Blocks until the sink is flushed.
/// The root is assumed to have been checked by the caller.
pub fn run_to_sink<W>(ctx: PipelineContext, sink: W, opts: &Opts) -> Result<(W, RunReport)>
where
    W: Write + Send + 'static,
{
    let start = Instant::now();

    let num_workers = WorkerThreadLimits::current().resolve(opts.num_workers);
    let tuning = PipelineTuning::for_workers(num_workers);
    debug!(
        "Starting {} digest workers (work queue {}, result queue {})",
        tuning.num_workers, tuning.work_cap, tuning.result_cap
    );
    let cancel = ctx.cancel.clone();
    let progress = opts.verbose.then(|| create_counter("Hashing"));

    let handles = run_pipeline(ctx, &tuning, sink, progress);
    let (outcome, walk) = shutdown_pipeline_handles(handles)?;

    let report = RunReport {
        enumerated: walk.emitted,
        written: outcome.written,
        failed: outcome.failed,
        skipped: walk.skipped,
        cancelled: cancel.is_cancelled(),
        elapsed: start.elapsed(),
    };
    Ok((outcome.sink, report))
}

/// Hash every non-excluded regular file under `root` and write records to `sink`.
/// Returns the sink (flushed) with the run report.
pub fn hash_tree<W>(
    root: &Path,
    matcher: ExclusionMatcher,
    sink: W,
    opts: &Opts,
) -> Result<(W, RunReport)>
where
    W: Write + Send + 'static,
{
    check_root(root)?;
    let ctx = PipelineContext::new(root, matcher, opts.cancel.clone());
    run_to_sink(ctx, sink, opts)
}
