//! Walk loop: depth-first traversal that prunes excluded names and sends one unit per regular file.

use crossbeam_channel::Sender;
use log::{debug, warn};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::WorkUnit;
use crate::engine::tools::is_output_file;

use super::context::PipelineContext;

/// One result from the directory walk: a regular file to hash, or an entry we could not read.
pub enum WalkOutcome {
    File { path: PathBuf, size: u64 },
    Err { msg: String, path: Option<PathBuf> },
}

/// What the walk thread hands back when it is joined.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Units sent on the work queue.
    pub emitted: usize,
    /// Entries skipped because of traversal errors, with the error text.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Convert a walkdir result into [`WalkOutcome`]. Directories, symlinks and special files yield `None`.
/// Size comes from this metadata call and is not looked at again.
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> Option<WalkOutcome> {
    match r {
        Ok(entry) => {
            if !entry.file_type().is_file() {
                return None;
            }
            match entry.metadata() {
                Ok(meta) => Some(WalkOutcome::File {
                    path: entry.into_path(),
                    size: meta.len(),
                }),
                Err(err) => Some(WalkOutcome::Err {
                    msg: format!("{}", err),
                    path: Some(entry.into_path()),
                }),
            }
        }
        Err(err) => Some(WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        }),
    }
}

/// Pre-order walk of `ctx.root`. An excluded directory is pruned with everything beneath it;
/// the root itself is never matched.
fn walkdir_iter(ctx: &PipelineContext) -> impl Iterator<Item = WalkOutcome> + '_ {
    let matcher = &ctx.matcher;
    WalkDir::new(&ctx.root)
        .follow_links(false)
        .into_iter()
        .filter_entry(move |e| e.depth() == 0 || !matcher.is_excluded(e.file_name()))
        .filter_map(to_outcome_walkdir)
}

pub fn spawn_walk_thread(work_tx: Sender<WorkUnit>, ctx: PipelineContext) -> JoinHandle<WalkSummary> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        run_walk_loop(work_tx, &ctx, iter)
    })
}

/// Consume `iter`, sending each file as a [`WorkUnit`] on `work_tx` (blocks while the queue is full).
/// Errors are logged and recorded; they never stop the walk. Stops early if cancelled or if every
/// worker has gone away. Drops `work_tx` on return, which closes the work queue.
pub fn run_walk_loop<I>(work_tx: Sender<WorkUnit>, ctx: &PipelineContext, iter: I) -> WalkSummary
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut summary = WalkSummary::default();
    for outcome in iter {
        if ctx.cancel.is_cancelled() {
            debug!("walk: cancelled after {} files", summary.emitted);
            break;
        }
        match outcome {
            WalkOutcome::File { path, size } => {
                if is_output_file(&path, &ctx.output_canonical) {
                    debug!("walk: not hashing output file {}", path.display());
                    continue;
                }
                if work_tx.send(WorkUnit::new(path, size)).is_err() {
                    debug!("walk: work queue has no receivers, stopping");
                    break;
                }
                summary.emitted += 1;
            }
            WalkOutcome::Err { msg, path } => {
                warn!("Skipping unreadable entry: {}", msg);
                let path = path.unwrap_or_else(|| ctx.root.clone());
                summary.skipped.push((path, msg));
            }
        }
    }
    drop(work_tx);
    debug!(
        "walk: done, {} files sent, {} entries skipped",
        summary.emitted,
        summary.skipped.len()
    );
    summary
}
