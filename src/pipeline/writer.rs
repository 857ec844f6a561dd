//! Result writer: the single consumer of the result queue.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use log::{debug, warn};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::hashing::to_hex;
use crate::engine::progress::{ProgressBar, refresh_bar, update_progress_bar};
use crate::utils::config::OUTPUT_BUFFER_SIZE;
use crate::{Sha1Digest, WorkUnit};

/// What the writer hands back when joined: the flushed sink and what went into it.
pub struct WriterOutcome<W> {
    pub sink: W,
    pub written: usize,
    pub failed: Vec<(PathBuf, String)>,
}

/// One output line, without the newline: `path,hexdigest,size`. Commas in `path` are not escaped.
pub fn format_record(path: &Path, digest: &Sha1Digest, size: u64) -> String {
    format!("{},{},{}", path.display(), to_hex(digest), size)
}

/// Appends records for successful units; failed units are kept aside for the report.
pub struct ResultWriter<W: Write> {
    out: BufWriter<W>,
    written: usize,
    failed: Vec<(PathBuf, String)>,
    progress: Option<ProgressBar>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W, progress: Option<ProgressBar>) -> Self {
        Self {
            out: BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, sink),
            written: 0,
            failed: Vec::new(),
            progress,
        }
    }

    pub fn accept(&mut self, unit: WorkUnit) -> io::Result<()> {
        if let Some(pb) = &self.progress {
            update_progress_bar(pb, 1);
        }
        let WorkUnit {
            path,
            size,
            digest,
            failure,
        } = unit;
        match (failure, digest) {
            (None, Some(digest)) => {
                writeln!(self.out, "{}", format_record(&path, &digest, size))?;
                self.written += 1;
            }
            (Some(failure), _) => {
                warn!("Not hashed: {}: {}", path.display(), failure);
                self.failed.push((path, failure.to_string()));
            }
            (None, None) => {
                warn!("Not hashed: {}: no digest produced", path.display());
                self.failed.push((path, "no digest produced".to_string()));
            }
        }
        Ok(())
    }

    /// Flush and give the sink back.
    pub fn finish(self) -> Result<WriterOutcome<W>> {
        if let Some(pb) = &self.progress {
            refresh_bar(pb);
        }
        let sink = self
            .out
            .into_inner()
            .map_err(|e| e.into_error())
            .context("flush output")?;
        Ok(WriterOutcome {
            sink,
            written: self.written,
            failed: self.failed,
        })
    }
}

/// Drain `result_rx` until every worker is done. A write error ends the loop and drops the
/// receiver, so upstream sends fail and the rest of the pipeline unwinds.
pub fn run_writer_loop<W: Write>(
    result_rx: Receiver<WorkUnit>,
    mut writer: ResultWriter<W>,
) -> Result<WriterOutcome<W>> {
    while let Ok(unit) = result_rx.recv() {
        writer.accept(unit).context("write record")?;
    }
    debug!("writer: result queue closed, {} records", writer.written);
    writer.finish()
}

pub fn spawn_writer_thread<W>(
    result_rx: Receiver<WorkUnit>,
    sink: W,
    progress: Option<ProgressBar>,
) -> JoinHandle<Result<WriterOutcome<W>>>
where
    W: Write + Send + 'static,
{
    thread::spawn(move || run_writer_loop(result_rx, ResultWriter::new(sink, progress)))
}
