//! Pipeline context and channels: shared data passed into the walk thread, queues between stages.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};

use crate::engine::tools::ExclusionMatcher;
use crate::utils::config::QueueCaps;
use crate::{CancelFlag, WorkUnit};

/// Worker count and queue sizes for one run.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub num_workers: usize,
    pub work_cap: usize,
    pub result_cap: usize,
}

impl PipelineTuning {
    pub fn for_workers(num_workers: usize) -> Self {
        let num_workers = num_workers.max(1);
        Self {
            num_workers,
            work_cap: QueueCaps::work_cap(num_workers),
            result_cap: QueueCaps::RESULT_CAP,
        }
    }
}

/// Everything the walk thread needs. Moved into the thread; nothing in here is mutated.
pub struct PipelineContext {
    pub root: PathBuf,
    pub matcher: ExclusionMatcher,
    /// Canonical output path when it may lie under `root`; that file is never hashed.
    pub output_canonical: Option<PathBuf>,
    pub cancel: CancelFlag,
}

impl PipelineContext {
    pub fn new(root: &Path, matcher: ExclusionMatcher, cancel: CancelFlag) -> Self {
        Self {
            root: root.to_path_buf(),
            matcher,
            output_canonical: None,
            cancel,
        }
    }

    pub fn with_output(mut self, output_canonical: Option<PathBuf>) -> Self {
        self.output_canonical = output_canonical;
        self
    }
}

/// Both bounded queues. Walk thread gets work_tx; workers get work_rx and result_tx; writer gets result_rx.
pub struct PipelineChannels {
    pub work_tx: Sender<WorkUnit>,
    pub work_rx: Receiver<WorkUnit>,
    pub result_tx: Sender<WorkUnit>,
    pub result_rx: Receiver<WorkUnit>,
}

pub fn create_pipeline_channels(tuning: &PipelineTuning) -> PipelineChannels {
    let (work_tx, work_rx) = bounded::<WorkUnit>(tuning.work_cap);
    let (result_tx, result_rx) = bounded::<WorkUnit>(tuning.result_cap);
    PipelineChannels {
        work_tx,
        work_rx,
        result_tx,
        result_rx,
    }
}
