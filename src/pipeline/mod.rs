//! Pipeline components: context, walk loop, digest workers, completion tracking, writer.

pub mod completion;
pub mod context;
pub mod digest;
pub mod error_handler;
pub mod orchestrator;
pub mod walk;
pub mod writer;

pub use completion::{CompletionTracker, ResultLease};
pub use context::{PipelineChannels, PipelineContext, PipelineTuning, create_pipeline_channels};
pub use digest::spawn_digest_workers;
pub use error_handler::report_failed_or_skipped_paths;
pub use orchestrator::{
    PipelineHandles, hash_tree, run_pipeline, run_to_sink, shutdown_pipeline_handles,
};
pub use walk::{WalkOutcome, WalkSummary, run_walk_loop, spawn_walk_thread, to_outcome_walkdir};
pub use writer::{ResultWriter, WriterOutcome, format_record, run_writer_loop, spawn_writer_thread};
