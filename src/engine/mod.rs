//! Engine module: CLI surface and the per-file building blocks used by the pipeline

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::{apply_cli_to_task, handle_run, resolve_task};
pub use hashing::{FileDigester, hash_file, to_hex};
pub use tools::{ExclusionMatcher, check_root, is_output_file, split_patterns};
