pub mod config;
pub mod fd_limit;
pub mod hashwalker_toml;
pub mod logger;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, max_open_fds, max_workers_by_fd_limit};
pub use hashwalker_toml::{apply_file_to_task, load_hashwalker_toml, parse_hashwalker_toml};
pub use logger::setup_logging;
