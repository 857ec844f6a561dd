use clap::Parser;
use std::path::PathBuf;

/// Walk a directory and write `path,sha1,size` for every file.
#[derive(Clone, Debug, Default, Parser)]
#[command(name = "hashwalker")]
#[command(about = "Hash every file under a directory; write path,sha1,size records.")]
pub struct Cli {
    /// Directory to walk. Default: current directory.
    #[arg(long, short, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output file. Default: hashwalker_output.txt.
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Exclude patterns (glob syntax, matched against file and directory names).
    /// Can specify multiple: -e pattern1 pattern2, or one quoted list: -e "*.jpg *.gif".
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Number of digest workers. Default: available CPU threads.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Verbose output: debug logging, progress counter, list of failed paths.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
