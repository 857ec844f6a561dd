//! hashwalker CLI: write path,sha1,size for every file under a directory.

use anyhow::Result;
use clap::Parser;
use hashwalker::engine::arg_parser::Cli;
use hashwalker::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::info!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
