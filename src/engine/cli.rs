//! CLI command handler: layer defaults, `.hashwalker.toml` and flags, then run.

use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use crate::engine::arg_parser::Cli;
use crate::engine::tools::split_patterns;
use crate::pipeline::report_failed_or_skipped_paths;
use crate::utils::{apply_file_to_task, load_hashwalker_toml, setup_logging};
use crate::{Opts, TaskSpec, run_task};

/// Overwrite task/opts fields with any flag the user passed.
pub fn apply_cli_to_task(cli: &Cli, task: &mut TaskSpec, opts: &mut Opts) {
    if let Some(root) = &cli.root {
        task.root = root.clone();
    }
    if let Some(output) = &cli.output {
        task.output = output.clone();
    }
    if !cli.exclude.is_empty() {
        task.exclude = cli.exclude.clone();
    }
    if let Some(n) = cli.workers {
        opts.num_workers = Some(n);
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    task.exclude = split_patterns(&task.exclude);
}

/// Defaults (root = `cwd`), then the settings file in `cwd`, then flags.
pub fn resolve_task(cli: &Cli, cwd: &Path) -> Result<(TaskSpec, Opts)> {
    let mut task = TaskSpec {
        root: cwd.to_path_buf(),
        ..TaskSpec::default()
    };
    let mut opts = Opts::default();
    if let Some(file) = load_hashwalker_toml(cwd)? {
        apply_file_to_task(&file, &mut task, &mut opts);
    }
    apply_cli_to_task(cli, &mut task, &mut opts);
    Ok((task, opts))
}

/// Run one hashing pass. Ctrl+C stops the run early; the partial output is still flushed.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("read current directory")?;
    let (task, opts) = resolve_task(cli, &cwd)?;
    setup_logging(opts.verbose);

    let cancel = opts.cancel.clone();
    ctrlc::set_handler(move || cancel.cancel()).context("set Ctrl+C handler")?;

    info!(
        "Hashing {} -> {}",
        task.root.display(),
        task.output.display()
    );
    let report = run_task(&task, &opts)?;
    report_failed_or_skipped_paths(&report, opts.verbose);
    info!(
        "Wrote {} records ({} failed, {} skipped) in {:?}",
        report.written,
        report.failed.len(),
        report.skipped.len(),
        report.elapsed
    );

    if report.cancelled {
        return Err(anyhow::anyhow!(
            "Hashing cancelled by user; partial output was flushed to {}",
            task.output.display()
        ));
    }
    Ok(())
}
