use crate::RunReport;

/// Log what the run could not hash. Call after the pipeline has been joined.
/// In verbose mode every failed or skipped path is listed on stderr.
pub fn report_failed_or_skipped_paths(report: &RunReport, verbose: bool) {
    if !report.skipped.is_empty() {
        log::warn!(
            "Skipped {} entries due to permission errors or access issues",
            report.skipped.len()
        );
    }
    if !report.failed.is_empty() {
        log::warn!(
            "{} files could not be hashed and are missing from the output",
            report.failed.len()
        );
    }
    if verbose {
        for (p, msg) in &report.skipped {
            eprintln!("  skipped: {} ({})", p.display(), msg);
        }
        for (p, msg) in &report.failed {
            eprintln!("  failed: {} ({})", p.display(), msg);
        }
    }
}
