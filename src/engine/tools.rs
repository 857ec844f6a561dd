//! Path and filter utilities

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Base-name predicate over a fixed set of shell-glob patterns (`*`, `?`, `[...]`).
/// Immutable once built, so the walker can share it freely.
#[derive(Clone, Debug)]
pub struct ExclusionMatcher {
    set: GlobSet,
    patterns: Vec<String>,
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self {
            set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }
}

impl ExclusionMatcher {
    /// Compile `patterns`. Blank entries are ignored; any invalid pattern is an error.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut kept = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .with_context(|| format!("invalid exclude pattern {pattern:?}"))?;
            builder.add(glob);
            kept.push(pattern.to_string());
        }
        let set = builder.build().context("build exclude pattern set")?;
        Ok(Self {
            set,
            patterns: kept,
        })
    }

    /// True when `name` (a base name, not a path) matches any pattern.
    pub fn is_excluded(&self, name: &OsStr) -> bool {
        !self.set.is_empty() && self.set.is_match(Path::new(name))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Split each value on whitespace so `-e "*.jpg *.gif"` and `-e *.jpg *.gif` mean the same thing.
pub fn split_patterns(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split_whitespace())
        .map(str::to_string)
        .collect()
}

/// True if `path` is the output file. Only canonicalizes when the file names already agree.
pub fn is_output_file(path: &Path, output_canonical: &Option<PathBuf>) -> bool {
    let Some(output) = output_canonical else {
        return false;
    };
    if path.file_name() != output.file_name() {
        return false;
    }
    path.canonicalize()
        .map(|p| p == *output)
        .unwrap_or(false)
}

/// Root to walk: must exist and be a directory.
pub fn check_root(root: &Path) -> Result<PathBuf> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("read root metadata: {}", root.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("root is not a directory: {}", root.display());
    }
    Ok(root.to_path_buf())
}
