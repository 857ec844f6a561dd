//! Load `.hashwalker.toml` from a directory (CLI only). Lib callers build `TaskSpec`/`Opts` themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;
use crate::{Opts, TaskSpec};

#[derive(Debug, Default, Deserialize)]
pub struct HashwalkerToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    root: Option<PathBuf>,
    output: Option<PathBuf>,
    exclude: Option<Vec<String>>,
    workers: Option<usize>,
    verbose: Option<bool>,
}

/// Load the settings file from `dir`. `Ok(None)` when there is no file; a malformed file is an error.
pub fn load_hashwalker_toml(dir: &Path) -> Result<Option<HashwalkerToml>> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let parsed = parse_hashwalker_toml(&s).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(parsed))
}

pub fn parse_hashwalker_toml(s: &str) -> std::result::Result<HashwalkerToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite a field from the file when present.
macro_rules! apply_file_opt {
    ($section:expr, $target:expr, $field:ident => $target_field:ident) => {
        if let Some(v) = $section.$field.clone() {
            $target.$target_field = v;
        }
    };
}

/// Apply file settings on top of defaults. Call before applying CLI flags.
pub fn apply_file_to_task(file: &HashwalkerToml, task: &mut TaskSpec, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, task, root => root);
    apply_file_opt!(s, task, output => output);
    apply_file_opt!(s, task, exclude => exclude);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(n) = s.workers {
        opts.num_workers = Some(n);
    }
}
