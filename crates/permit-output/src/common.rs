//! Shared paths and helpers for persisted artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OutputError, Result};

/// Name of the period column in every written table.
pub const PERIOD_COLUMN: &str = "period";

/// Ensure a parent directory exists for a file path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
    }
    Ok(())
}

/// File stem of a path-like entry, accepting both `/` and `\` separators.
///
/// Order lists are often produced on Windows, so a plain [`Path::file_stem`]
/// would keep the whole `C:\...` prefix on other platforms.
pub fn file_stem(entry: &str) -> &str {
    let name = entry.rsplit(['/', '\\']).next().unwrap_or(entry);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Where a run writes its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub output_dir: PathBuf,
    pub errors_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>, errors_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            errors_dir: errors_dir.into(),
        }
    }

    /// Creates both directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.output_dir, &self.errors_dir] {
            fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
        }
        Ok(())
    }

    /// Per-series decomposition table.
    pub fn series_csv(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}.csv"))
    }

    /// A series whose table already exists is not adjusted again.
    pub fn is_cached(&self, name: &str) -> bool {
        self.series_csv(name).is_file()
    }

    pub fn error_trace(&self, name: &str) -> PathBuf {
        self.errors_dir.join(format!("{name}.txt"))
    }

    /// Aggregated table for one component, e.g. `x13results_seasadj.csv`.
    pub fn component_table(&self, label: &str) -> PathBuf {
        self.output_dir.join(format!("x13results_{label}.csv"))
    }

    pub fn model_summary(&self) -> PathBuf {
        self.output_dir.join("models.json")
    }
}
