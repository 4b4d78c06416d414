//! Run summaries and failure traces.

use std::error::Error;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use permit_model::{ArimaModel, Decomposition};
use serde::{Deserialize, Serialize};

use crate::common::ensure_parent_dir;
use crate::error::{OutputError, Result};

/// Model chosen for one adjusted series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub name: String,
    /// `(p d q)(P D Q)` as the engine reports it.
    pub notation: String,
    pub model: ArimaModel,
    pub observations: usize,
}

impl ModelRecord {
    pub fn from_decomposition(decomposition: &Decomposition) -> Self {
        Self {
            name: decomposition.name.clone(),
            notation: decomposition.model.to_string(),
            model: decomposition.model,
            observations: decomposition.observed.len(),
        }
    }
}

/// One series that could not be adjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub name: String,
    pub error: String,
}

/// What a run did. As `models.json`, `adjusted` also carries the models of
/// series adjusted by earlier runs into the same directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub adjusted: Vec<ModelRecord>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailureRecord>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.adjusted.len() + self.skipped.len() + self.failed.len()
    }
}

pub fn write_run_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json).map_err(|e| OutputError::io(path, e))
}

/// Reads a summary written by [`write_run_summary`]. `None` when the file
/// does not exist.
pub fn read_run_summary(path: &Path) -> Result<Option<RunSummary>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(OutputError::io(path, e)),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

/// Renders an error and its source chain, one cause per line.
pub fn format_error_chain(error: &(dyn Error + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    if source.is_some() {
        text.push_str("\n\nCaused by:");
    }
    let mut depth = 0;
    while let Some(cause) = source {
        let _ = write!(text, "\n    {depth}: {cause}");
        depth += 1;
        source = cause.source();
    }
    text.push('\n');
    text
}

/// Writes the failure trace for one series.
pub fn write_failure_trace(path: &Path, error: &(dyn Error + 'static)) -> Result<()> {
    ensure_parent_dir(path)?;
    fs::write(path, format_error_chain(error)).map_err(|e| OutputError::io(path, e))
}
