//! Collecting engine artifacts written by earlier runs into one table.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use permit_model::{Frequency, TimeSeries, parse_engine_period};
use permit_x13::{parse_component_table, read_artifact};
use polars::prelude::*;
use tracing::{debug, info};

use crate::common::file_stem;
use crate::error::{OutputError, Result};
use crate::frame::ComponentFrame;

/// Reads one component artifact (`.d11`, `.saa`, ...) as a series named after
/// the file stem.
pub fn read_component_artifact(path: &Path, frequency: Frequency) -> Result<TimeSeries> {
    let rows = parse_component_table(&read_artifact(path)?, path)?;

    let mut seen = HashSet::with_capacity(rows.len());
    let mut index = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let period =
            parse_engine_period(&row.period, frequency).ok_or_else(|| OutputError::Period {
                path: path.to_path_buf(),
                token: row.period.clone(),
            })?;
        if !seen.insert(period) {
            return Err(OutputError::DuplicatePeriod {
                path: path.to_path_buf(),
                token: row.period,
            });
        }
        index.push(period);
        values.push(row.value);
    }

    let name = file_stem(&path.to_string_lossy()).to_string();
    Ok(TimeSeries::new(name, index, values))
}

/// Reads the column order list: the first field of every row, reduced to its
/// file stem. Entries may be bare names or full paths.
pub fn load_order_list(path: &Path) -> Result<Vec<String>> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let Some(first) = df.get_columns().first() else {
        return Ok(Vec::new());
    };
    let first = first.cast(&DataType::String)?;
    let entries: Vec<String> = first
        .str()?
        .into_iter()
        .flatten()
        .map(|entry| file_stem(entry.trim().trim_start_matches('\u{feff}')).to_string())
        .filter(|entry| !entry.is_empty())
        .collect();
    debug!(path = %path.display(), entries = entries.len(), "loaded order list");
    Ok(entries)
}

/// Artifacts in `dir` whose extension matches `extension`, sorted by path.
pub fn find_artifacts(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| OutputError::io(dir, e))? {
        let path = entry.map_err(|e| OutputError::io(dir, e))?.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if matches && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Reads every `*.<extension>` artifact in `dir` into one wide table and
/// orders its columns by `order`.
pub fn aggregate_artifacts(
    dir: &Path,
    extension: &str,
    frequency: Frequency,
    order: &[String],
) -> Result<ComponentFrame> {
    let paths = find_artifacts(dir, extension)?;
    let series = paths
        .iter()
        .map(|path| read_component_artifact(path, frequency))
        .collect::<Result<Vec<_>>>()?;
    let frame = ComponentFrame::from_series(&series)?.reordered(order)?;
    info!(
        dir = %dir.display(),
        extension,
        artifacts = series.len(),
        kept = frame.series_names().len(),
        "aggregated artifacts"
    );
    Ok(frame)
}
