//! Engine artifact parsing.
//!
//! Component tables (`.d10` to `.d13`) start with two header lines, then one
//! `YYYYPP<TAB>value` row per period.

use std::fs;
use std::path::Path;

use permit_model::{Component, TimeSeries, parse_engine_period};

use crate::error::{Result, X13Error};
use crate::preprocess::SeriesInput;

/// Header lines preceding the rows of a component table.
pub const COMPONENT_HEADER_LINES: usize = 2;

/// Last token of the preamble of an `.err` artifact.
const PREAMBLE_END: &str = "spc:";

/// One row of a component table.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRow {
    /// Period token as written, e.g. `200103`.
    pub period: String,
    pub value: f64,
}

/// Reads an artifact the engine must have written.
pub fn read_artifact(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(X13Error::MissingArtifact {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(X13Error::io(path, e)),
    }
}

/// Reads an artifact the engine may omit.
pub fn read_optional_artifact(path: &Path) -> Result<Option<String>> {
    match read_artifact(path) {
        Ok(text) => Ok(Some(text)),
        Err(X13Error::MissingArtifact { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The diagnostics in an `.err` artifact, or `None` when it holds nothing
/// but the preamble the engine always writes.
///
/// The preamble ends with the spec file name, as in `Errors and warnings
/// for the X-13ARIMA-SEATS run of <dir>/series.spc:`.
pub fn engine_diagnostics(err_text: &str) -> Option<&str> {
    let body = err_text
        .find(PREAMBLE_END)
        .map_or(err_text, |end| &err_text[end + PREAMBLE_END.len()..])
        .trim();
    (!body.is_empty()).then_some(body)
}

/// Parses the rows of a component table. `path` is only used in errors.
pub fn parse_component_table(text: &str, path: &Path) -> Result<Vec<ArtifactRow>> {
    text.lines()
        .enumerate()
        .skip(COMPONENT_HEADER_LINES)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            let malformed = |message: String| X13Error::MalformedArtifact {
                path: path.to_path_buf(),
                line: idx + 1,
                message,
            };
            let mut fields = line.split(['\t', ' ']).filter(|field| !field.is_empty());
            let (Some(period), Some(value)) = (fields.next(), fields.next()) else {
                return Err(malformed(format!("expected two fields, got '{line}'")));
            };
            let value = value
                .parse::<f64>()
                .map_err(|e| malformed(format!("value '{value}': {e}")))?;
            Ok(ArtifactRow {
                period: period.to_string(),
                value,
            })
        })
        .collect()
}

/// Reads the component table for `component` and re-indexes it onto the
/// submitted observations.
///
/// The engine's own period tokens are only used to check alignment: the row
/// count and the first period must agree with the input.
pub fn read_component(path: &Path, component: Component, input: &SeriesInput) -> Result<TimeSeries> {
    let rows = parse_component_table(&read_artifact(path)?, path)?;
    let misaligned = |detail: String| X13Error::Misaligned { component, detail };

    if rows.len() != input.index.len() {
        return Err(misaligned(format!(
            "{} rows for {} observations",
            rows.len(),
            input.index.len()
        )));
    }
    if let Some(first) = rows.first() {
        let period = parse_engine_period(&first.period, input.frequency);
        if period != Some(input.start()) {
            return Err(misaligned(format!(
                "first period {} does not match start {}",
                first.period,
                input.start()
            )));
        }
    }

    Ok(TimeSeries::new(
        component.column_name(),
        input.index.clone(),
        rows.into_iter().map(|row| row.value).collect(),
    ))
}
