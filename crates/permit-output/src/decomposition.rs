//! Per-series and per-component decomposition tables.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use permit_model::{Component, Decomposition, TimeSeries};
use polars::prelude::*;
use tracing::{debug, info};

use crate::common::{OutputLayout, PERIOD_COLUMN};
use crate::error::{OutputError, Result};
use crate::frame::ComponentFrame;

/// One series' decomposition as a table: `period` followed by every
/// component column.
pub fn decomposition_frame(decomposition: &Decomposition) -> Result<ComponentFrame> {
    let columns: Vec<_> = Component::ALL
        .iter()
        .map(|component| {
            decomposition
                .component(*component)
                .clone()
                .renamed(component.column_name())
        })
        .collect();
    ComponentFrame::from_series(&columns)
}

pub fn write_decomposition_csv(decomposition: &Decomposition, path: &Path) -> Result<()> {
    decomposition_frame(decomposition)?.write_csv(path)
}

/// Reads a table written by [`write_decomposition_csv`] back into one
/// series per component. Every series is named `name`.
///
/// The first column holds the periods whatever its header says. Empty cells
/// are left out of the series they belong to.
pub fn read_decomposition_csv(path: &Path, name: &str) -> Result<Vec<(Component, TimeSeries)>> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let Some(periods) = df.get_columns().first() else {
        return Err(OutputError::MissingColumn {
            path: path.to_path_buf(),
            name: PERIOD_COLUMN.to_string(),
        });
    };
    let periods = periods.cast(&DataType::String)?;
    let index = periods
        .str()?
        .into_iter()
        .map(|token| {
            let token = token.unwrap_or_default().trim();
            NaiveDate::parse_from_str(token, "%Y-%m-%d").map_err(|_| OutputError::Period {
                path: path.to_path_buf(),
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut components = Vec::with_capacity(Component::ALL.len());
    for component in Component::ALL {
        let column_name = component.column_name();
        if df.get_column_index(column_name).is_none() {
            return Err(OutputError::MissingColumn {
                path: path.to_path_buf(),
                name: column_name.to_string(),
            });
        }
        let column = df.column(column_name)?.cast(&DataType::Float64)?;
        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = index
            .iter()
            .zip(column.f64()?)
            .filter_map(|(period, value)| value.map(|value| (*period, value)))
            .unzip();
        components.push((component, TimeSeries::new(name, dates, values)));
    }
    Ok(components)
}

/// Rebuilds one wide table per engine component from the per-series tables
/// of `names`, columns in the order given.
///
/// Tables are read from disk, so series cached by an earlier run keep their
/// columns next to the ones adjusted now.
pub fn write_component_tables(layout: &OutputLayout, names: &[String]) -> Result<Vec<PathBuf>> {
    let mut columns: Vec<Vec<TimeSeries>> =
        vec![Vec::with_capacity(names.len()); Component::DERIVED.len()];
    for name in names {
        let path = layout.series_csv(name);
        debug!(series = %name, path = %path.display(), "reading series table");
        for (component, series) in read_decomposition_csv(&path, name)? {
            if let Some(slot) = Component::DERIVED.iter().position(|c| *c == component) {
                columns[slot].push(series);
            }
        }
    }

    let mut written = Vec::with_capacity(Component::DERIVED.len());
    for (component, series) in Component::DERIVED.into_iter().zip(&columns) {
        let path = layout.component_table(component.column_name());
        ComponentFrame::from_series(series)?.write_csv(&path)?;
        written.push(path);
    }
    info!(series = names.len(), tables = written.len(), "wrote component tables");
    Ok(written)
}
