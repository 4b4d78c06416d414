//! Wide component tables keyed by period.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use permit_model::{TimeSeries, format_period};
use polars::prelude::*;
use tracing::debug;

use crate::common::{PERIOD_COLUMN, ensure_parent_dir};
use crate::error::{OutputError, Result};

/// Many named series side by side, one row per period.
///
/// The first column is always [`PERIOD_COLUMN`]. Rows cover the union of all
/// periods in ascending order; a series without a value for a period has a
/// null cell there.
#[derive(Debug, Clone)]
pub struct ComponentFrame {
    frame: DataFrame,
}

impl ComponentFrame {
    /// Builds the frame with one column per series, named after the series.
    pub fn from_series(series: &[TimeSeries]) -> Result<Self> {
        let periods: BTreeSet<NaiveDate> = series
            .iter()
            .flat_map(|s| s.index.iter().copied())
            .collect();
        let rows: HashMap<NaiveDate, usize> = periods
            .iter()
            .enumerate()
            .map(|(row, period)| (*period, row))
            .collect();

        let mut columns = Vec::with_capacity(series.len() + 1);
        columns.push(Column::new(
            PERIOD_COLUMN.into(),
            periods.iter().map(|period| format_period(*period)).collect::<Vec<_>>(),
        ));

        let mut names = HashSet::new();
        for s in series {
            if s.name == PERIOD_COLUMN || !names.insert(s.name.as_str()) {
                return Err(OutputError::DuplicateColumn {
                    name: s.name.clone(),
                });
            }
            let mut values: Vec<Option<f64>> = vec![None; periods.len()];
            for (period, value) in s.iter() {
                if let Some(&row) = rows.get(&period) {
                    values[row] = Some(value);
                }
            }
            columns.push(Column::new(s.name.as_str().into(), values));
        }

        Ok(Self {
            frame: DataFrame::new(columns)?,
        })
    }

    /// Keeps only the listed columns, in list order. See [`reorder_columns`].
    pub fn reordered(&self, order: &[String]) -> Result<Self> {
        Ok(Self {
            frame: reorder_columns(&self.frame, order)?,
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Series column names, without the period column.
    pub fn series_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != PERIOD_COLUMN)
            .map(|name| name.to_string())
            .collect()
    }

    pub fn write_csv(mut self, path: &Path) -> Result<()> {
        write_csv_with_bom(&mut self.frame, path)
    }
}

/// Selects the period column plus every name of `order` present in `frame`,
/// in the order listed.
///
/// Columns missing from `order` are dropped, names in `order` that the frame
/// does not have are ignored, and repeated names are kept once.
pub fn reorder_columns(frame: &DataFrame, order: &[String]) -> Result<DataFrame> {
    let mut selected: Vec<&str> = Vec::with_capacity(order.len() + 1);
    if frame.get_column_index(PERIOD_COLUMN).is_some() {
        selected.push(PERIOD_COLUMN);
    }
    for name in order {
        let name = name.as_str();
        if name != PERIOD_COLUMN
            && frame.get_column_index(name).is_some()
            && !selected.contains(&name)
        {
            selected.push(name);
        }
    }
    Ok(frame.select(selected)?)
}

/// Writes `frame` as UTF-8 CSV with a byte-order mark. Null cells are empty.
pub fn write_csv_with_bom(frame: &mut DataFrame, path: &Path) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut file = File::create(path).map_err(|e| OutputError::io(path, e))?;
    CsvWriter::new(&mut file)
        .include_bom(true)
        .include_header(true)
        .finish(frame)?;
    debug!(path = %path.display(), rows = frame.height(), columns = frame.width(), "wrote csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn series(name: &str, points: &[(NaiveDate, f64)]) -> TimeSeries {
        TimeSeries::new(
            name,
            points.iter().map(|(period, _)| *period).collect(),
            points.iter().map(|(_, value)| *value).collect(),
        )
    }

    #[test]
    fn test_from_series_unions_periods() {
        let frame = ComponentFrame::from_series(&[
            series("b", &[(ym(2001, 2), 2.0), (ym(2001, 3), 3.0)]),
            series("a", &[(ym(2001, 1), 1.0), (ym(2001, 2), 20.0)]),
        ])
        .unwrap();
        let df = frame.frame();

        assert_eq!(df.height(), 3);
        let periods: Vec<_> = df.column(PERIOD_COLUMN).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(
            periods,
            vec![Some("2001-01-01"), Some("2001-02-01"), Some("2001-03-01")]
        );
        let b: Vec<_> = df.column("b").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(b, vec![None, Some(2.0), Some(3.0)]);
        assert_eq!(frame.series_names(), vec!["b", "a"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ComponentFrame::from_series(&[
            series("a", &[(ym(2001, 1), 1.0)]),
            series("a", &[(ym(2001, 1), 2.0)]),
        ]);
        assert!(matches!(result, Err(OutputError::DuplicateColumn { name }) if name == "a"));
    }

    #[test]
    fn test_reorder_filters_then_reindexes() {
        let frame = ComponentFrame::from_series(&[
            series("A", &[(ym(2001, 1), 1.0)]),
            series("C", &[(ym(2001, 1), 3.0)]),
            series("B", &[(ym(2001, 1), 2.0)]),
        ])
        .unwrap();
        let order = ["B", "A", "D", "B"].map(String::from);

        let reordered = reorder_columns(frame.frame(), &order).unwrap();

        let names: Vec<_> = reordered
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names, vec![PERIOD_COLUMN, "B", "A"]);
    }
}
