use chrono::NaiveDate;
use serde::Serialize;

use crate::table::ColumnKey;

/// One column of a canonical table, identified by a stable name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSeries {
    /// Sanitized identifier, also used for artifact file names.
    pub name: String,
    pub domain: String,
    /// Column key the series was extracted from, outermost level first.
    pub key: ColumnKey,
    pub index: Vec<NaiveDate>,
    /// Observations; `None` marks a gap.
    pub values: Vec<Option<f64>>,
}

impl NamedSeries {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of non-missing observations.
    pub fn observed_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_some()).count()
    }
}

/// A gap-free numeric series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub name: String,
    pub index: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(name: impl Into<String>, index: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            index,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn get(&self, period: NaiveDate) -> Option<f64> {
        self.index
            .binary_search(&period)
            .ok()
            .map(|position| self.values[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Same observations under a different name.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
