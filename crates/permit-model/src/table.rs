use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::error::{SchemaMismatch, TableError};
use crate::value::ValueTag;

/// One label per column level, outermost first.
pub type ColumnKey = Vec<String>;

/// Hierarchical row key: zero or more label levels and the period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey {
    pub labels: Vec<String>,
    pub period: NaiveDate,
}

impl RowKey {
    pub fn new(labels: Vec<String>, period: NaiveDate) -> Self {
        Self { labels, period }
    }

    pub fn period_only(period: NaiveDate) -> Self {
        Self {
            labels: Vec::new(),
            period,
        }
    }
}

/// A column of text cells as read from a source file. `None` marks an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub key: ColumnKey,
    pub cells: Vec<Option<String>>,
}

/// A table as read from one or more source files of the same layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Where the rows came from, for diagnostics.
    pub source: String,
    /// Names of the row label levels, outermost first.
    pub index_names: Vec<String>,
    pub rows: Vec<RowKey>,
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of column levels, taken from the first column.
    pub fn column_depth(&self) -> usize {
        self.columns.first().map_or(0, |column| column.key.len())
    }

    /// Distinct outermost column labels in first-appearance order.
    pub fn outer_labels(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.columns
            .iter()
            .filter_map(|column| column.key.first())
            .filter(|label| seen.insert(label.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn column(&self, key: &[&str]) -> Option<&RawColumn> {
        self.columns.iter().find(|column| key_matches(&column.key, key))
    }
}

/// A numeric column of a canonical table.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalColumn {
    pub key: ColumnKey,
    pub values: Vec<Option<f64>>,
}

/// A normalized domain table: periods by `value` × category columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTable {
    domain: String,
    level_names: Vec<String>,
    index: Vec<NaiveDate>,
    columns: Vec<CanonicalColumn>,
}

impl CanonicalTable {
    /// Builds a table after checking every canonical invariant.
    pub fn try_new(
        domain: impl Into<String>,
        level_names: Vec<String>,
        index: Vec<NaiveDate>,
        columns: Vec<CanonicalColumn>,
    ) -> Result<Self, TableError> {
        let domain = domain.into();
        if let Some(pair) = index.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(TableError::NonMonotonicIndex { period: pair[1] });
        }

        let mut keys = BTreeSet::new();
        for (position, column) in columns.iter().enumerate() {
            if column.key.len() != level_names.len() {
                return Err(TableError::LevelCount {
                    key: column.key.clone(),
                    expected: level_names.len(),
                    found: column.key.len(),
                });
            }
            if let Some(level) = column.key.iter().position(|label| label.trim().is_empty()) {
                return Err(TableError::BlankLabel { position, level });
            }
            if column.values.len() != index.len() {
                return Err(TableError::Length {
                    key: column.key.clone(),
                    expected: index.len(),
                    found: column.values.len(),
                });
            }
            if !keys.insert(column.key.clone()) {
                return Err(TableError::DuplicateColumn {
                    key: column.key.clone(),
                });
            }
        }

        SchemaMismatch::check(
            &domain,
            ValueTag::labels(),
            columns.iter().map(|column| column.key[0].as_str()),
        )?;

        Ok(Self {
            domain,
            level_names,
            index,
            columns,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn level_names(&self) -> &[String] {
        &self.level_names
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[CanonicalColumn] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, key: &[&str]) -> Option<&CanonicalColumn> {
        self.columns.iter().find(|column| key_matches(&column.key, key))
    }

    /// Value tags present at the outermost level, in column order.
    pub fn value_tags(&self) -> Vec<ValueTag> {
        let mut tags = Vec::new();
        for column in &self.columns {
            if let Some(tag) = ValueTag::from_label(&column.key[0])
                && !tags.contains(&tag)
            {
                tags.push(tag);
            }
        }
        tags
    }
}

fn key_matches(key: &[String], wanted: &[&str]) -> bool {
    key.len() == wanted.len() && key.iter().zip(wanted).all(|(a, b)| a == b)
}
