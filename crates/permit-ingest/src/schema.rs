//! Declared layout of one source file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::date::DateFormat;
use crate::error::{IngestError, Result};

/// Deepest supported hierarchical header.
pub const MAX_HEADER_LEVELS: usize = 3;

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_header() -> Vec<usize> {
    vec![0]
}

/// How to read one CSV file into a raw table.
///
/// Row numbers count records of the file from zero. `skip_rows` is applied
/// first; `header` positions count the rows that remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSchema {
    pub path: PathBuf,

    /// WHATWG encoding label or Windows code page name, e.g. `cp949`.
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Header row positions, outermost level first. Rows between listed
    /// positions are discarded.
    #[serde(default = "default_header")]
    pub header: Vec<usize>,

    /// Records dropped before header detection.
    #[serde(default)]
    pub skip_rows: Vec<usize>,

    /// Column positions forming the row index.
    pub index_columns: Vec<usize>,

    /// Index column holding the period token.
    pub date_column: usize,

    #[serde(default)]
    pub date_format: DateFormat,

    /// Exact label set required at the outermost header level of the data columns.
    #[serde(default)]
    pub expected_outer_labels: Option<Vec<String>>,
}

impl SourceSchema {
    /// Creates a schema for a single-header UTF-8 file with the period in `date_column`.
    pub fn new(path: impl Into<PathBuf>, date_column: usize) -> Self {
        Self {
            path: path.into(),
            encoding: default_encoding(),
            header: default_header(),
            skip_rows: Vec::new(),
            index_columns: vec![date_column],
            date_column,
            date_format: DateFormat::default(),
            expected_outer_labels: None,
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = label.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, rows: Vec<usize>) -> Self {
        self.header = rows;
        self
    }

    #[must_use]
    pub fn with_skip_rows(mut self, rows: Vec<usize>) -> Self {
        self.skip_rows = rows;
        self
    }

    #[must_use]
    pub fn with_index_columns(mut self, columns: Vec<usize>) -> Self {
        self.index_columns = columns;
        self
    }

    #[must_use]
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_format = format;
        self
    }

    #[must_use]
    pub fn with_expected_outer_labels(mut self, labels: Vec<String>) -> Self {
        self.expected_outer_labels = Some(labels);
        self
    }

    /// Resolves a relative `path` against `base_dir`.
    pub fn resolve(&self, base_dir: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            base_dir.join(&self.path)
        }
    }

    pub(crate) fn validate(&self, path: &Path) -> Result<()> {
        let invalid = |reason: String| IngestError::InvalidSchema {
            path: path.to_path_buf(),
            reason,
        };
        if self.header.is_empty() || self.header.len() > MAX_HEADER_LEVELS {
            return Err(invalid(format!(
                "expected 1 to {MAX_HEADER_LEVELS} header rows, got {}",
                self.header.len()
            )));
        }
        if self.header.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(invalid("header rows must be strictly increasing".to_string()));
        }
        if !self.index_columns.contains(&self.date_column) {
            return Err(invalid(format!(
                "date column {} is not an index column",
                self.date_column
            )));
        }
        Ok(())
    }
}
