//! Working table threaded through recipe steps.

use permit_model::{ColumnKey, RawColumn, RawTable, RowKey};

/// A raw table plus the column level names assigned so far.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub source: String,
    pub index_names: Vec<String>,
    pub rows: Vec<RowKey>,
    pub columns: Vec<RawColumn>,
    /// Empty until a `name_levels` step runs.
    pub level_names: Vec<String>,
}

impl From<RawTable> for Frame {
    fn from(table: RawTable) -> Self {
        Self {
            source: table.source,
            index_names: table.index_names,
            rows: table.rows,
            columns: table.columns,
            level_names: Vec::new(),
        }
    }
}

impl Frame {
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_depth(&self) -> usize {
        self.columns.first().map_or(0, |column| column.key.len())
    }

    pub fn position(&self, key: &[String]) -> Option<usize> {
        self.columns.iter().position(|column| column.key == key)
    }

    /// Distinct labels at column `level`, first-appearance order.
    pub fn labels_at(&self, level: usize) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for column in &self.columns {
            if let Some(label) = column.key.get(level)
                && !labels.contains(&label.as_str())
            {
                labels.push(label);
            }
        }
        labels
    }

    /// First duplicated column key, if any.
    pub fn duplicate_key(&self) -> Option<&ColumnKey> {
        self.columns.iter().enumerate().find_map(|(idx, column)| {
            self.columns[..idx]
                .iter()
                .any(|earlier| earlier.key == column.key)
                .then_some(&column.key)
        })
    }
}
