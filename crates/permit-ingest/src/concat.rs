//! Row-wise concatenation of tables read with the same layout.

use permit_model::{ColumnKey, RawColumn, RawTable};
use tracing::debug;

use crate::error::{IngestError, Result};

/// Stacks tables vertically.
///
/// Columns are the union of all inputs in first-appearance order; a column
/// missing from one input is filled with empty cells for its rows. Rows keep
/// input order and are not re-sorted.
pub fn concat_tables(tables: Vec<RawTable>) -> Result<RawTable> {
    let mut tables = tables.into_iter();
    let Some(mut combined) = tables.next() else {
        return Err(IngestError::NoSources);
    };

    for table in tables {
        if table.index_names.len() != combined.index_names.len() {
            return Err(IngestError::IndexShape {
                source_name: table.source,
                expected: combined.index_names.len(),
                found: table.index_names.len(),
            });
        }
        append(&mut combined, table);
    }

    debug!(
        source = %combined.source,
        rows = combined.height(),
        columns = combined.width(),
        "concatenated source tables"
    );
    Ok(combined)
}

fn append(combined: &mut RawTable, table: RawTable) {
    let existing_rows = combined.height();
    let added_rows = table.height();

    let mut incoming: Vec<(ColumnKey, Vec<Option<String>>)> = table
        .columns
        .into_iter()
        .map(|column| (column.key, column.cells))
        .collect();

    for column in &mut combined.columns {
        match incoming.iter().position(|(key, _)| *key == column.key) {
            Some(position) => {
                let (_, cells) = incoming.remove(position);
                column.cells.extend(cells);
            }
            None => column.cells.resize(existing_rows + added_rows, None),
        }
    }

    for (key, cells) in incoming {
        let mut filled = vec![None; existing_rows];
        filled.extend(cells);
        combined.columns.push(RawColumn { key, cells: filled });
    }

    combined.rows.extend(table.rows);
    combined.source = format!("{} + {}", combined.source, table.source);
}
