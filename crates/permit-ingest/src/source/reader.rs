//! CSV file reading with declared header, index and encoding configuration.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::Encoding;
use tracing::debug;

use permit_model::{RawColumn, RawTable, RowKey, SchemaMismatch};

use crate::date::parse_period;
use crate::error::{IngestError, Result};
use crate::schema::SourceSchema;

use super::header::HeaderGrid;

/// A CSV record with the 0-based line it started on.
struct Record {
    line: u64,
    cells: Vec<String>,
}

/// Looks up an encoding by WHATWG label or by Windows code page name.
///
/// WHATWG has no `cp949` label; `encoding_rs::EUC_KR` is the windows-949
/// superset, so the code page names map onto it.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let label = label.trim();
    match label.to_ascii_lowercase().as_str() {
        "cp949" | "ms949" | "uhc" | "x-windows-949" => Some(encoding_rs::EUC_KR),
        _ => Encoding::for_label(label.as_bytes()),
    }
}

/// Decodes raw bytes with the encoding named by `label`.
///
/// A byte-order mark overrides the label, as browsers do.
pub fn decode_text<'a>(bytes: &'a [u8], label: &str, path: &Path) -> Result<Cow<'a, str>> {
    let encoding = resolve_encoding(label).ok_or_else(|| IngestError::UnknownEncoding {
        path: path.to_path_buf(),
        label: label.to_string(),
    })?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(IngestError::Decode {
            path: path.to_path_buf(),
            encoding: used.name(),
        });
    }
    Ok(text)
}

fn read_records(text: &str, path: &Path) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let line = record
            .position()
            .map_or(records.len() as u64, |pos| pos.line().saturating_sub(1));
        records.push(Record {
            line,
            cells: record.iter().map(|cell| cell.trim().to_string()).collect(),
        });
    }
    Ok(records)
}

/// Reads one source file into a [`RawTable`].
///
/// Relative schema paths are resolved against `base_dir`.
pub fn read_source(schema: &SourceSchema, base_dir: &Path) -> Result<RawTable> {
    let path = schema.resolve(base_dir);
    schema.validate(&path)?;

    let bytes = std::fs::read(&path).map_err(|e| IngestError::file(&path, e))?;
    let text = decode_text(&bytes, &schema.encoding, &path)?;

    let rows: Vec<Record> = read_records(&text, &path)?
        .into_iter()
        .filter(|record| !schema.skip_rows.contains(&(record.line as usize)))
        .filter(|record| record.cells.iter().any(|cell| !cell.is_empty()))
        .collect();
    if rows.is_empty() {
        return Err(IngestError::EmptyCsv { path });
    }

    let last_header = *schema.header.last().unwrap_or(&0);
    if last_header >= rows.len() {
        return Err(IngestError::InvalidSchema {
            path,
            reason: format!("header row {last_header} is past the end of the file"),
        });
    }
    let header_rows: Vec<&Vec<String>> = schema.header.iter().map(|&idx| &rows[idx].cells).collect();
    let grid = HeaderGrid::new(&header_rows);

    if let Some(&column) = schema
        .index_columns
        .iter()
        .find(|&&column| column >= grid.width())
    {
        return Err(IngestError::InvalidSchema {
            path,
            reason: format!("index column {column} is past the last header column"),
        });
    }

    let data_positions: Vec<usize> = (0..grid.width())
        .filter(|column| !schema.index_columns.contains(column))
        .collect();
    let keys = grid
        .column_keys(&data_positions)
        .map_err(|(column, level)| IngestError::BlankHeader {
            path: path.clone(),
            column,
            level,
        })?;

    let label_positions: Vec<usize> = schema
        .index_columns
        .iter()
        .copied()
        .filter(|&column| column != schema.date_column)
        .collect();
    let index_names = label_positions
        .iter()
        .map(|&column| grid.index_name(column))
        .collect();

    let mut row_keys = Vec::new();
    let mut columns: Vec<RawColumn> = keys
        .into_iter()
        .map(|key| RawColumn {
            key,
            cells: Vec::new(),
        })
        .collect();

    for record in &rows[last_header + 1..] {
        let cell = |column: usize| record.cells.get(column).map_or("", String::as_str);
        let token = cell(schema.date_column);
        let period =
            parse_period(token, &schema.date_format).ok_or_else(|| IngestError::InvalidDate {
                path: path.clone(),
                line: record.line + 1,
                value: token.to_string(),
            })?;
        let labels = label_positions
            .iter()
            .map(|&column| cell(column).to_string())
            .collect();
        row_keys.push(RowKey::new(labels, period));
        for (column, &position) in columns.iter_mut().zip(&data_positions) {
            let value = cell(position);
            column
                .cells
                .push((!value.is_empty()).then(|| value.to_string()));
        }
    }

    let table = RawTable {
        source: path.display().to_string(),
        index_names,
        rows: row_keys,
        columns,
    };

    if let Some(expected) = &schema.expected_outer_labels {
        SchemaMismatch::check(&table.source, expected, table.outer_labels())?;
    }

    debug!(
        source = %table.source,
        rows = table.height(),
        columns = table.width(),
        header_levels = grid.depth(),
        "read source table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_decode_cp949() {
        let (bytes, _, _) = encoding_rs::EUC_KR.encode("시점,동수");
        let text = decode_text(&bytes, "cp949", Path::new("x.csv")).unwrap();
        assert_eq!(text, "시점,동수");
    }

    #[test]
    fn test_code_page_aliases() {
        for label in ["cp949", "CP949", " ms949 ", "uhc", "euc-kr", "windows-949"] {
            assert_eq!(resolve_encoding(label), Some(encoding_rs::EUC_KR), "{label}");
        }
        assert_eq!(resolve_encoding("utf-8"), Some(encoding_rs::UTF_8));
        assert_eq!(resolve_encoding("cp9490"), None);
    }

    #[test]
    fn test_decode_unknown_label() {
        let err = decode_text(b"a", "klingon", Path::new("x.csv")).unwrap_err();
        assert!(matches!(err, IngestError::UnknownEncoding { .. }));
    }

    #[test]
    fn test_read_single_header() {
        let file = create_temp_csv("시점,주거용,상업용\n2020.01,1,2\n2020.02,,4\n".as_bytes());
        let schema = SourceSchema::new(file.path(), 0);
        let table = read_source(&schema, Path::new(".")).unwrap();

        assert_eq!(table.height(), 2);
        assert_eq!(table.column_depth(), 1);
        assert!(table.index_names.is_empty());
        let commercial = table.column(&["상업용"]).unwrap();
        assert_eq!(commercial.cells, vec![Some("2".to_string()), Some("4".to_string())]);
        let residential = table.column(&["주거용"]).unwrap();
        assert_eq!(residential.cells[1], None);
    }

    #[test]
    fn test_skip_rows_apply_before_header() {
        let file = create_temp_csv(b"period,a\nunit,x\nnote,y\n2020-01,1\n");
        let schema = SourceSchema::new(file.path(), 0).with_skip_rows(vec![1, 2]);
        let table = read_source(&schema, Path::new(".")).unwrap();
        assert_eq!(table.height(), 1);
        assert_eq!(table.columns[0].key, vec!["a"]);
    }

    #[test]
    fn test_invalid_date_reports_line() {
        let file = create_temp_csv(b"period,a\n2020-01,1\nTotal,3\n");
        let schema = SourceSchema::new(file.path(), 0);
        let err = read_source(&schema, Path::new(".")).unwrap_err();
        match err {
            IngestError::InvalidDate { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "Total");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let schema = SourceSchema::new("/nonexistent/permits.csv", 0);
        let err = read_source(&schema, Path::new(".")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }
}
