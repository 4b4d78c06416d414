//! Step executor functions.
//!
//! Each function corresponds to a [`Step`] variant and reshapes a [`Frame`]
//! in place. Cells stay text until the table is finalized, so a step never
//! fails on a non-numeric column it is about to discard.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use permit_model::{ColumnKey, RawColumn, RowKey, SchemaMismatch};
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::frame::Frame;
use crate::recipe::Step;

/// Cell texts that mean "no observation".
pub(crate) const MISSING_MARKERS: [&str; 5] = ["-", "…", "x", "X", ""];

/// Whether a raw cell holds no observation.
pub(crate) fn is_missing(cell: Option<&str>) -> bool {
    cell.is_none_or(|text| MISSING_MARKERS.contains(&text.trim()))
}

/// Parses a raw cell, dropping thousands separators.
///
/// Returns `Ok(None)` for missing markers and `Err(())` for anything else
/// that is not a number.
pub(crate) fn parse_number(cell: Option<&str>) -> std::result::Result<Option<f64>, ()> {
    if is_missing(cell) {
        return Ok(None);
    }
    let text: String = cell
        .unwrap_or_default()
        .trim()
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    text.parse::<f64>().map(Some).map_err(|_| ())
}

/// Runs one step against `frame`.
pub fn apply_step(frame: &mut Frame, step: &Step) -> Result<()> {
    match step {
        Step::DropIndexLevel { level } => drop_index_level(frame, *level),
        Step::DropColumnLevel { level } => drop_column_level(frame, *level),
        Step::RenameValues { level, mapping } => rename_values(frame, *level, mapping),
        Step::SelectColumn { label, rename } => select_column(frame, label, rename),
        Step::SliceColumns { start, end } => slice_columns(frame, *start, *end),
        Step::Pivot { levels } => pivot(frame, levels),
        Step::MergeRenamed { old, new } => merge_renamed(frame, old, new),
        Step::NameLevels { names } => name_levels(frame, names),
    }?;
    debug!(
        step = step.display_name(),
        rows = frame.height(),
        columns = frame.width(),
        "applied step"
    );
    Ok(())
}

pub fn drop_index_level(frame: &mut Frame, level: usize) -> Result<()> {
    let depth = frame.index_names.len();
    if level >= depth {
        return Err(TransformError::LevelOutOfRange {
            axis: "index",
            level,
            depth,
        });
    }
    frame.index_names.remove(level);
    for row in &mut frame.rows {
        row.labels.remove(level);
    }
    Ok(())
}

pub fn drop_column_level(frame: &mut Frame, level: usize) -> Result<()> {
    let depth = frame.column_depth();
    if level >= depth {
        return Err(TransformError::LevelOutOfRange {
            axis: "column",
            level,
            depth,
        });
    }
    if depth == 1 {
        return Err(TransformError::LastColumnLevel);
    }
    for column in &mut frame.columns {
        column.key.remove(level);
    }
    if level < frame.level_names.len() {
        frame.level_names.remove(level);
    }
    ensure_unique_columns(frame)
}

/// Renames every label at column `level` through `mapping`.
pub fn rename_values(
    frame: &mut Frame,
    level: usize,
    mapping: &BTreeMap<String, String>,
) -> Result<()> {
    let depth = frame.column_depth();
    if level >= depth {
        return Err(TransformError::LevelOutOfRange {
            axis: "column",
            level,
            depth,
        });
    }
    SchemaMismatch::check(
        &format!("{} column level {level}", frame.source),
        mapping.keys(),
        frame.labels_at(level),
    )?;
    for column in &mut frame.columns {
        if let Some(renamed) = mapping.get(&column.key[level]) {
            column.key[level].clone_from(renamed);
        }
    }
    ensure_unique_columns(frame)
}

pub fn select_column(frame: &mut Frame, label: &str, rename: &str) -> Result<()> {
    let matches: Vec<usize> = frame
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.key.last().is_some_and(|last| last == label))
        .map(|(idx, _)| idx)
        .collect();
    let position = match matches.as_slice() {
        [position] => *position,
        [] => {
            return Err(TransformError::ColumnNotFound {
                key: vec![label.to_string()],
            });
        }
        _ => {
            return Err(TransformError::AmbiguousColumn {
                label: label.to_string(),
                count: matches.len(),
            });
        }
    };
    let mut column = frame.columns.swap_remove(position);
    column.key = vec![rename.to_string()];
    frame.columns = vec![column];
    frame.level_names.clear();
    Ok(())
}

pub fn slice_columns(frame: &mut Frame, start: usize, end: Option<usize>) -> Result<()> {
    let width = frame.width();
    let end = end.unwrap_or(width);
    if start > end || end > width {
        return Err(TransformError::SliceOutOfRange { start, end, width });
    }
    frame.columns.truncate(end);
    frame.columns = frame.columns.split_off(start);
    Ok(())
}

/// Moves row label `levels` into the column key.
///
/// Each original column fans out into one column per category combination,
/// combinations in first-appearance order, with the pivoted labels appended
/// to the key. The remaining rows are sorted by label then period.
pub fn pivot(frame: &mut Frame, levels: &[usize]) -> Result<()> {
    let depth = frame.index_names.len();
    if let Some(&level) = levels.iter().find(|&&level| level >= depth) {
        return Err(TransformError::LevelOutOfRange {
            axis: "index",
            level,
            depth,
        });
    }
    let pivoted: BTreeSet<usize> = levels.iter().copied().collect();

    let split = |row: &RowKey| -> (Vec<String>, RowKey) {
        let category = levels.iter().map(|&level| row.labels[level].clone()).collect();
        let remaining = row
            .labels
            .iter()
            .enumerate()
            .filter(|(level, _)| !pivoted.contains(level))
            .map(|(_, label)| label.clone())
            .collect();
        (category, RowKey::new(remaining, row.period))
    };

    let mut categories: Vec<Vec<String>> = Vec::new();
    let mut placements = Vec::with_capacity(frame.height());
    let mut remaining_rows = BTreeSet::new();
    for row in &frame.rows {
        let (category, remaining) = split(row);
        let category_idx = match categories.iter().position(|known| *known == category) {
            Some(idx) => idx,
            None => {
                categories.push(category);
                categories.len() - 1
            }
        };
        remaining_rows.insert(remaining.clone());
        placements.push((category_idx, remaining));
    }

    let rows: Vec<RowKey> = remaining_rows.into_iter().collect();
    let row_positions: HashMap<&RowKey, usize> =
        rows.iter().enumerate().map(|(idx, row)| (row, idx)).collect();

    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(placements.len());
    for (source_row, (category_idx, remaining)) in placements.iter().enumerate() {
        let row_idx = row_positions[remaining];
        if !seen.insert((row_idx, *category_idx)) {
            let original = &frame.rows[source_row];
            return Err(TransformError::DuplicateRow {
                labels: original.labels.clone(),
                period: original.period,
            });
        }
        targets.push((row_idx, *category_idx));
    }

    let mut columns = Vec::with_capacity(frame.width() * categories.len());
    for column in &frame.columns {
        let mut fanned: Vec<RawColumn> = categories
            .iter()
            .map(|category| RawColumn {
                key: column.key.iter().chain(category).cloned().collect(),
                cells: vec![None; rows.len()],
            })
            .collect();
        for (cell, &(row_idx, category_idx)) in column.cells.iter().zip(&targets) {
            fanned[category_idx].cells[row_idx].clone_from(cell);
        }
        columns.extend(fanned);
    }

    if !frame.level_names.is_empty() {
        frame
            .level_names
            .extend(levels.iter().map(|&level| frame.index_names[level].clone()));
    }
    frame.index_names = frame
        .index_names
        .iter()
        .enumerate()
        .filter(|(level, _)| !pivoted.contains(level))
        .map(|(_, name)| name.clone())
        .collect();
    frame.rows = rows;
    frame.columns = columns;
    ensure_unique_columns(frame)
}

/// Folds the column keyed `old` into the column keyed `new`.
///
/// Where both hold an observation the new one wins; the old column is
/// dropped. When only the old column exists it is re-keyed as new.
pub fn merge_renamed(frame: &mut Frame, old: &ColumnKey, new: &ColumnKey) -> Result<()> {
    let old_pos = frame.position(old);
    let new_pos = frame.position(new);
    match (old_pos, new_pos) {
        (Some(old_pos), Some(new_pos)) => {
            let old_cells = std::mem::take(&mut frame.columns[old_pos].cells);
            let target = &mut frame.columns[new_pos].cells;
            for (cell, old_cell) in target.iter_mut().zip(old_cells) {
                if is_missing(cell.as_deref()) && !is_missing(old_cell.as_deref()) {
                    *cell = old_cell;
                }
            }
            frame.columns.remove(old_pos);
        }
        (Some(old_pos), None) => frame.columns[old_pos].key.clone_from(new),
        (None, Some(_)) => {}
        (None, None) => return Err(TransformError::ColumnNotFound { key: old.clone() }),
    }
    Ok(())
}

pub fn name_levels(frame: &mut Frame, names: &[String]) -> Result<()> {
    let depth = frame.column_depth();
    if names.len() != depth {
        return Err(TransformError::LevelNames {
            expected: depth,
            found: names.len(),
        });
    }
    frame.level_names = names.to_vec();
    Ok(())
}

/// Joins group frames column-wise on the full row key.
///
/// Rows are the union of all groups in first-appearance order; a group
/// without a row contributes empty cells. Column keys must be distinct
/// across groups.
pub fn join_groups(frames: Vec<Frame>) -> Result<Option<Frame>> {
    let mut frames = frames.into_iter();
    let Some(mut joined) = frames.next() else {
        return Ok(None);
    };
    ensure_unique_rows(&joined)?;

    for frame in frames {
        if frame.index_names.len() != joined.index_names.len() {
            return Err(TransformError::GroupShape {
                expected: joined.index_names.len(),
                found: frame.index_names.len(),
            });
        }
        ensure_unique_rows(&frame)?;
        if let Some(column) = frame
            .columns
            .iter()
            .find(|column| joined.position(&column.key).is_some())
        {
            return Err(TransformError::ColumnCollision {
                key: column.key.clone(),
            });
        }

        let mut positions: HashMap<RowKey, usize> = joined
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| (row.clone(), idx))
            .collect();
        let mut targets = Vec::with_capacity(frame.height());
        for row in &frame.rows {
            let idx = *positions.entry(row.clone()).or_insert_with(|| {
                joined.rows.push(row.clone());
                joined.rows.len() - 1
            });
            targets.push(idx);
        }

        let height = joined.height();
        for column in &mut joined.columns {
            column.cells.resize(height, None);
        }
        for column in frame.columns {
            let mut cells = vec![None; height];
            for (cell, &idx) in column.cells.into_iter().zip(&targets) {
                cells[idx] = cell;
            }
            joined.columns.push(RawColumn {
                key: column.key,
                cells,
            });
        }
        if joined.level_names.is_empty() {
            joined.level_names = frame.level_names;
        }
        joined.source = format!("{} | {}", joined.source, frame.source);
    }
    Ok(Some(joined))
}

fn ensure_unique_rows(frame: &Frame) -> Result<()> {
    let mut seen = HashSet::new();
    match frame.rows.iter().find(|row| !seen.insert(*row)) {
        Some(row) => Err(TransformError::DuplicateRow {
            labels: row.labels.clone(),
            period: row.period,
        }),
        None => Ok(()),
    }
}

fn ensure_unique_columns(frame: &Frame) -> Result<()> {
    match frame.duplicate_key() {
        Some(key) => Err(TransformError::DuplicateColumn { key: key.clone() }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ym(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn key(labels: &[&str]) -> ColumnKey {
        labels.iter().map(|label| label.to_string()).collect()
    }

    fn cells(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|value| value.map(str::to_string)).collect()
    }

    fn col(labels: &[&str], cells: Vec<Option<String>>) -> RawColumn {
        RawColumn {
            key: key(labels),
            cells,
        }
    }

    fn frame(rows: Vec<RowKey>, columns: Vec<RawColumn>) -> Frame {
        Frame {
            source: "test".to_string(),
            index_names: rows
                .first()
                .map(|row| (0..row.labels.len()).map(|i| format!("level_{i}")).collect())
                .unwrap_or_default(),
            rows,
            columns,
            level_names: Vec::new(),
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("1,234.5")), Ok(Some(1234.5)));
        assert_eq!(parse_number(Some(" 7 ")), Ok(Some(7.0)));
        assert_eq!(parse_number(Some("-")), Ok(None));
        assert_eq!(parse_number(Some("…")), Ok(None));
        assert_eq!(parse_number(Some("X")), Ok(None));
        assert_eq!(parse_number(None), Ok(None));
        assert_eq!(parse_number(Some("n/a")), Err(()));
        assert_eq!(parse_number(Some("-3")), Ok(Some(-3.0)));
    }

    #[test]
    fn test_merge_renamed_prefers_new_values() {
        let rows = vec![RowKey::period_only(ym(2020, 1)), RowKey::period_only(ym(2020, 2))];
        let mut frame = frame(
            rows,
            vec![
                col(&["동수", "교육사회용"], cells(&[Some("5"), None])),
                col(&["동수", "교육및사회용"], cells(&[None, Some("7")])),
            ],
        );
        merge_renamed(&mut frame, &key(&["동수", "교육사회용"]), &key(&["동수", "교육및사회용"]))
            .unwrap();

        assert_eq!(frame.width(), 1);
        assert_eq!(frame.columns[0].key, key(&["동수", "교육및사회용"]));
        assert_eq!(frame.columns[0].cells, cells(&[Some("5"), Some("7")]));
    }

    #[test]
    fn test_merge_renamed_rekeys_lone_old_column() {
        let mut frame = frame(
            vec![RowKey::period_only(ym(2020, 1))],
            vec![col(&["동수", "old"], cells(&[Some("1")]))],
        );
        merge_renamed(&mut frame, &key(&["동수", "old"]), &key(&["동수", "new"])).unwrap();
        assert_eq!(frame.columns[0].key, key(&["동수", "new"]));
    }

    #[test]
    fn test_rename_values_requires_exact_label_set() {
        let mut frame = frame(
            vec![RowKey::period_only(ym(2020, 1))],
            vec![
                col(&["동수별", "a"], cells(&[Some("1")])),
                col(&["연면적별", "a"], cells(&[Some("2")])),
                col(&["합계", "a"], cells(&[Some("3")])),
            ],
        );
        let mapping: BTreeMap<String, String> = [("동수별", "동수"), ("연면적별", "연면적")]
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect();
        let err = rename_values(&mut frame, 0, &mapping).unwrap_err();
        assert!(matches!(err, TransformError::SchemaMismatch(_)));
    }

    #[test]
    fn test_pivot_moves_row_labels_into_columns() {
        let rows = vec![
            RowKey::new(key(&["주거", "단독"]), ym(2020, 1)),
            RowKey::new(key(&["주거", "공동"]), ym(2020, 1)),
            RowKey::new(key(&["주거", "단독"]), ym(2020, 2)),
            RowKey::new(key(&["주거", "공동"]), ym(2020, 2)),
        ];
        let mut frame = frame(
            rows,
            vec![col(&["동수"], cells(&[Some("1"), Some("2"), Some("3"), Some("4")]))],
        );
        pivot(&mut frame, &[0, 1]).unwrap();

        assert!(frame.index_names.is_empty());
        assert_eq!(frame.rows, vec![RowKey::period_only(ym(2020, 1)), RowKey::period_only(ym(2020, 2))]);
        assert_eq!(frame.columns[0].key, key(&["동수", "주거", "단독"]));
        assert_eq!(frame.columns[0].cells, cells(&[Some("1"), Some("3")]));
        assert_eq!(frame.columns[1].key, key(&["동수", "주거", "공동"]));
        assert_eq!(frame.columns[1].cells, cells(&[Some("2"), Some("4")]));
    }

    #[test]
    fn test_pivot_rejects_duplicate_cells() {
        let rows = vec![
            RowKey::new(key(&["a"]), ym(2020, 1)),
            RowKey::new(key(&["a"]), ym(2020, 1)),
        ];
        let mut frame = frame(rows, vec![col(&["동수"], cells(&[Some("1"), Some("2")]))]);
        assert!(matches!(
            pivot(&mut frame, &[0]),
            Err(TransformError::DuplicateRow { .. })
        ));
    }

    #[test]
    fn test_slice_and_select() {
        let rows = vec![RowKey::period_only(ym(2020, 1))];
        let mut sliced = frame(
            rows.clone(),
            vec![
                col(&["a"], cells(&[Some("1")])),
                col(&["b"], cells(&[Some("2")])),
                col(&["c"], cells(&[Some("3")])),
            ],
        );
        slice_columns(&mut sliced, 1, None).unwrap();
        assert_eq!(sliced.columns[0].key, key(&["b"]));
        assert!(slice_columns(&mut sliced, 1, Some(5)).is_err());

        let mut selected = frame(
            rows,
            vec![col(&["시도", "text"], cells(&[Some("서울")])), col(&["계", "계"], cells(&[Some("9")]))],
        );
        select_column(&mut selected, "계", "동수").unwrap();
        assert_eq!(selected.columns.len(), 1);
        assert_eq!(selected.columns[0].key, key(&["동수"]));
    }

    #[test]
    fn test_join_groups_aligns_rows() {
        let first = frame(
            vec![RowKey::period_only(ym(2020, 1)), RowKey::period_only(ym(2020, 2))],
            vec![col(&["동수"], cells(&[Some("1"), Some("2")]))],
        );
        let second = frame(
            vec![RowKey::period_only(ym(2020, 2)), RowKey::period_only(ym(2020, 3))],
            vec![col(&["연면적"], cells(&[Some("20"), Some("30")]))],
        );
        let joined = join_groups(vec![first, second]).unwrap().unwrap();
        assert_eq!(joined.height(), 3);
        assert_eq!(joined.columns[0].cells, cells(&[Some("1"), Some("2"), None]));
        assert_eq!(joined.columns[1].cells, cells(&[None, Some("20"), Some("30")]));

        let clash = frame(
            vec![RowKey::period_only(ym(2020, 1))],
            vec![col(&["동수"], cells(&[Some("1")]))],
        );
        let again = clash.clone();
        assert!(matches!(
            join_groups(vec![clash, again]),
            Err(TransformError::ColumnCollision { .. })
        ));
    }
}
