//! Domain normalization: read, reshape, finalize.
//!
//! # Stages
//!
//! 1. **Read** every source of a group and concatenate them in file order
//! 2. **Group steps** reshape each group on its own
//! 3. **Join** the groups column-wise on the row key
//! 4. **Domain steps** run on the joined frame
//! 5. **Finalize** parses numbers and checks the canonical invariants

use std::path::Path;

use permit_ingest::{concat_tables, read_source};
use permit_model::{
    CanonicalColumn, CanonicalTable, RawTable, SchemaMismatch, VALUE_LEVEL, ValueTag,
};
use tracing::{debug, info, info_span};

use crate::error::{Result, TransformError};
use crate::executors::{apply_step, join_groups, parse_number};
use crate::frame::Frame;
use crate::recipe::DomainRecipe;

/// Reads every source of `recipe` and builds its canonical table.
///
/// Relative source paths are resolved against `base_dir`.
pub fn build_canonical(recipe: &DomainRecipe, base_dir: &Path) -> Result<CanonicalTable> {
    let _span = info_span!("domain", name = %recipe.name).entered();
    let mut groups = Vec::with_capacity(recipe.groups.len());
    for group in &recipe.groups {
        let tables = group
            .sources
            .iter()
            .map(|schema| read_source(schema, base_dir))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        groups.push(concat_tables(tables)?);
    }
    normalize_groups(recipe, groups)
}

/// Builds the canonical table from already-read groups, one concatenated
/// table per recipe group in recipe order.
pub fn normalize_groups(recipe: &DomainRecipe, groups: Vec<RawTable>) -> Result<CanonicalTable> {
    if groups.is_empty() {
        return Err(TransformError::NoGroups {
            domain: recipe.name.clone(),
        });
    }

    let mut frames = Vec::with_capacity(groups.len());
    for (table, group) in groups.into_iter().zip(&recipe.groups) {
        let mut frame = Frame::from(table);
        for step in &group.steps {
            apply_step(&mut frame, step)?;
        }
        frames.push(frame);
    }

    let Some(mut frame) = join_groups(frames)? else {
        return Err(TransformError::NoGroups {
            domain: recipe.name.clone(),
        });
    };
    for step in &recipe.steps {
        apply_step(&mut frame, step)?;
    }

    let table = finalize(recipe, frame)?;
    info!(
        domain = table.domain(),
        periods = table.height(),
        columns = table.width(),
        "normalized domain"
    );
    Ok(table)
}

fn finalize(recipe: &DomainRecipe, frame: Frame) -> Result<CanonicalTable> {
    if !frame.index_names.is_empty() {
        return Err(TransformError::UnresolvedIndexLevels {
            names: frame.index_names,
        });
    }

    let level_names = if frame.level_names.is_empty() {
        recipe.levels.clone()
    } else {
        frame.level_names
    };
    match level_names.first() {
        Some(first) if first == VALUE_LEVEL => {}
        other => {
            return Err(TransformError::ValueLevel {
                found: other.cloned().unwrap_or_default(),
            });
        }
    }

    SchemaMismatch::check(
        &recipe.name,
        ValueTag::labels(),
        frame.columns.iter().filter_map(|column| column.key.first()),
    )?;

    let index: Vec<_> = frame.rows.iter().map(|row| row.period).collect();
    let mut columns = Vec::with_capacity(frame.columns.len());
    for column in frame.columns {
        let values = column
            .cells
            .iter()
            .zip(&index)
            .map(|(cell, period)| {
                parse_number(cell.as_deref()).map_err(|()| TransformError::NotNumeric {
                    key: column.key.clone(),
                    period: *period,
                    value: cell.clone().unwrap_or_default(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        columns.push(CanonicalColumn {
            key: column.key,
            values,
        });
    }

    debug!(domain = %recipe.name, levels = ?level_names, "finalizing table");
    Ok(CanonicalTable::try_new(
        recipe.name.clone(),
        level_names,
        index,
        columns,
    )?)
}
