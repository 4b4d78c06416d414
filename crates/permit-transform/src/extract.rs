//! Series extraction and naming.

use std::collections::BTreeMap;

use permit_model::{CanonicalTable, ColumnKey, NamedSeries};

/// Builds the stable name of the series at `key` in `domain`.
///
/// The domain and every key level are joined with `_`, then each run of
/// characters that are not alphanumeric becomes a single `_`. Hangul counts
/// as alphanumeric and is kept.
pub fn series_name(domain: &str, key: &[String]) -> String {
    let joined = std::iter::once(domain)
        .chain(key.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("_");

    let mut name = String::with_capacity(joined.len());
    let mut in_run = false;
    for ch in joined.chars() {
        if ch.is_alphanumeric() {
            name.push(ch);
            in_run = false;
        } else if !in_run {
            name.push('_');
            in_run = true;
        }
    }
    name
}

/// Iterates the columns of `table` as named series, in column order.
///
/// Nothing is copied until an item is pulled; calling again starts over.
pub fn extract_series(table: &CanonicalTable) -> impl Iterator<Item = NamedSeries> + '_ {
    table.columns().iter().map(move |column| NamedSeries {
        name: series_name(table.domain(), &column.key),
        domain: table.domain().to_string(),
        key: column.key.clone(),
        index: table.index().to_vec(),
        values: column.values.clone(),
    })
}

/// Columns of different origin that map to the same series name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollision {
    pub name: String,
    /// `(domain, column key)` of every colliding column.
    pub origins: Vec<(String, ColumnKey)>,
}

/// Finds series names shared by distinct columns across `tables`.
pub fn find_name_collisions(tables: &[CanonicalTable]) -> Vec<NameCollision> {
    let mut origins: BTreeMap<String, Vec<(String, ColumnKey)>> = BTreeMap::new();
    for table in tables {
        for column in table.columns() {
            let origin = (table.domain().to_string(), column.key.clone());
            let entry = origins
                .entry(series_name(table.domain(), &column.key))
                .or_default();
            if !entry.contains(&origin) {
                entry.push(origin);
            }
        }
    }
    origins
        .into_iter()
        .filter(|(_, origins)| origins.len() > 1)
        .map(|(name, origins)| NameCollision { name, origins })
        .collect()
}
