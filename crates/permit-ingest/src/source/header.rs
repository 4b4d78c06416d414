//! Hierarchical header assembly.

/// Normalizes a header cell: trims whitespace and BOM, collapses inner runs of whitespace.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Column labels for every header level, outermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderGrid {
    levels: Vec<Vec<String>>,
}

impl HeaderGrid {
    pub fn new<R: AsRef<[String]>>(rows: &[R]) -> Self {
        let width = rows.iter().map(|row| row.as_ref().len()).max().unwrap_or(0);
        let levels = rows
            .iter()
            .map(|row| {
                let row = row.as_ref();
                (0..width)
                    .map(|idx| row.get(idx).map(|cell| normalize_header(cell)).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { levels }
    }

    pub fn width(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Name of an index column: the innermost non-blank label above it.
    pub fn index_name(&self, column: usize) -> String {
        self.levels
            .iter()
            .rev()
            .filter_map(|level| level.get(column))
            .find(|label| !label.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("level_{column}"))
    }

    /// Builds keys for `columns`, forward-filling blank outer labels from the
    /// left as merged header cells are exported. Returns the offending
    /// `(column, level)` when a label stays blank.
    pub fn column_keys(&self, columns: &[usize]) -> Result<Vec<Vec<String>>, (usize, usize)> {
        let depth = self.depth();
        let mut keys: Vec<Vec<String>> = Vec::with_capacity(columns.len());
        for &column in columns {
            let mut key = Vec::with_capacity(depth);
            for (level, labels) in self.levels.iter().enumerate() {
                let label = labels.get(column).cloned().unwrap_or_default();
                if !label.is_empty() {
                    key.push(label);
                    continue;
                }
                let inherited = if level + 1 < depth {
                    keys.last().map(|previous| previous[level].clone())
                } else {
                    None
                };
                match inherited {
                    Some(label) => key.push(label),
                    None => return Err((column, level)),
                }
            }
            keys.push(key);
        }
        Ok(keys)
    }
}
