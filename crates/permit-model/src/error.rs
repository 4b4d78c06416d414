use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

/// Observed labels disagree with a fixed vocabulary.
///
/// Label sets are compared order-insensitively but with exact membership.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema mismatch in {context}: expected {expected:?}, found {found:?}")]
pub struct SchemaMismatch {
    pub context: String,
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

impl SchemaMismatch {
    /// Checks that `found` holds exactly the labels in `expected`.
    pub fn check<E, F, S, T>(context: &str, expected: E, found: F) -> Result<(), SchemaMismatch>
    where
        E: IntoIterator<Item = S>,
        F: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let expected: BTreeSet<String> = expected
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        let found: BTreeSet<String> = found
            .into_iter()
            .map(|label| label.as_ref().to_string())
            .collect();
        if expected == found {
            return Ok(());
        }
        Err(SchemaMismatch {
            context: context.to_string(),
            expected: expected.into_iter().collect(),
            found: found.into_iter().collect(),
        })
    }
}

/// Violations of the canonical table invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),

    #[error("column {position} has a blank label at level {level}")]
    BlankLabel { position: usize, level: usize },

    #[error("column {key:?} has {found} levels, table declares {expected}")]
    LevelCount {
        key: Vec<String>,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column {key:?}")]
    DuplicateColumn { key: Vec<String> },

    #[error("column {key:?} has {found} values, index has {expected}")]
    Length {
        key: Vec<String>,
        expected: usize,
        found: usize,
    },

    #[error("period index is not strictly increasing at {period}")]
    NonMonotonicIndex { period: NaiveDate },
}
