//! Error types for normalization.

use chrono::NaiveDate;
use permit_ingest::IngestError;
use permit_model::{SchemaMismatch, TableError};
use thiserror::Error;

/// Errors raised while turning raw tables into canonical tables.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A label set differs from the vocabulary a step or table requires.
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("domain {domain} has no source groups")]
    NoGroups { domain: String },

    #[error("{axis} level {level} is out of range for depth {depth}")]
    LevelOutOfRange {
        axis: &'static str,
        level: usize,
        depth: usize,
    },

    #[error("cannot drop the only column level")]
    LastColumnLevel,

    #[error("column {key:?} not found")]
    ColumnNotFound { key: Vec<String> },

    #[error("label '{label}' matches {count} columns, expected exactly one")]
    AmbiguousColumn { label: String, count: usize },

    #[error("column slice {start}..{end} is out of range for {width} columns")]
    SliceOutOfRange {
        start: usize,
        end: usize,
        width: usize,
    },

    #[error("duplicate column {key:?}")]
    DuplicateColumn { key: Vec<String> },

    #[error("duplicate row {labels:?} at {period}")]
    DuplicateRow {
        labels: Vec<String>,
        period: NaiveDate,
    },

    /// The same column key comes from more than one source group.
    #[error("column {key:?} is produced by more than one source group")]
    ColumnCollision { key: Vec<String> },

    #[error("source groups disagree on row index depth: {expected} vs {found}")]
    GroupShape { expected: usize, found: usize },

    #[error("expected {expected} level names, got {found}")]
    LevelNames { expected: usize, found: usize },

    #[error("outermost column level must be named 'value', found '{found}'")]
    ValueLevel { found: String },

    #[error("row index levels {names:?} were never dropped or pivoted")]
    UnresolvedIndexLevels { names: Vec<String> },

    #[error("cell '{value}' in column {key:?} at {period} is not numeric")]
    NotNumeric {
        key: Vec<String>,
        period: NaiveDate,
        value: String,
    },
}

/// Result type for normalization.
pub type Result<T> = std::result::Result<T, TransformError>;
