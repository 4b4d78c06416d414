//! Error types for source reading.

use std::path::PathBuf;

use permit_model::SchemaMismatch;
use thiserror::Error;

/// Errors that can occur while reading source files.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Source file not found.
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Encoding Errors ===
    /// The declared encoding label is not a known encoding.
    #[error("unknown encoding '{label}' for {path}")]
    UnknownEncoding { path: PathBuf, label: String },

    /// The file contains byte sequences invalid in the declared encoding.
    #[error("{path} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Parsing Errors ===
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// No rows left after skipping.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// The declared schema cannot describe the file.
    #[error("invalid schema for {path}: {reason}")]
    InvalidSchema { path: PathBuf, reason: String },

    /// A data column has no label at a header level.
    #[error("blank header in {path}: column {column}, level {level}")]
    BlankHeader {
        path: PathBuf,
        column: usize,
        level: usize,
    },

    /// A period token did not match the date rule.
    #[error("invalid period '{value}' in {path} at line {line}")]
    InvalidDate {
        path: PathBuf,
        line: u64,
        value: String,
    },

    // === Structure Errors ===
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),

    /// Tables to concatenate disagree on row-index depth.
    #[error("cannot concatenate {source_name}: {found} index levels, expected {expected}")]
    IndexShape {
        source_name: String,
        expected: usize,
        found: usize,
    },

    /// Nothing to concatenate.
    #[error("no source tables to concatenate")]
    NoSources,
}

impl IngestError {
    pub(crate) fn file(path: &std::path::Path, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
