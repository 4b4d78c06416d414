//! Error types for output generation.

use std::path::{Path, PathBuf};

use permit_x13::X13Error;
use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    /// A component artifact could not be read or parsed.
    #[error(transparent)]
    Artifact(#[from] X13Error),

    #[error("{path}: unrecognized period '{token}'")]
    Period { path: PathBuf, token: String },

    #[error("{path}: period '{token}' appears more than once")]
    DuplicatePeriod { path: PathBuf, token: String },

    #[error("{path}: missing column '{name}'")]
    MissingColumn { path: PathBuf, name: String },

    #[error("duplicate column '{name}' in component table")]
    DuplicateColumn { name: String },

    #[error("run summary is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl OutputError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
