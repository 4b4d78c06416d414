//! Error types for engine orchestration.

use std::path::PathBuf;
use std::time::Duration;

use permit_model::Component;
use thiserror::Error;

/// Errors raised while adjusting one series.
#[derive(Debug, Error)]
pub enum X13Error {
    /// Every observation of the series is missing.
    #[error("series {name} has no observations")]
    EmptySeries { name: String },

    #[error("series {name} is neither monthly nor quarterly with regular spacing")]
    IrregularIndex { name: String },

    /// The engine wrote diagnostics to its error file. The text is the
    /// engine's own, unmodified.
    #[error("engine reported errors:\n{0}")]
    Engine(String),

    /// The engine failed without writing diagnostics.
    #[error("engine exited with {status}: {stderr}")]
    EngineExit { status: String, stderr: String },

    #[error("failed to start engine {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("engine did not finish within {0:?}")]
    Timeout(Duration),

    #[error("engine artifact not found: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("malformed engine artifact {path} at line {line}: {message}")]
    MalformedArtifact {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A component table does not line up with the submitted observations.
    #[error("{component} output is misaligned: {detail}")]
    Misaligned {
        component: Component,
        detail: String,
    },

    #[error("engine log has no final automatic model choice")]
    ModelNotFound,

    #[error("cannot parse model notation '{0}'")]
    ModelNotation(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl X13Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the engine itself rejected the series, as opposed to a
    /// failure of the surrounding machinery.
    pub fn is_engine_diagnostic(&self) -> bool {
        matches!(self, Self::Engine(_))
    }
}

/// Result type for engine orchestration.
pub type Result<T> = std::result::Result<T, X13Error>;
