//! Seasonal adjustment through the X-13ARIMA-SEATS engine.
//!
//! One call to [`Adjuster::adjust`] turns a [`NamedSeries`] into a
//! [`Decomposition`]:
//!
//! 1. [`preprocess`] trims the series and fills interior gaps
//! 2. [`build_spec`] renders the engine's control file
//! 3. the engine runs in a private temporary directory
//! 4. component tables and the model choice are parsed back
//!
//! [`NamedSeries`]: permit_model::NamedSeries
//! [`Decomposition`]: permit_model::Decomposition

mod config;
mod engine;
mod error;
mod model;
mod output;
mod preprocess;
mod romanize;
mod runner;
mod spec;

pub use config::{AdjustmentOptions, Differencing, EngineConfig, LogTransform, Regressors};
pub use engine::{Adjuster, X13Engine};
pub use error::{Result, X13Error};
pub use model::{MeanPhrases, parse_model_choice, parse_model_choice_with, parse_order_notation};
pub use output::{
    ArtifactRow, COMPONENT_HEADER_LINES, engine_diagnostics, parse_component_table,
    read_artifact, read_component, read_optional_artifact,
};
pub use preprocess::{SeriesInput, preprocess};
pub use romanize::{MAX_IDENTIFIER_LEN, ascii_identifier, romanize_syllable};
pub use runner::SPEC_STEM;
pub use spec::{SAVED_TABLES, build_spec};
