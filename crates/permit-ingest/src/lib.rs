//! Source readers for building-permit statistics.
//!
//! Statistical portals export CSV files with regional encodings, several
//! header rows, decorative preamble lines and locale-specific period tokens.
//! Every one of those traits is declared per file in a [`SourceSchema`];
//! nothing is guessed globally.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use permit_ingest::{SourceSchema, concat_tables, read_source};
//!
//! let schemas: Vec<SourceSchema> = load_from_config()?;
//! let tables = schemas
//!     .iter()
//!     .map(|schema| read_source(schema, Path::new("data")))
//!     .collect::<Result<Vec<_>, _>>()?;
//! let table = concat_tables(tables)?;
//! ```

mod concat;
mod date;
mod error;
mod schema;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === Schema ===
pub use schema::{MAX_HEADER_LEVELS, SourceSchema};

// === Reading ===
pub use source::{decode_text, read_source, resolve_encoding};

// === Dates ===
pub use date::{DateFormat, parse_period};

// === Concatenation ===
pub use concat::concat_tables;
