//! Data model for building-permit statistics and their seasonal decompositions.
//!
//! Types flow forward through the workspace:
//!
//! - [`RawTable`]: one source file as read, hierarchical row and column keys
//! - [`CanonicalTable`]: one normalized domain table keyed by period
//! - [`NamedSeries`]: one column of a canonical table, ready for adjustment
//! - [`Decomposition`]: the parsed engine output for one series

pub mod decomposition;
pub mod error;
pub mod period;
pub mod series;
pub mod table;
pub mod value;

pub use decomposition::{ArimaModel, Component, Decomposition, OrderTriple};
pub use error::{SchemaMismatch, TableError};
pub use period::{Frequency, first_of_month, format_period, month_distance, parse_engine_period};
pub use series::{NamedSeries, TimeSeries};
pub use table::{CanonicalColumn, CanonicalTable, ColumnKey, RawColumn, RawTable, RowKey};
pub use value::{VALUE_LEVEL, ValueTag};
