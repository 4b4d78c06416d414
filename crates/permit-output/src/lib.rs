//! Output generation for seasonal adjustment runs.
//!
//! Every CSV is UTF-8 with a byte-order mark and starts with a `period`
//! column, so spreadsheet tools open the Korean labels correctly.

pub mod aggregate;
pub mod common;
pub mod decomposition;
pub mod error;
pub mod frame;
pub mod report;

pub use aggregate::{aggregate_artifacts, find_artifacts, load_order_list, read_component_artifact};
pub use common::{OutputLayout, PERIOD_COLUMN, ensure_parent_dir, file_stem};
pub use decomposition::{
    decomposition_frame, read_decomposition_csv, write_component_tables, write_decomposition_csv,
};
pub use error::{OutputError, Result};
pub use frame::{ComponentFrame, reorder_columns, write_csv_with_bom};
pub use report::{
    FailureRecord, ModelRecord, RunSummary, format_error_chain, read_run_summary,
    write_failure_trace, write_run_summary,
};
