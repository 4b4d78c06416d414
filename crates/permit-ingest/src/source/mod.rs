//! Source file reading.

mod header;
mod reader;

pub use reader::{decode_text, read_source, resolve_encoding};
