//! Library half of the `permits` command line tool.

pub mod config;
pub mod driver;
pub mod logging;
