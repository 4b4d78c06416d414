//! Normalization of building-permit tables.
//!
//! This crate turns raw source tables into canonical domain tables and
//! canonical tables into named series:
//!
//! - **recipe**: declarative per-domain [`DomainRecipe`]s and their [`Step`]s
//! - **executors**: one function per step, operating on a working [`Frame`]
//! - **normalize**: reading, joining and finalizing a domain
//! - **extract**: [`extract_series`] and the series naming rule

pub mod error;
pub mod executors;
pub mod extract;
pub mod frame;
pub mod normalize;
pub mod recipe;

pub use error::{Result, TransformError};
pub use extract::{NameCollision, extract_series, find_name_collisions, series_name};
pub use frame::Frame;
pub use normalize::{build_canonical, normalize_groups};
pub use recipe::{DomainRecipe, SourceGroup, Step};
