//! # ACV Dashboard Core Types
//!
//! Layer 0 of the workspace: the record shape shared by every other crate and
//! the chart-type selector that picks a dataset and its category field.
//! Nothing here performs I/O.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::ChartType;
pub use error::CoreError;
pub use structs::{SalesRecord, parse_decimal};
