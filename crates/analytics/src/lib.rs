//! # ACV Dashboard Analytics
//!
//! The calculation layer of the dashboard. It turns flat sales records into
//! per-quarter category totals and renders numbers for display.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate with no I/O. It depends only on
//!   `core-types` (Layer 0).
//! - **Stateless Calculation:** `Aggregator` and `format_number` hold no state between
//!   calls; the same input always yields the same output.
//!
//! ## Public API
//!
//! - `Aggregator` / `CategoryPolicy`: groups records by quarter, binary or open categories.
//! - `order_quarters`: sorts the aggregator's output chronologically.
//! - `format_number`: compact K/M/B labels and subscript-zero fractions.
//! - `ChartView` / `SummaryTable`: chart and table view models built from the totals.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

pub mod aggregate;
pub mod chart;
pub mod error;
pub mod format;
pub mod quarters;
pub mod table;

// Re-export the key components to create a clean, public-facing API.
pub use aggregate::{Aggregator, CategoryPolicy, CategorySelector, GroupedTotals, aggregate_chart};
pub use chart::{BarSegment, ChartView, Donut, DonutSlice, StackedBar, build_chart};
pub use error::AnalyticsError;
pub use format::{INVALID_INPUT, NumericInput, format_number};
pub use quarters::{compare_quarter_labels, order_quarters};
pub use table::{SummaryTable, TableCell, TableRow, TotalsRow};
