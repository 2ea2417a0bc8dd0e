//! # ACV Dashboard Data Source
//!
//! This crate is the dashboard's only source of records: one static JSON
//! fixture per chart type, read once at startup and held in memory.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** All file access lives here. Callers get typed
//!   `SalesRecord` slices and never see paths or JSON.
//! - **Read-only:** There is no write path; reloading means building a new repository.
//!
//! ## Public API
//!
//! - `FixtureRepository`: loads the fixtures and serves records per `ChartType`.
//! - `DatasetSummary`: record counts per dataset, for the `/api/datasets` listing.
//! - `DataSourceError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use error::DataSourceError;
pub use repository::{DatasetSummary, FixtureRepository};
