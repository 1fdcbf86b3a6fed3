//! `csv-explorer` is the engine behind an interactive CSV exploration app: upload a delimited
//! file, narrow it down with filters, look at summary statistics and chart the result.
//!
//! The crate has no UI. A presentation layer holds a [`Session`] per user and calls one method
//! per interaction; every result is a plain value that serializes with `serde`.
//!
//! ## What gets loaded
//!
//! CSV text with a mandatory header row. Each column gets one inferred [`types::DataType`]:
//!
//! - [`types::DataType::Bool`] (`true`/`false`, any case)
//! - [`types::DataType::Int64`]
//! - [`types::DataType::Float64`]
//! - [`types::DataType::DateTime`] (ISO dates, date-times and RFC 3339)
//! - [`types::DataType::Utf8`] (everything else)
//!
//! Empty cells and the dialect's null tokens (`NA`, `null`, ...) become [`types::Value::Null`].
//!
//! ## Quick example
//!
//! ```rust
//! use csv_explorer::ingestion::{load_from_bytes, LoadOptions};
//! use csv_explorer::processing::{Aggregation, Predicate};
//! use csv_explorer::types::Value;
//! use csv_explorer::Session;
//!
//! # fn main() -> Result<(), csv_explorer::ExplorerError> {
//! let csv = b"name,age,city\nAda,36,London\nGrace,45,New York\nAlan,41,London\n";
//! let ds = load_from_bytes(csv, "people.csv", &LoadOptions::default())?;
//!
//! let mut session = Session::new(ds);
//! session.add_filter(Predicate::greater_than("age", Value::Int64(40)))?;
//! assert_eq!(session.view().row_count(), 2);
//!
//! let series = session.chart("city", Some("age"), Aggregation::Mean)?;
//! assert_eq!(series.pairs().len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: CSV loading, type inference and load observability
//! - [`types`]: schema, value and dataset types
//! - [`processing`]: filtering, summary statistics, chart series, profiling, correlation
//! - [`execution`]: parallel filter/summary execution with throttling and metrics
//! - [`session`]: per-user state (dataset, active filters, current view)
//! - [`export`]: CSV and JSON output
//! - [`error`]: the crate error type

pub mod error;
pub mod execution;
pub mod export;
pub mod ingestion;
pub mod processing;
pub mod session;
pub mod types;

pub use error::{ExplorerError, ExplorerResult};
pub use session::Session;
