//! Loading entrypoints and implementations.
//!
//! Most callers should use [`load_from_path`] or [`load_from_bytes`] (from [`load`]) which:
//!
//! - parse CSV text (header row mandatory) into an in-memory [`crate::types::DataSet`]
//! - infer a [`crate::types::DataType`] per column
//! - optionally report success/failure/alerts to a [`LoadObserver`]
//!
//! Lower-level functions live in [`csv`] (CSV text) and [`infer`] (already-split raw rows).

pub mod csv;
pub mod infer;
pub mod load;
pub mod observability;
pub mod options;

pub use self::csv::{load_csv_from_bytes, load_csv_from_path, load_csv_from_reader};
pub use infer::{infer_data_type, load_rows};
pub use load::{load_from_bytes, load_from_path};
pub use observability::{
    CompositeObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, LogObserver,
};
pub use options::{CsvDialect, LoadOptions};
