//! Views, statistics and chart series derived from a loaded [`crate::types::DataSet`].
//!
//! Every function here is pure: it reads a dataset or [`ViewResult`] and returns a new value.
//!
//! - [`apply_filters()`]: conjunctive, order-preserving row filtering by [`Predicate`]s
//! - [`summarize()`]: describe-style statistics per column
//! - [`project()`]: group-by-x aggregation of y into a [`ChartSeries`]
//! - [`count_by()`], [`scatter()`], [`histogram()`]: other chart inputs
//! - [`profile()`]: per-column types, missing values and cardinality
//! - [`correlation()`]: Pearson correlation matrix over numeric columns
//!
//! ## Example: filter → summarize → project
//!
//! ```rust
//! use csv_explorer::ingestion::{load_csv_from_bytes, CsvDialect};
//! use csv_explorer::processing::{apply_filters, project, summarize, Aggregation, Predicate};
//! use csv_explorer::types::Value;
//!
//! let csv = b"category,amount,region\nA,10,north\nB,5,south\nA,3,north\nC,,south\n";
//! let ds = load_csv_from_bytes(csv, &CsvDialect::default()).unwrap();
//!
//! let view = apply_filters(&ds, &[Predicate::contains("region", "NORTH")]).unwrap();
//! assert_eq!(view.row_count(), 2);
//!
//! let stats = summarize(&view, &["amount"]);
//! assert!(stats.skipped.is_empty());
//!
//! let all = apply_filters(&ds, &[]).unwrap();
//! let series = project(&all, "category", "amount", Aggregation::Sum).unwrap();
//! assert_eq!(series.points[0].x, Value::Utf8("A".to_string()));
//! assert_eq!(series.points[0].y, 13.0);
//! ```

pub mod aggregate;
pub mod chart;
pub mod correlation;
pub mod filter;
mod group;
pub mod profile;
pub mod summary;
pub mod view;

pub use aggregate::Aggregation;
pub use chart::{
    count_by, histogram, project, scatter, ChartPoint, ChartSeries, Histogram, HistogramBin,
    ScatterSeries, DEFAULT_HISTOGRAM_BINS, MAX_HISTOGRAM_BINS,
};
pub use correlation::{correlation, CorrelationMatrix};
pub use filter::{apply_filters, Condition, Predicate};
pub use profile::{profile, ColumnProfile, DatasetProfile};
pub use summary::{
    summarize, summarize_all, summarize_column, CategoricalSummary, ColumnStats, ColumnSummary,
    NumericSummary, SkippedColumn, SummaryStats, TemporalSummary,
};
pub use view::ViewResult;
