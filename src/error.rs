use thiserror::Error;

/// Convenience result type used across the crate.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Error type returned by loading, filtering, summarizing and projecting.
///
/// Every error is scoped to the single operation that raised it: a failed load produces no
/// dataset, a rejected predicate leaves the previous view untouched, and an unsupported column
/// is skipped while the remaining columns are still computed.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input is structurally invalid (no columns, ragged rows, duplicate headers).
    #[error("malformed input: {message}")]
    MalformedInput { message: String },

    /// A filter predicate does not fit the column it targets.
    #[error("incompatible predicate on column '{column}': {message}")]
    IncompatiblePredicate { column: String, message: String },

    /// A summary or chart was requested on a column that cannot support it.
    #[error("unsupported column '{column}': {message}")]
    UnsupportedColumn { column: String, message: String },
}

impl ExplorerError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    pub(crate) fn incompatible(column: &str, message: impl Into<String>) -> Self {
        Self::IncompatiblePredicate {
            column: column.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(column: &str, message: impl Into<String>) -> Self {
        Self::UnsupportedColumn {
            column: column.to_owned(),
            message: message.into(),
        }
    }
}
