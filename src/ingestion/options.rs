use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::observability::{LoadObserver, LoadSeverity};

/// How raw CSV text is split and which cells count as missing.
///
/// Plain data, so a host application can read it from its own JSON config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvDialect {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Trim surrounding whitespace from headers and cells.
    pub trim: bool,
    /// Cell tokens (after trimming) treated as missing values, in addition to blank cells.
    pub null_tokens: Vec<String>,
}

impl Default for CsvDialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: true,
            null_tokens: ["NA", "N/A", "NaN", "nan", "null", "NULL", "None"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Options controlling [`super::load_from_path`] / [`super::load_from_bytes`].
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    /// CSV dialect.
    pub dialect: CsvDialect,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("dialect", &self.dialect)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            dialect: CsvDialect::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CsvDialect;

    #[test]
    fn dialect_reads_partial_json() {
        let d: CsvDialect = serde_json::from_str(r#"{"delimiter": 59}"#).unwrap();
        assert_eq!(d.delimiter, b';');
        assert!(d.trim);
        assert!(d.null_tokens.iter().any(|t| t == "NA"));
    }
}
