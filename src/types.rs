//! Core data model types.
//!
//! A loaded CSV becomes an in-memory [`DataSet`]: a [`Schema`] of typed [`Field`]s (the column
//! kinds inferred at load time) plus row-major [`Value`] storage.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Logical data type (column kind) for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Date or date-time without a timezone.
    DateTime,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

impl DataType {
    /// `true` for `Int64` and `Float64`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }

    /// `true` for `DateTime`.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::DateTime)
    }

    /// Whether values of this kind have a meaningful ordering for range filters.
    pub fn is_ordered(self) -> bool {
        self.is_numeric() || self.is_temporal()
    }

    /// Short lowercase name, as shown in a column overview.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "utf8",
            Self::DateTime => "datetime",
        }
    }

    /// Parse a single non-missing token as this type.
    ///
    /// `raw` is expected to be trimmed already. Returns `None` if the token is not a valid
    /// literal of this type; numeric tokens are never read as booleans.
    pub fn parse_literal(self, raw: &str) -> Option<Value> {
        match self {
            Self::Utf8 => Some(Value::Utf8(raw.to_owned())),
            Self::Int64 => raw.parse::<i64>().ok().map(Value::Int64),
            Self::Float64 => parse_float(raw).map(Value::Float64),
            Self::Bool => parse_bool(raw).map(Value::Bool),
            Self::DateTime => parse_datetime(raw).map(Value::DateTime),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    // `f64::from_str` accepts "inf"/"nan"; keep those textual.
    let v = raw.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    // Cheap reject before trying every format.
    if !raw.starts_with(|c: char| c.is_ascii_digit()) || raw.len() < 8 {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc())
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the index and field for `name`, if present.
    pub fn field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// A single typed cell value.
///
/// Serializes untagged: `Null` as `null`, numbers as JSON numbers, date-times as ISO strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Date-time without timezone. Plain dates are stored at midnight.
    DateTime(NaiveDateTime),
}

impl Value {
    /// `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of `Int64`/`Float64` values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// The data type of a non-null value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int64(_) => Some(DataType::Int64),
            Self::Float64(_) => Some(DataType::Float64),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Utf8(_) => Some(DataType::Utf8),
            Self::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Whether this value may live in a column of type `data_type`.
    ///
    /// `Null` fits every column. `Int64` values fit `Float64` columns.
    pub fn fits(&self, data_type: DataType) -> bool {
        match self.data_type() {
            None => true,
            Some(DataType::Int64) => data_type.is_numeric(),
            Some(t) => t == data_type,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(s) => f.write_str(s),
            Self::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.date())
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f"))
                }
            }
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields. Nothing in
/// this crate mutates a dataset after it is built; views and summaries are fresh values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the dataset.
    pub fn column_count(&self) -> usize {
        self.schema.len()
    }

    /// Iterate the values of column `idx` in row order.
    ///
    /// Rows shorter than `idx` yield [`Value::Null`].
    pub fn column_values(&self, idx: usize) -> impl Iterator<Item = &Value> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).unwrap_or(&Value::Null))
    }
}
