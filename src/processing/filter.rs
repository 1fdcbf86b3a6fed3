//! Predicate-based row filtering for [`crate::types::DataSet`].

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::error::{ExplorerError, ExplorerResult};
use crate::types::{DataSet, DataType, Schema, Value};

use super::view::ViewResult;

/// Comparison applied to one column by a [`Predicate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum Condition {
    /// Cell equals the value. Numeric values compare across `Int64`/`Float64`.
    Equals(Value),
    /// Cell differs from the value. Missing cells match.
    NotEquals(Value),
    /// Text cell contains the substring, ignoring case.
    Contains(String),
    /// Text cell does not contain the substring, ignoring case. Missing cells match.
    NotContains(String),
    /// Cell is strictly greater than the value.
    GreaterThan(Value),
    /// Cell is greater than or equal to the value.
    GreaterOrEqual(Value),
    /// Cell is strictly less than the value.
    LessThan(Value),
    /// Cell is less than or equal to the value.
    LessOrEqual(Value),
    /// `low <= cell <= high`.
    InRange { low: Value, high: Value },
    /// Cell equals one of the values.
    OneOf(Vec<Value>),
    /// Cell equals none of the values. Missing cells match.
    NotOneOf(Vec<Value>),
}

impl Condition {
    fn symbol(&self) -> &'static str {
        match self {
            Self::Equals(_) => "==",
            Self::NotEquals(_) => "!=",
            Self::Contains(_) => "contains",
            Self::NotContains(_) => "not contains",
            Self::GreaterThan(_) => ">",
            Self::GreaterOrEqual(_) => ">=",
            Self::LessThan(_) => "<",
            Self::LessOrEqual(_) => "<=",
            Self::InRange { .. } => "between",
            Self::OneOf(_) => "in",
            Self::NotOneOf(_) => "not in",
        }
    }
}

/// A single column condition. A row is kept iff it satisfies every predicate in a set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    /// Column the condition applies to.
    pub column: String,
    /// The condition.
    #[serde(flatten)]
    pub condition: Condition,
}

impl Predicate {
    /// Apply any [`Condition`] to `column`. The shorthands below cover the common ones.
    ///
    /// ```
    /// use csv_explorer::processing::{Condition, Predicate};
    /// use csv_explorer::types::Value;
    ///
    /// let p = Predicate::new("age", Condition::GreaterOrEqual(Value::Int64(18)));
    /// assert_eq!(p.to_string(), "`age` >= `18`");
    /// ```
    pub fn new(column: impl Into<String>, condition: Condition) -> Self {
        Self {
            column: column.into(),
            condition,
        }
    }

    /// `column == value`.
    pub fn equals(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, Condition::Equals(value))
    }

    /// Text `column` contains `needle`, ignoring case.
    pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(column, Condition::Contains(needle.into()))
    }

    /// `column > value`.
    pub fn greater_than(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, Condition::GreaterThan(value))
    }

    /// `column < value`.
    pub fn less_than(column: impl Into<String>, value: Value) -> Self {
        Self::new(column, Condition::LessThan(value))
    }

    /// `low <= column <= high`. Fails validation if `low > high`.
    pub fn in_range(column: impl Into<String>, low: Value, high: Value) -> Self {
        Self::new(column, Condition::InRange { low, high })
    }

    /// `column` equals one of `values`.
    pub fn one_of(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(column, Condition::OneOf(values))
    }

    /// Check this predicate against `schema` without evaluating any rows.
    pub fn validate(&self, schema: &Schema) -> ExplorerResult<()> {
        CompiledPredicate::compile(schema, self).map(|_| ())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {} ", self.column, self.condition.symbol())?;
        match &self.condition {
            Condition::Equals(v)
            | Condition::NotEquals(v)
            | Condition::GreaterThan(v)
            | Condition::GreaterOrEqual(v)
            | Condition::LessThan(v)
            | Condition::LessOrEqual(v) => write!(f, "`{v}`"),
            Condition::Contains(s) | Condition::NotContains(s) => write!(f, "`{s}`"),
            Condition::InRange { low, high } => write!(f, "`{low}` and `{high}`"),
            Condition::OneOf(vs) | Condition::NotOneOf(vs) => {
                let items: Vec<String> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Debug)]
enum Test {
    Equals(Value),
    NotEquals(Value),
    Contains(String),
    NotContains(String),
    Compare(Bound, Value),
    Range(Value, Value),
    OneOf(Vec<Value>),
    NotOneOf(Vec<Value>),
}

/// A predicate resolved against a schema: column index plus a type-checked test.
#[derive(Debug)]
pub(crate) struct CompiledPredicate {
    idx: usize,
    test: Test,
}

impl CompiledPredicate {
    pub(crate) fn compile(schema: &Schema, predicate: &Predicate) -> ExplorerResult<Self> {
        let column = predicate.column.as_str();
        let (idx, field) = schema
            .field(column)
            .ok_or_else(|| ExplorerError::incompatible(column, "unknown column"))?;
        let dt = field.data_type;

        let test = match &predicate.condition {
            Condition::Equals(v) => Test::Equals(check_value(column, dt, v)?),
            Condition::NotEquals(v) => Test::NotEquals(check_value(column, dt, v)?),
            Condition::Contains(s) => {
                require_text(column, dt, "contains")?;
                Test::Contains(s.to_lowercase())
            }
            Condition::NotContains(s) => {
                require_text(column, dt, "not contains")?;
                Test::NotContains(s.to_lowercase())
            }
            Condition::GreaterThan(v) => compare(column, dt, Bound::Gt, v)?,
            Condition::GreaterOrEqual(v) => compare(column, dt, Bound::Ge, v)?,
            Condition::LessThan(v) => compare(column, dt, Bound::Lt, v)?,
            Condition::LessOrEqual(v) => compare(column, dt, Bound::Le, v)?,
            Condition::InRange { low, high } => {
                require_ordered(column, dt)?;
                let low = check_value(column, dt, low)?;
                let high = check_value(column, dt, high)?;
                if cell_cmp(&low, &high) == Some(Ordering::Greater) {
                    return Err(ExplorerError::incompatible(
                        column,
                        format!("empty range: low `{low}` is above high `{high}`"),
                    ));
                }
                Test::Range(low, high)
            }
            Condition::OneOf(vs) => Test::OneOf(check_values(column, dt, vs)?),
            Condition::NotOneOf(vs) => Test::NotOneOf(check_values(column, dt, vs)?),
        };

        Ok(Self { idx, test })
    }

    pub(crate) fn matches(&self, row: &[Value]) -> bool {
        let cell = row.get(self.idx).unwrap_or(&Value::Null);
        if cell.is_null() {
            return matches!(
                self.test,
                Test::NotEquals(_) | Test::NotContains(_) | Test::NotOneOf(_)
            );
        }
        match &self.test {
            Test::Equals(v) => cell_eq(cell, v),
            Test::NotEquals(v) => !cell_eq(cell, v),
            Test::Contains(needle) => text_contains(cell, needle),
            Test::NotContains(needle) => !text_contains(cell, needle),
            Test::Compare(bound, v) => match (bound, cell_cmp(cell, v)) {
                (_, None) => false,
                (Bound::Gt, Some(o)) => o == Ordering::Greater,
                (Bound::Ge, Some(o)) => o != Ordering::Less,
                (Bound::Lt, Some(o)) => o == Ordering::Less,
                (Bound::Le, Some(o)) => o != Ordering::Greater,
            },
            Test::Range(low, high) => {
                matches!(cell_cmp(cell, low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(cell_cmp(cell, high), Some(Ordering::Less | Ordering::Equal))
            }
            Test::OneOf(vs) => vs.iter().any(|v| cell_eq(cell, v)),
            Test::NotOneOf(vs) => !vs.iter().any(|v| cell_eq(cell, v)),
        }
    }
}

/// Compile every predicate; the first incompatible one aborts with its error.
pub(crate) fn compile_all(
    schema: &Schema,
    predicates: &[Predicate],
) -> ExplorerResult<Vec<CompiledPredicate>> {
    predicates
        .iter()
        .map(|p| CompiledPredicate::compile(schema, p))
        .collect()
}

fn check_value(column: &str, dt: DataType, v: &Value) -> ExplorerResult<Value> {
    match v.data_type() {
        None => Err(ExplorerError::incompatible(column, "comparison value is missing")),
        Some(vt) if vt == dt || (vt.is_numeric() && dt.is_numeric()) => Ok(v.clone()),
        Some(vt) => Err(ExplorerError::incompatible(
            column,
            format!("{vt} value `{v}` does not match {dt} column"),
        )),
    }
}

fn check_values(column: &str, dt: DataType, vs: &[Value]) -> ExplorerResult<Vec<Value>> {
    vs.iter().map(|v| check_value(column, dt, v)).collect()
}

fn require_text(column: &str, dt: DataType, op: &str) -> ExplorerResult<()> {
    if dt == DataType::Utf8 {
        Ok(())
    } else {
        Err(ExplorerError::incompatible(
            column,
            format!("'{op}' requires a text column, column is {dt}"),
        ))
    }
}

fn require_ordered(column: &str, dt: DataType) -> ExplorerResult<()> {
    if dt.is_ordered() {
        Ok(())
    } else {
        Err(ExplorerError::incompatible(
            column,
            format!("ordering comparison requires a numeric or datetime column, column is {dt}"),
        ))
    }
}

fn compare(column: &str, dt: DataType, bound: Bound, v: &Value) -> ExplorerResult<Test> {
    require_ordered(column, dt)?;
    Ok(Test::Compare(bound, check_value(column, dt, v)?))
}

fn cell_eq(cell: &Value, v: &Value) -> bool {
    cell_cmp(cell, v).map_or(cell == v, Ordering::is_eq)
}

// Integers compare exactly; f64 is only used when a float is involved.
fn cell_cmp(cell: &Value, v: &Value) -> Option<Ordering> {
    match (cell, v) {
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => cell.as_f64()?.partial_cmp(&v.as_f64()?),
    }
}

fn text_contains(cell: &Value, needle_lower: &str) -> bool {
    match cell {
        Value::Utf8(s) => s.to_lowercase().contains(needle_lower),
        _ => false,
    }
}

/// Keep the rows of `dataset` that satisfy every predicate, in their original order.
///
/// - An empty predicate set keeps every row.
/// - All predicates are checked against the schema first; an unknown column or a value/type
///   mismatch fails with [`ExplorerError::IncompatiblePredicate`] and no rows are evaluated.
pub fn apply_filters(dataset: &DataSet, predicates: &[Predicate]) -> ExplorerResult<ViewResult> {
    let compiled = compile_all(&dataset.schema, predicates)?;

    let mut source_rows = Vec::new();
    let mut rows = Vec::new();
    for (idx, row) in dataset.rows.iter().enumerate() {
        if compiled.iter().all(|p| p.matches(row)) {
            source_rows.push(idx);
            rows.push(row.clone());
        }
    }

    log::debug!(
        "applied {} predicate(s): kept {} of {} rows",
        predicates.len(),
        rows.len(),
        dataset.row_count()
    );
    Ok(ViewResult::new(
        DataSet::new(dataset.schema.clone(), rows),
        source_rows,
    ))
}

#[cfg(test)]
mod tests {
    use super::{apply_filters, Condition, Predicate};
    use crate::error::ExplorerError;
    use crate::types::{DataSet, DataType, Field, Schema, Value};
    use chrono::NaiveDate;

    fn text(s: &str) -> Value {
        Value::Utf8(s.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> Value {
        Value::DateTime(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn people() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("age", DataType::Int64),
            Field::new("score", DataType::Float64),
            Field::new("active", DataType::Bool),
            Field::new("joined", DataType::DateTime),
        ]);
        let rows = vec![
            vec![text("Ada"), Value::Int64(36), Value::Float64(98.5), Value::Bool(true), date(2020, 1, 5)],
            vec![text("Grace"), Value::Int64(45), Value::Null, Value::Bool(false), date(2021, 6, 1)],
            vec![text("alan"), Value::Null, Value::Float64(70.0), Value::Bool(true), Value::Null],
            vec![Value::Null, Value::Int64(29), Value::Float64(88.0), Value::Null, date(2023, 2, 14)],
        ];
        DataSet::new(schema, rows)
    }

    fn names(view: &super::ViewResult) -> Vec<String> {
        view.rows().iter().map(|r| r[0].to_string()).collect()
    }

    #[test]
    fn empty_predicates_keep_all_rows_in_order() {
        let ds = people();
        let view = apply_filters(&ds, &[]).unwrap();
        assert_eq!(view.rows(), ds.rows.as_slice());
        assert_eq!(view.source_rows(), &[0, 1, 2, 3]);
    }

    #[test]
    fn numeric_comparisons_skip_missing() {
        let ds = people();
        let view = apply_filters(&ds, &[Predicate::greater_than("age", Value::Int64(30))]).unwrap();
        assert_eq!(names(&view), vec!["Ada", "Grace"]);
        assert_eq!(view.source_rows(), &[0, 1]);

        let view = apply_filters(&ds, &[Predicate::less_than("score", Value::Int64(90))]).unwrap();
        assert_eq!(view.source_rows(), &[2, 3]);
    }

    #[test]
    fn float_value_compares_against_int_column() {
        let ds = people();
        let view =
            apply_filters(&ds, &[Predicate::equals("age", Value::Float64(36.0))]).unwrap();
        assert_eq!(names(&view), vec!["Ada"]);
    }

    #[test]
    fn large_int_ids_compare_exactly() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::Int64(9_007_199_254_740_992)],
                vec![Value::Int64(9_007_199_254_740_993)],
            ],
        );
        let kept = |p: Predicate| apply_filters(&ds, &[p]).unwrap().source_rows().to_vec();

        assert_eq!(kept(Predicate::equals("id", Value::Int64(9_007_199_254_740_993))), vec![1]);
        assert_eq!(
            kept(Predicate::greater_than("id", Value::Int64(9_007_199_254_740_992))),
            vec![1]
        );
        assert_eq!(
            kept(Predicate::in_range(
                "id",
                Value::Int64(9_007_199_254_740_993),
                Value::Int64(i64::MAX)
            )),
            vec![1]
        );
        assert_eq!(
            kept(Predicate::one_of("id", vec![Value::Int64(9_007_199_254_740_992)])),
            vec![0]
        );
    }

    #[test]
    fn contains_ignores_case() {
        let ds = people();
        let view = apply_filters(&ds, &[Predicate::contains("name", "A")]).unwrap();
        assert_eq!(names(&view), vec!["Ada", "Grace", "alan"]);
    }

    #[test]
    fn negated_conditions_keep_missing_cells() {
        let ds = people();
        let view = apply_filters(
            &ds,
            &[Predicate::new("name", Condition::NotContains("a".to_string()))],
        )
        .unwrap();
        assert_eq!(view.source_rows(), &[3]);

        let view = apply_filters(
            &ds,
            &[Predicate::new("age", Condition::NotEquals(Value::Int64(36)))],
        )
        .unwrap();
        assert_eq!(view.source_rows(), &[1, 2, 3]);
    }

    #[test]
    fn in_range_is_inclusive() {
        let ds = people();
        let view = apply_filters(
            &ds,
            &[Predicate::in_range("age", Value::Int64(29), Value::Int64(36))],
        )
        .unwrap();
        assert_eq!(view.source_rows(), &[0, 3]);
    }

    #[test]
    fn temporal_range_filter() {
        let ds = people();
        let view = apply_filters(
            &ds,
            &[Predicate::in_range("joined", date(2021, 1, 1), date(2023, 12, 31))],
        )
        .unwrap();
        assert_eq!(view.source_rows(), &[1, 3]);
    }

    #[test]
    fn membership_filters() {
        let ds = people();
        let view = apply_filters(
            &ds,
            &[Predicate::one_of("name", vec![text("Grace"), text("alan")])],
        )
        .unwrap();
        assert_eq!(view.source_rows(), &[1, 2]);

        let view = apply_filters(
            &ds,
            &[Predicate::new("name", Condition::NotOneOf(vec![text("Grace")]))],
        )
        .unwrap();
        assert_eq!(view.source_rows(), &[0, 2, 3]);
    }

    #[test]
    fn predicates_are_conjunctive() {
        let ds = people();
        let view = apply_filters(
            &ds,
            &[
                Predicate::equals("active", Value::Bool(true)),
                Predicate::greater_than("score", Value::Float64(80.0)),
            ],
        )
        .unwrap();
        assert_eq!(names(&view), vec!["Ada"]);
    }

    fn assert_incompatible(p: Predicate, fragment: &str) {
        match apply_filters(&people(), &[p]) {
            Err(ExplorerError::IncompatiblePredicate { message, .. }) => {
                assert!(message.contains(fragment), "{message}")
            }
            other => panic!("expected incompatible predicate, got {other:?}"),
        }
    }

    #[test]
    fn contains_on_numeric_column_is_incompatible() {
        assert_incompatible(Predicate::contains("age", "x"), "requires a text column");
    }

    #[test]
    fn mismatched_values_are_incompatible() {
        assert_incompatible(Predicate::equals("age", text("36")), "does not match int64 column");
        assert_incompatible(Predicate::greater_than("name", text("A")), "ordering comparison");
        assert_incompatible(Predicate::greater_than("active", Value::Bool(true)), "ordering");
        assert_incompatible(Predicate::equals("age", Value::Null), "missing");
        assert_incompatible(Predicate::equals("nope", Value::Int64(1)), "unknown column");
        assert_incompatible(
            Predicate::in_range("age", Value::Int64(40), Value::Int64(30)),
            "empty range",
        );
    }

    #[test]
    fn display_renders_condition() {
        assert_eq!(
            Predicate::greater_than("age", Value::Int64(30)).to_string(),
            "`age` > `30`"
        );
        assert_eq!(
            Predicate::one_of("name", vec![text("a"), text("b")]).to_string(),
            "`name` in [a, b]"
        );
    }
}
