//! Quick per-column overview of a dataset: type, missing values, cardinality.

use serde::Serialize;

use crate::types::{DataSet, DataType};

use super::group::Groups;

/// Overview of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub data_type: DataType,
    /// Number of missing cells.
    pub missing: usize,
    /// Missing cells as a percentage of rows, rounded to two decimals.
    pub missing_pct: f64,
    /// Distinct values, counting "missing" as one value when present.
    pub unique: usize,
}

/// Overview of a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub rows: usize,
    pub columns: usize,
    pub fields: Vec<ColumnProfile>,
}

/// Profile every column of `dataset`.
pub fn profile(dataset: &DataSet) -> DatasetProfile {
    let rows = dataset.row_count();
    let fields = dataset
        .schema
        .fields
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let mut groups: Groups<()> = Groups::new();
            let mut missing = 0;
            for v in dataset.column_values(idx) {
                if v.is_null() {
                    missing += 1;
                }
                groups.entry(v);
            }
            ColumnProfile {
                name: field.name.clone(),
                data_type: field.data_type,
                missing,
                missing_pct: if rows == 0 {
                    0.0
                } else {
                    (missing as f64 / rows as f64 * 10_000.0).round() / 100.0
                },
                unique: groups.len(),
            }
        })
        .collect();

    DatasetProfile {
        rows,
        columns: dataset.column_count(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::profile;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    #[test]
    fn profile_counts_missing_and_unique() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int64),
            Field::new("b", DataType::Utf8),
        ]);
        let ds = DataSet::new(
            schema,
            vec![
                vec![Value::Int64(1), Value::Utf8("x".into())],
                vec![Value::Null, Value::Utf8("x".into())],
                vec![Value::Int64(1), Value::Utf8("y".into())],
            ],
        );
        let p = profile(&ds);
        assert_eq!(p.rows, 3);
        assert_eq!(p.columns, 2);
        assert_eq!(p.fields[0].missing, 1);
        assert_eq!(p.fields[0].missing_pct, 33.33);
        assert_eq!(p.fields[0].unique, 2);
        assert_eq!(p.fields[1].missing, 0);
        assert_eq!(p.fields[1].unique, 2);
        assert_eq!(p.fields[1].data_type, DataType::Utf8);
    }

    #[test]
    fn empty_dataset_profile() {
        let schema = Schema::new(vec![Field::new("a", DataType::Utf8)]);
        let p = profile(&DataSet::new(schema, vec![]));
        assert_eq!(p.rows, 0);
        assert_eq!(p.fields[0].missing_pct, 0.0);
        assert_eq!(p.fields[0].unique, 0);
    }
}
