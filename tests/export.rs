use csv_explorer::export::{to_csv_bytes, to_json, write_csv, CsvExportOptions};
use csv_explorer::ingestion::{load_csv_from_path, CsvDialect};
use csv_explorer::processing::{apply_filters, summarize, Predicate};

#[test]
fn filtered_view_exports_as_csv() {
    let ds = load_csv_from_path("tests/fixtures/sales.csv", &CsvDialect::default()).unwrap();
    let view = apply_filters(&ds, &[Predicate::contains("region", "north")]).unwrap();

    let opts = CsvExportOptions {
        include_bom: false,
        ..Default::default()
    };
    let out = String::from_utf8(to_csv_bytes(&view, &opts).unwrap()).unwrap();
    assert_eq!(
        out,
        "order_id,category,amount,region,shipped,ordered_at\n\
         1,A,10.0,north,true,2024-01-05\n\
         3,A,3.0,north,true,2024-01-09 14:30:00\n"
    );
}

#[test]
fn export_honours_delimiter_and_writes_missing_as_empty() {
    let ds = load_csv_from_path("tests/fixtures/sales.csv", &CsvDialect::default()).unwrap();
    let view = apply_filters(&ds, &[Predicate::contains("category", "c")]).unwrap();

    let mut buf = Vec::new();
    let opts = CsvExportOptions {
        delimiter: b';',
        include_bom: false,
    };
    write_csv(&view, &mut buf, &opts).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().nth(1), Some("4;C;;south;;2024-02-01"));
}

#[test]
fn summary_serializes_with_column_kind() {
    let ds = load_csv_from_path("tests/fixtures/sales.csv", &CsvDialect::default()).unwrap();
    let view = apply_filters(&ds, &[]).unwrap();
    let stats = summarize(&view, &["amount", "category", "nope"]);

    let json: serde_json::Value = serde_json::from_str(&to_json(&stats).unwrap()).unwrap();
    assert_eq!(json["columns"][0]["summary"]["kind"], "numeric");
    assert_eq!(json["columns"][0]["summary"]["mean"], 7.5);
    assert_eq!(json["columns"][1]["summary"]["kind"], "categorical");
    assert_eq!(json["columns"][1]["summary"]["top"], "A");
    assert_eq!(json["skipped"][0]["column"], "nope");
}
