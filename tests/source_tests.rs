use demandscope::source::{cell_text, RowSource, SheetExport, SourceError};
use serde_json::json;
use std::io::Cursor;

#[test]
fn sheet_values_use_first_row_as_header() {
    let body = json!({
        "range": "Sheet1!A1:Z3",
        "majorDimension": "ROWS",
        "values": [
            ["タイムスタンプ", "price", "extra"],
            ["2024/01/01", 3000],
            ["2024/01/02", "¥500", "x", "beyond header"]
        ]
    })
    .to_string();
    let rows = SheetExport::from_reader(Cursor::new(body), "test").unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("price").map(String::as_str), Some("3000"));
    assert!(rows[0].get("extra").is_none());
    assert_eq!(rows[1].get("extra").map(String::as_str), Some("x"));
    assert_eq!(rows[1].len(), 3);
}

#[test]
fn missing_values_means_no_rows() {
    let rows = SheetExport::from_reader(Cursor::new(r#"{"range":"A:Z"}"#), "test").unwrap();
    assert!(rows.is_empty());
}

#[test]
fn array_of_objects_is_accepted() {
    let rows = SheetExport::from_reader(
        Cursor::new(r#"[{"avatar_url":"123","desired_price":1500,"preferred_worker":null}]"#),
        "test",
    )
    .unwrap();
    assert_eq!(rows[0].get("avatar_url").map(String::as_str), Some("123"));
    assert_eq!(rows[0].get("desired_price").map(String::as_str), Some("1500"));
    assert!(rows[0].get("preferred_worker").is_none());
}

#[test]
fn numeric_cells_render_as_text() {
    assert_eq!(cell_text(&json!(456.0)).as_deref(), Some("456"));
    assert_eq!(cell_text(&json!(12.5)).as_deref(), Some("12.5"));
    assert_eq!(cell_text(&json!(7)).as_deref(), Some("7"));
    assert_eq!(cell_text(&json!(true)).as_deref(), Some("true"));
    assert_eq!(cell_text(&json!(null)), None);
}

#[test]
fn bad_inputs_are_distinct_errors() {
    let err = SheetExport::from_reader(Cursor::new("{not json"), "test").unwrap_err();
    assert!(matches!(err, SourceError::Json { .. }));
    let err = SheetExport::from_reader(Cursor::new("42"), "test").unwrap_err();
    assert!(matches!(err, SourceError::Shape { .. }));
    let err = SheetExport::from_path("/definitely/not/here.json").fetch().unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
}
