use std::fs;
use std::path::PathBuf;
use svodka_rs::chart;
use svodka_rs::models::{ChartConfig, ChartKind, Row, decode_rows};
use svodka_rs::storage;

fn sample_rows() -> Vec<Row> {
    decode_rows(&serde_json::json!([
        { "id": 1, "text": "Регион А", "leaf": true, "2020 год": "1000", "2021 год": "2000" },
        { "id": 2, "leaf": false, "2020 год": "500" }
    ]))
    .unwrap()
}

#[test]
fn save_csv_keeps_raw_values() {
    let rows = sample_rows();
    let keys = chart::temporal_keys(&rows);
    let tmp = std::env::temp_dir();

    let csv_path: PathBuf = tmp.join("svodka_rs_table.csv");
    storage::save_table_csv(&rows, &keys, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("Наименование,2020 год,2021 год"));
    assert!(csv_txt.contains("Регион А,1000,2000"));
    // Missing cells come out empty, not as "NaN" or zero.
    assert!(csv_txt.contains("Серия 2,500,"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());
    fs::remove_file(&csv_path).ok();
}

#[test]
fn save_rows_json_round_trips() {
    let rows = sample_rows();
    let json_path = std::env::temp_dir().join("svodka_rs_rows.json");
    storage::save_rows_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let back = decode_rows(&serde_json::from_str(&json_txt).unwrap()).unwrap();
    assert_eq!(back, rows);
    fs::remove_file(&json_path).ok();
}

#[test]
fn save_payload_writes_the_chart_shape() {
    let rows = sample_rows();
    let payload = chart::shape(&rows, ChartKind::Pie, &ChartConfig::default()).unwrap();
    let path = std::env::temp_dir().join("svodka_rs_payload.json");
    storage::save_payload_json(&payload, &path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v["labels"][0], "Регион А");
    assert_eq!(v["datasets"][0]["label"], "2021");
    assert!(v["datasets"][0]["backgroundColor"].is_array());
    fs::remove_file(&path).ok();
}
