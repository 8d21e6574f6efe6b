use svodka_rs::chart;
use svodka_rs::models::decode_rows;

#[test]
fn one_series_per_row_with_aligned_values() {
    let rows = decode_rows(&serde_json::json!([
        { "text": "Регион А", "2020 год": "10", "2021 год": "20" },
        { "text": "Регион Б", "2020 год": 30, "2021 год": "40,1" }
    ]))
    .unwrap();
    let keys = chart::temporal_keys(&rows);
    let series = chart::build_series(&rows, &keys);
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].label, "Регион А");
    assert_eq!(series[0].values, vec![10.0, 20.0]);
    // Numeric cells and strings with trailing junk both yield values.
    assert_eq!(series[1].values, vec![30.0, 40.0]);
}

#[test]
fn missing_and_unparsable_cells_become_gaps() {
    let rows = decode_rows(&serde_json::json!([
        { "text": "А", "2020 год": "10", "2021 год": "20" },
        { "text": "Б", "2021 год": "нет данных" }
    ]))
    .unwrap();
    let keys = chart::temporal_keys(&rows);
    let series = chart::build_series(&rows, &keys);
    assert!(series[1].values[0].is_nan());
    assert!(series[1].values[1].is_nan());
}

#[test]
fn rows_without_text_get_numbered_labels() {
    let rows = decode_rows(&serde_json::json!([
        { "2020 год": "1" },
        { "text": "", "2020 год": "2" },
        { "text": "Регион В", "2020 год": "3" }
    ]))
    .unwrap();
    let keys = chart::temporal_keys(&rows);
    let series = chart::build_series(&rows, &keys);
    assert_eq!(series[0].label, "Серия 1");
    assert_eq!(series[1].label, "Серия 2");
    assert_eq!(series[2].label, "Регион В");
}
