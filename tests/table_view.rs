use svodka_rs::chart;
use svodka_rs::models::{ChartConfig, NumberFormat, Window, decode_rows};

#[test]
fn name_column_first_then_windowed_periods() {
    let rows = decode_rows(&serde_json::json!([
        { "text": "Регион А", "2019 год": "1000", "2020 год": "2000", "2021 год": "3000" },
        { "2020 год": "500" }
    ]))
    .unwrap();
    let view = chart::table_view(&rows, &ChartConfig::default());
    assert_eq!(
        view.columns,
        vec!["Наименование", "2019 год", "2020 год", "2021 год"]
    );
    assert_eq!(view.rows[0], vec!["Регион А", "1000", "2000", "3000"]);
    assert_eq!(view.rows[1], vec!["Серия 2", "", "500", ""]);
}

#[test]
fn cells_follow_the_number_format() {
    let rows = decode_rows(&serde_json::json!([
        { "text": "А", "2021 год": "2500000", "2020 год": "смотри сноску" }
    ]))
    .unwrap();
    let config = ChartConfig {
        number_format: NumberFormat::Millions,
        ..Default::default()
    };
    let view = chart::table_view(&rows, &config);
    assert_eq!(view.rows[0][1], "смотри сноску");
    assert_eq!(view.rows[0][2], "2.50 млн.");
}

#[test]
fn window_drops_older_columns() {
    let mut obj = serde_json::Map::new();
    obj.insert("text".into(), serde_json::json!("А"));
    for y in 2013..=2021 {
        obj.insert(format!("{} год", y), serde_json::json!("1"));
    }
    let rows = decode_rows(&serde_json::Value::Array(vec![serde_json::Value::Object(
        obj,
    )]))
    .unwrap();
    let config = ChartConfig {
        window: Window::Last7,
        ..Default::default()
    };
    let view = chart::table_view(&rows, &config);
    assert_eq!(view.columns.len(), 8);
    assert_eq!(view.columns[1], "2015 год");
}
