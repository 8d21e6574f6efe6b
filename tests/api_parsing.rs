use svodka_rs::models::{
    ChartKind, Folder, Indicator, Period, Segment, Widget, decode_primary, decode_rows,
};

#[test]
fn parse_indicator_list() {
    let sample = r#"[
        {"id": 3, "name": "Доходы бюджета"},
        {"id": 7, "name": "Расходы бюджета"}
    ]"#;
    let indicators: Vec<Indicator> = serde_json::from_str(sample).unwrap();
    assert_eq!(indicators.len(), 2);
    assert_eq!(indicators[0].id, 3);
    assert_eq!(indicators[1].name, "Расходы бюджета");
}

#[test]
fn period_ids_arrive_as_numbers_or_strings() {
    let periods: Vec<Period> =
        serde_json::from_str(r#"[{"id": 2, "name": "Годовая"}, {"id": "4", "name": "Квартальная"}]"#)
            .unwrap();
    assert_eq!(periods[0].id, 2);
    assert_eq!(periods[1].id, 4);
}

#[test]
fn parse_segment_with_terms() {
    let sample = r#"
    {
      "id": "741880,741881",
      "name": "Все уровни бюджета",
      "termIds": "741880,741881",
      "names": "Областной бюджет + Местный бюджет",
      "dicId": "10179,10179",
      "idx": "2",
      "mas_names": [
        {"id": "741880", "name": "Областной бюджет"},
        {"id": " 741881", "name": "Местный бюджет"}
      ]
    }"#;
    let seg: Segment = serde_json::from_str(sample).unwrap();
    assert_eq!(seg.term_ids, "741880,741881");
    assert_eq!(seg.dic_ids, "10179,10179");
    assert_eq!(seg.idx, 2);
    // Term ids come back as strings, sometimes padded.
    assert_eq!(seg.mas_names[0].id, 741880);
    assert_eq!(seg.mas_names[1].id, 741881);
}

#[test]
fn segment_without_terms_defaults_to_empty() {
    let sample = r#"
    {
      "id": "100",
      "name": "Всего",
      "termIds": "100",
      "names": "Всего",
      "dicId": "10179",
      "idx": 0
    }"#;
    let seg: Segment = serde_json::from_str(sample).unwrap();
    assert!(seg.mas_names.is_empty());
}

#[test]
fn widget_decodes_its_snapshots() {
    let sample = r#"
    {
      "id": 5,
      "user_id": 42,
      "p_index_id": 3,
      "p_period_id": 2,
      "p_terms": "741880",
      "p_term_id": 741880,
      "p_dicIds": "10179",
      "idx": 0,
      "chart_type": "doughnut",
      "folder_id": 9,
      "selected_data": "[{\"text\":\"Регион А\",\"2021 год\":\"200\"}]",
      "primary_data": "{\"name\":\"Доходы\",\"measureName\":\"млн рублей\"}"
    }"#;
    let w: Widget = serde_json::from_str(sample).unwrap();
    assert_eq!(w.chart_type, ChartKind::Doughnut);
    assert_eq!(w.folder_id, Some(9));
    let rows = w.rows().unwrap();
    assert_eq!(rows[0].text.as_deref(), Some("Регион А"));
    let meta = w.primary().unwrap();
    assert_eq!(meta.name.as_deref(), Some("Доходы"));
    assert_eq!(meta.measure_name.as_deref(), Some("млн рублей"));
}

#[test]
fn widgets_saved_before_folders_existed_have_no_folder() {
    let sample = r#"
    {
      "id": 1,
      "user_id": 42,
      "p_index_id": 3,
      "p_period_id": 2,
      "p_terms": "",
      "p_term_id": 0,
      "p_dicIds": "",
      "idx": 0,
      "chart_type": "line",
      "selected_data": "[]",
      "primary_data": "{}"
    }"#;
    let w: Widget = serde_json::from_str(sample).unwrap();
    assert_eq!(w.folder_id, None);
    assert!(w.rows().unwrap().is_empty());
}

#[test]
fn rows_and_metadata_arrive_inline_or_stringified() {
    let inline = serde_json::json!([{ "text": "А", "2020 год": 7 }]);
    let stringified = serde_json::json!("[{\"text\":\"А\",\"2020 год\":7}]");
    assert_eq!(
        decode_rows(&inline).unwrap(),
        decode_rows(&stringified).unwrap()
    );

    let meta_inline = serde_json::json!({ "name": "Отчет", "measureName": "тонн" });
    let meta_str = serde_json::json!("{\"name\":\"Отчет\",\"measureName\":\"тонн\"}");
    assert_eq!(
        decode_primary(&meta_inline).unwrap(),
        decode_primary(&meta_str).unwrap()
    );
}

#[test]
fn metadata_fields_are_optional() {
    let meta = decode_primary(&serde_json::json!({})).unwrap();
    assert_eq!(meta.name, None);
    assert_eq!(meta.measure_name, None);
}

#[test]
fn broken_payloads_surface_parse_errors() {
    let err = decode_rows(&serde_json::json!("not json at all")).unwrap_err();
    assert!(err.to_string().starts_with("data parsing error"));
    let err = decode_primary(&serde_json::json!(["array, not object"])).unwrap_err();
    assert!(err.to_string().starts_with("metadata parsing error"));
}

#[test]
fn folders_parse_with_and_without_user() {
    let f: Folder = serde_json::from_str(r#"{"id": 0, "name": "Главная"}"#).unwrap();
    assert_eq!(f.user_id, None);
    let f: Folder = serde_json::from_str(r#"{"id": 3, "user_id": 42, "name": "Отчеты"}"#).unwrap();
    assert_eq!(f.user_id, Some(42));
}
