use svodka_rs::models::{ChartKind, NumberFormat, TreeQuery, Window};

#[test]
fn chart_kind_uses_wire_names() {
    assert_eq!(
        serde_json::to_string(&ChartKind::Doughnut).unwrap(),
        "\"doughnut\""
    );
    let k: ChartKind = serde_json::from_str("\"bar\"").unwrap();
    assert_eq!(k, ChartKind::Bar);
    assert_eq!(ChartKind::Pie.as_str(), "pie");
}

#[test]
fn pie_and_doughnut_aggregate_by_year() {
    assert!(ChartKind::Pie.aggregates_by_year());
    assert!(ChartKind::Doughnut.aggregates_by_year());
    assert!(!ChartKind::Line.aggregates_by_year());
    assert!(!ChartKind::Bar.aggregates_by_year());
}

#[test]
fn window_names_and_limits() {
    let w: Window = serde_json::from_str("\"7\"").unwrap();
    assert_eq!(w, Window::Last7);
    assert_eq!(w.limit(), Some(7));
    let w: Window = serde_json::from_str("\"10\"").unwrap();
    assert_eq!(w.limit(), Some(10));
    let w: Window = serde_json::from_str("\"all\"").unwrap();
    assert_eq!(w.limit(), None);
    assert_eq!(Window::default(), Window::Last7);
    assert_eq!(serde_json::to_string(&Window::Last10).unwrap(), "\"10\"");
}

#[test]
fn number_format_defaults_to_none() {
    assert_eq!(NumberFormat::default(), NumberFormat::None);
    let f: NumberFormat = serde_json::from_str("\"millions\"").unwrap();
    assert_eq!(f, NumberFormat::Millions);
}

#[test]
fn tree_query_defaults_to_measure_one_and_root() {
    let q = TreeQuery::default();
    assert_eq!(q.measure_id, 1);
    assert_eq!(q.index_id, 0);
    assert_eq!(q.parent_id, "");
    assert_eq!(q.terms, "");
}
