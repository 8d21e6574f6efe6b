use std::fs;
use std::path::PathBuf;
use svodka_rs::chart::{self, ChartPayload};
use svodka_rs::models::{ChartConfig, ChartKind, NumberFormat, decode_rows};
use svodka_rs::viz;

fn sample_payload(kind: ChartKind) -> ChartPayload {
    let rows = decode_rows(&serde_json::json!([
        { "text": "Регион А", "2019 год": "120", "2020 год": "340", "2021 год": "560" },
        { "text": "Регион Б", "2019 год": "80", "2021 год": "410" }
    ]))
    .unwrap();
    chart::shape(&rows, kind, &ChartConfig::default()).unwrap()
}

fn write_and_check<F: Fn(&PathBuf)>(maker: F, name: &str) {
    let tmp = std::env::temp_dir();
    let path: PathBuf = tmp.join(format!("svodka_viz_{}.svg", name));
    maker(&path);
    let meta = fs::metadata(&path).expect("file created");
    assert!(meta.len() > 0, "svg has content");
    fs::remove_file(&path).ok();
}

#[test]
fn chart_kinds_produce_files() {
    let kinds = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Pie,
        ChartKind::Doughnut,
    ];
    for kind in kinds {
        let payload = sample_payload(kind);
        write_and_check(
            |p| {
                viz::render_chart(
                    &payload,
                    kind,
                    p,
                    800,
                    480,
                    "Тестовый отчет",
                    "млн рублей",
                    NumberFormat::None,
                )
                .unwrap();
            },
            kind.as_str(),
        );
    }
}

#[test]
fn a_gap_splits_the_line_but_still_renders() {
    // Регион Б has no 2020 column, so its line breaks in the middle.
    let payload = sample_payload(ChartKind::Line);
    assert!(payload.datasets[1].data[1].is_nan());
    write_and_check(
        |p| {
            viz::render_chart(
                &payload,
                ChartKind::Line,
                p,
                800,
                480,
                "Разрыв",
                "",
                NumberFormat::None,
            )
            .unwrap();
        },
        "gap",
    );
}

#[test]
fn formatted_ticks_render() {
    let payload = sample_payload(ChartKind::Bar);
    write_and_check(
        |p| {
            viz::render_chart(
                &payload,
                ChartKind::Bar,
                p,
                800,
                480,
                "Форматированная ось",
                "млн рублей",
                NumberFormat::Thousands,
            )
            .unwrap();
        },
        "bar_thousands",
    );
}

#[test]
fn empty_payload_is_error() {
    let payload = ChartPayload {
        labels: vec![],
        datasets: vec![],
    };
    let path = std::env::temp_dir().join("svodka_viz_empty.svg");
    let e = viz::render_chart(
        &payload,
        ChartKind::Line,
        &path,
        800,
        480,
        "Пусто",
        "",
        NumberFormat::None,
    );
    assert!(e.is_err());
}

#[test]
fn pie_needs_a_positive_total() {
    let rows = decode_rows(&serde_json::json!([
        { "text": "А", "2021 год": "0" },
        { "text": "Б", "2021 год": "0" }
    ]))
    .unwrap();
    let payload = chart::shape(&rows, ChartKind::Pie, &ChartConfig::default()).unwrap();
    let path = std::env::temp_dir().join("svodka_viz_zero.svg");
    let e = viz::render_chart(
        &payload,
        ChartKind::Pie,
        &path,
        800,
        480,
        "Ноль",
        "",
        NumberFormat::None,
    );
    assert!(e.is_err());
    fs::remove_file(&path).ok();
}
