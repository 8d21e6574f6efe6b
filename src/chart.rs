//! The shaping core shared by every chart and table renderer.
//!
//! Report rows arrive as flat objects whose period columns are keyed by
//! display names like "2021 год" or "2021 (1 кв.)". This module classifies
//! and orders those keys, windows them to the most recent ones, builds
//! per-row series for line and bar charts, aggregates single years for pie
//! and doughnut charts, and lays out the table view. All renderers consume
//! these outputs, so a value can never appear in one chart and vanish from
//! another.

use std::sync::LazyLock;

use regex::Regex;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::error::ShapeError;
use crate::models::{ChartConfig, ChartKind, PrimaryMetadata, Row, Window};
use crate::style;

/// Header label for the `text` column in the table view.
pub const NAME_COLUMN: &str = "Наименование";

/// A key counts as temporal when it ends in a four-digit year, optionally
/// followed by a year word ("г.", "г", "год") and a parenthesized
/// qualifier like "(1 кв.)".
static TEMPORAL_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[0-9]{4}\s*(?:г(?:\.|од)?)?(?:\s*\(.*\))?$").unwrap());

/// First four-digit run anywhere in a key.
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{4}").unwrap());

/// Parenthesized quarter marker, e.g. "(1 кв.)" or "(за 2 кв.)".
static QUARTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*кв[^)]*\)").unwrap());

/// A column name classified as temporal, with the year used for ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalKey {
    pub key: String,
    pub year: i32,
}

/// The year embedded in a key: its first four-digit run, or 0 when there
/// is none.
pub fn key_year(key: &str) -> i32 {
    YEAR.find(key)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0)
}

/// Classify and order the temporal keys of the first row.
///
/// The first row decides the columns for the whole table; rows missing one
/// of its keys simply have gaps. Ordering is ascending by year and stable,
/// so several columns of one year keep their wire order.
pub fn temporal_keys(rows: &[Row]) -> Vec<TemporalKey> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut keys: Vec<TemporalKey> = first
        .cells
        .keys()
        .filter(|k| TEMPORAL_KEY.is_match(k))
        .map(|k| TemporalKey {
            key: k.clone(),
            year: key_year(k),
        })
        .collect();
    keys.sort_by_key(|k| k.year);
    keys
}

/// The most recent stretch of an ordered key list. Lists shorter than the
/// window come back whole.
pub fn window_keys(keys: &[TemporalKey], window: Window) -> &[TemporalKey] {
    match window.limit() {
        Some(n) => &keys[keys.len().saturating_sub(n)..],
        None => keys,
    }
}

/// One plotted series: a label and values aligned to the windowed keys,
/// with NaN standing in for gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Build one series per row over the windowed keys, in row order.
pub fn build_series(rows: &[Row], window: &[TemporalKey]) -> Vec<Series> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| Series {
            label: row.label(i),
            values: window
                .iter()
                .map(|k| row.cell_number(&k.key).unwrap_or(f64::NAN))
                .collect(),
        })
        .collect()
}

/// Distinct years across the first row's temporal keys, ascending, as the
/// four-digit strings offered for year selection.
pub fn available_years(rows: &[Row]) -> Vec<String> {
    let mut years: Vec<i32> = temporal_keys(rows).iter().map(|k| k.year).collect();
    years.sort_unstable();
    years.dedup();
    years.into_iter().map(|y| format!("{:04}", y)).collect()
}

/// The default aggregation year: the most recent one available.
pub fn default_year(rows: &[Row]) -> Option<String> {
    available_years(rows).pop()
}

/// The year a pie or doughnut chart aggregates: the configured one, or the
/// most recent in the data.
pub fn effective_year(rows: &[Row], config: &ChartConfig) -> Option<String> {
    config
        .selected_year
        .clone()
        .or_else(|| default_year(rows))
}

/// Aggregate one row's value for a year.
///
/// Quarterly columns for the year win and are summed; failing that, the
/// exact annual column "{year} год" is used as-is; failing that, the first
/// column mentioning the year (by ascending key order) stands in. A row
/// that never mentions the year contributes 0.
pub fn year_value(row: &Row, year: &str) -> f64 {
    let quarterly: Vec<&String> = row
        .cells
        .keys()
        .filter(|k| k.contains(year) && QUARTER.is_match(k))
        .collect();
    if !quarterly.is_empty() {
        // Sum what parses; an unparsable quarter is a gap, not a NaN sum.
        return quarterly.iter().filter_map(|k| row.cell_number(k)).sum();
    }

    let annual = format!("{year} год");
    if row.cells.contains_key(&annual) {
        return row.cell_number(&annual).unwrap_or(f64::NAN);
    }

    let mut candidates: Vec<&String> = row.cells.keys().filter(|k| k.contains(year)).collect();
    candidates.sort();
    match candidates.first() {
        Some(k) => row.cell_number(k).unwrap_or(f64::NAN),
        None => 0.0,
    }
}

/// Aggregate every row for the year, in row order.
pub fn year_values(rows: &[Row], year: &str) -> Vec<f64> {
    rows.iter().map(|r| year_value(r, year)).collect()
}

/// Each value's share of the total, rounded to two decimals. A zero or
/// unparsable total reports all zeros rather than dividing by it.
pub fn percentages(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total == 0.0 || total.is_nan() {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|v| (v / total * 100.0 * 100.0).round() / 100.0)
        .collect()
}

/// Chart-ready labels and datasets, in the shape charting front ends
/// consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPayload {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// One dataset. `data` serializes NaN gaps as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    #[serde(serialize_with = "ser_values_with_gaps")]
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor")]
    pub background_color: ColorSpec,
    #[serde(rename = "borderColor")]
    pub border_color: ColorSpec,
    #[serde(rename = "borderWidth", skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
}

/// A scalar color for a whole series, or one color per slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColorSpec {
    One(String),
    Many(Vec<String>),
}

fn ser_values_with_gaps<S>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(values.len()))?;
    for v in values {
        if v.is_finite() {
            seq.serialize_element(v)?;
        } else {
            seq.serialize_element(&None::<f64>)?;
        }
    }
    seq.end()
}

/// Shape rows into the payload for a chart kind. Line and bar plot the
/// windowed series; pie and doughnut aggregate a single year.
pub fn shape(
    rows: &[Row],
    kind: ChartKind,
    config: &ChartConfig,
) -> Result<ChartPayload, ShapeError> {
    if rows.is_empty() {
        return Err(ShapeError::NoData);
    }
    if kind.aggregates_by_year() {
        Ok(yearly_payload(rows, config))
    } else {
        Ok(series_payload(rows, config))
    }
}

fn series_payload(rows: &[Row], config: &ChartConfig) -> ChartPayload {
    let keys = temporal_keys(rows);
    let window = window_keys(&keys, config.window);
    let datasets = build_series(rows, window)
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let color = style::series_color(i).css();
            Dataset {
                label: s.label,
                data: s.values,
                background_color: ColorSpec::One(color.clone()),
                border_color: ColorSpec::One(color),
                border_width: None,
            }
        })
        .collect();
    ChartPayload {
        labels: window.iter().map(|k| k.key.clone()).collect(),
        datasets,
    }
}

fn yearly_payload(rows: &[Row], config: &ChartConfig) -> ChartPayload {
    // No year to aggregate means an empty chart, not a failure.
    let Some(year) = effective_year(rows, config) else {
        return ChartPayload {
            labels: Vec::new(),
            datasets: Vec::new(),
        };
    };
    let values = year_values(rows, &year);
    let fills: Vec<String> = (0..rows.len())
        .map(|i| style::slice_color(i).css())
        .collect();
    let borders: Vec<String> = (0..rows.len())
        .map(|i| style::slice_color(i).opaque().css())
        .collect();
    ChartPayload {
        labels: rows.iter().enumerate().map(|(i, r)| r.label(i)).collect(),
        datasets: vec![Dataset {
            label: year,
            data: values,
            background_color: ColorSpec::Many(fills),
            border_color: ColorSpec::Many(borders),
            border_width: Some(1),
        }],
    }
}

/// The table rendition: the `text` column first, then the windowed period
/// columns; body cells formatted for display, missing ones blank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Lay out the windowed table for the rows.
pub fn table_view(rows: &[Row], config: &ChartConfig) -> TableView {
    let keys = temporal_keys(rows);
    let window = window_keys(&keys, config.window);

    let mut columns = Vec::with_capacity(window.len() + 1);
    columns.push(NAME_COLUMN.to_string());
    columns.extend(window.iter().map(|k| k.key.clone()));

    let body = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = Vec::with_capacity(window.len() + 1);
            cells.push(row.label(i));
            for k in window {
                let cell = row
                    .cell_text(&k.key)
                    .map(|raw| crate::format::format_number(&raw, config.number_format))
                    .unwrap_or_default();
                cells.push(cell);
            }
            cells
        })
        .collect();

    TableView {
        columns,
        rows: body,
    }
}

/// Caption for a rendered chart: the report name for series charts, the
/// year banner for pie and doughnut.
pub fn chart_title(kind: ChartKind, meta: &PrimaryMetadata, year: Option<&str>) -> String {
    if kind.aggregates_by_year() {
        format!("Распределение значений за {}", year.unwrap_or_default())
    } else {
        meta.name.clone().unwrap_or_default()
    }
}
