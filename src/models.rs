use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ShapeError;

/// Chart types a widget can be saved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Doughnut,
}

impl ChartKind {
    /// Wire name, as stored in a widget's `chart_type`.
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
            ChartKind::Doughnut => "doughnut",
        }
    }

    /// Pie and doughnut charts aggregate one year instead of plotting the
    /// windowed period series.
    pub fn aggregates_by_year(self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Doughnut)
    }
}

/// How many of the most recent period columns to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Window {
    #[default]
    #[serde(rename = "7")]
    Last7,
    #[serde(rename = "10")]
    Last10,
    #[serde(rename = "all")]
    All,
}

impl Window {
    /// Number of trailing columns to keep, or `None` for the full list.
    pub fn limit(self) -> Option<usize> {
        match self {
            Window::Last7 => Some(7),
            Window::Last10 => Some(10),
            Window::All => None,
        }
    }
}

/// Display scaling applied to table cells, tick labels, and data labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// Plain value, no scaling and no suffix.
    #[default]
    None,
    Thousands,
    Millions,
    Trillions,
}

/// The view settings a user picks on the dashboard. Shaping functions only
/// ever read these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    pub window: Window,
    pub number_format: NumberFormat,
    /// Four-digit year for pie/doughnut aggregation. `None` means the most
    /// recent year present in the data.
    pub selected_year: Option<String>,
}

/// One row of report tree data: a few reserved bookkeeping fields plus one
/// column per period, keyed by the period's display name (e.g. "2021 год"
/// or "2021 (1 кв.)"). Cells arrive as numbers or numeric strings; a
/// missing column means the backend had no value for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf: Option<bool>,
    /// Period columns in wire order.
    #[serde(flatten)]
    pub cells: Map<String, Value>,
}

impl Row {
    /// Display label: `text`, or a generated name from the 1-based position
    /// when it is missing or empty.
    pub fn label(&self, index: usize) -> String {
        match self.text.as_deref() {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("Серия {}", index + 1),
        }
    }

    /// A cell's display text. `None` when the column is absent or holds
    /// something other than a number or string.
    pub fn cell_text(&self, key: &str) -> Option<String> {
        match self.cells.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    /// A cell parsed as a number, with the loose leading-prefix rules of
    /// [`crate::format::parse_number`]. `None` when absent or unparsable.
    pub fn cell_number(&self, key: &str) -> Option<f64> {
        match self.cells.get(key) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => crate::format::parse_number(s),
            _ => None,
        }
    }
}

/// Report title and unit of measure delivered alongside the rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "measureName")]
    pub measure_name: Option<String>,
}

/// Decode a row array that arrives either inline or as a JSON-encoded
/// string. Both shapes occur: freshly fetched rows are inline, saved
/// widgets carry them stringified.
pub fn decode_rows(input: &Value) -> Result<Vec<Row>, ShapeError> {
    match input {
        Value::String(s) => {
            serde_json::from_str(s).map_err(|e| ShapeError::DataParse(e.to_string()))
        }
        other => serde_json::from_value(other.clone())
            .map_err(|e| ShapeError::DataParse(e.to_string())),
    }
}

/// Decode primary metadata that arrives either inline or as a JSON-encoded
/// string.
pub fn decode_primary(input: &Value) -> Result<PrimaryMetadata, ShapeError> {
    match input {
        Value::String(s) => {
            serde_json::from_str(s).map_err(|e| ShapeError::MetadataParse(e.to_string()))
        }
        other => serde_json::from_value(other.clone())
            .map_err(|e| ShapeError::MetadataParse(e.to_string())),
    }
}

/// Indicator catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: i64,
    pub name: String,
}

/// Period type offered for an indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// The upstream service encodes some ids as strings, others as
    /// numbers. Accept both and normalize to `i64`.
    #[serde(deserialize_with = "de_i64_from_string_or_number")]
    pub id: i64,
    pub name: String,
}

/// Classification option for an indicator/period pair. The gateway joins
/// the underlying terms into flat strings: `term_ids` and `dic_ids` are
/// comma-separated id lists, `names` the matching display names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub name: String,
    #[serde(rename = "termIds")]
    pub term_ids: String,
    pub names: String,
    #[serde(rename = "dicId")]
    pub dic_ids: String,
    #[serde(deserialize_with = "de_i64_from_string_or_number")]
    pub idx: i64,
    /// Individual terms, for picking the one to drill down by.
    #[serde(default)]
    pub mas_names: Vec<SegmentTerm>,
}

/// One term inside a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTerm {
    #[serde(deserialize_with = "de_i64_from_string_or_number")]
    pub id: i64,
    pub name: String,
}

/// A folder grouping saved widgets. Folder id 0 is the root shown on the
/// dashboard's front page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub name: String,
}

/// A saved dashboard widget, as the gateway stores it: the query that
/// produced the rows, plus row and metadata snapshots as JSON-encoded
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Widget {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "p_index_id")]
    pub index_id: i64,
    #[serde(rename = "p_period_id")]
    pub period_id: i64,
    #[serde(rename = "p_terms")]
    pub terms: String,
    #[serde(rename = "p_term_id")]
    pub term_id: i64,
    #[serde(rename = "p_dicIds")]
    pub dic_ids: String,
    pub idx: i64,
    pub chart_type: ChartKind,
    #[serde(default)]
    pub folder_id: Option<i64>,
    pub selected_data: String,
    pub primary_data: String,
}

impl Widget {
    /// Decode the stored row snapshot.
    pub fn rows(&self) -> Result<Vec<Row>, ShapeError> {
        serde_json::from_str(&self.selected_data).map_err(|e| ShapeError::DataParse(e.to_string()))
    }

    /// Decode the stored metadata snapshot.
    pub fn primary(&self) -> Result<PrimaryMetadata, ShapeError> {
        serde_json::from_str(&self.primary_data)
            .map_err(|e| ShapeError::MetadataParse(e.to_string()))
    }
}

/// Payload for saving a new widget.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetDraft {
    #[serde(rename = "p_index_id")]
    pub index_id: i64,
    #[serde(rename = "p_period_id")]
    pub period_id: i64,
    #[serde(rename = "p_terms")]
    pub terms: String,
    #[serde(rename = "p_term_id")]
    pub term_id: i64,
    #[serde(rename = "p_dicIds")]
    pub dic_ids: String,
    pub idx: i64,
    pub chart_type: ChartKind,
    /// Target folder; 0 files the widget under the root.
    pub folder_id: i64,
    pub selected_data: String,
    pub primary_data: String,
}

/// Query for the report tree endpoint. `terms` and `dic_ids` stay in the
/// comma-joined form the segment lookup returns them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeQuery {
    pub measure_id: i64,
    pub index_id: i64,
    pub period_id: i64,
    pub terms: String,
    pub term_id: i64,
    pub dic_ids: String,
    pub idx: i64,
    /// Element to expand; empty fetches the top level.
    pub parent_id: String,
}

impl Default for TreeQuery {
    fn default() -> Self {
        Self {
            measure_id: 1,
            index_id: 0,
            period_id: 0,
            terms: String::new(),
            term_id: 0,
            dic_ids: String::new(),
            idx: 0,
            parent_id: String::new(),
        }
    }
}

/// Serde helper: parse `i64` from either a JSON number or a string.
fn de_i64_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v as i64)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<i64>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(I64Visitor)
}
