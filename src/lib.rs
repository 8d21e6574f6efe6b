//! svodka_rs
//!
//! A lightweight Rust library for fetching, shaping, visualizing, and saving
//! statistical report widgets. Pairs with the `svodka` CLI.
//!
//! ### Features
//! - Fetch indicator, period, and classification lookups plus report tree
//!   rows from the reporting gateway
//! - Shape rows into chart payloads (line, bar, pie, doughnut) and the
//!   matching table view through one shared core
//! - Format numbers the same way in tables, tick labels, and data labels
//! - Render charts to SVG; save tables as CSV or JSON
//! - Manage saved widgets and folders on the gateway
//!
//! ### Example
//! ```no_run
//! use svodka_rs::models::{ChartConfig, ChartKind, decode_rows};
//! use svodka_rs::{chart, viz};
//!
//! let rows = decode_rows(&serde_json::json!([
//!     { "text": "Регион А", "2020 год": "100", "2021 год": "200" }
//! ]))?;
//! let config = ChartConfig::default();
//! let payload = chart::shape(&rows, ChartKind::Line, &config)?;
//! viz::render_chart(
//!     &payload,
//!     ChartKind::Line,
//!     "report.svg",
//!     1000,
//!     600,
//!     "Показатель",
//!     "млн рублей",
//!     config.number_format,
//! )?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod chart;
pub mod error;
pub mod format;
pub mod models;
pub mod storage;
pub mod style;
pub mod viz;

pub use api::Client;
pub use error::ShapeError;
pub use models::{ChartConfig, ChartKind, NumberFormat, PrimaryMetadata, Row, Window};
