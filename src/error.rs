use thiserror::Error;

/// Errors raised while decoding widget payloads and shaping them for display.
#[derive(Error, Debug)]
pub enum ShapeError {
    /// The row payload was not a JSON array of row objects (inline or
    /// string-encoded).
    #[error("data parsing error: {0}")]
    DataParse(String),
    /// The primary metadata payload was not a JSON object (inline or
    /// string-encoded).
    #[error("metadata parsing error: {0}")]
    MetadataParse(String),
    /// There are no rows to display.
    #[error("no data to display")]
    NoData,
}
