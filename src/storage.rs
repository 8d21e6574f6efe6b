use crate::chart::{ChartPayload, TemporalKey};
use crate::models::Row;
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save the windowed table as CSV with a header row. Cells keep their raw
/// values rather than display formatting, like the dashboard's spreadsheet
/// export.
pub fn save_table_csv<P: AsRef<Path>>(rows: &[Row], keys: &[TemporalKey], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let mut header = Vec::with_capacity(keys.len() + 1);
    header.push(crate::chart::NAME_COLUMN.to_string());
    header.extend(keys.iter().map(|k| k.key.clone()));
    wtr.write_record(&header)?;
    for (i, row) in rows.iter().enumerate() {
        let mut record = Vec::with_capacity(keys.len() + 1);
        record.push(row.label(i));
        for k in keys {
            record.push(row.cell_text(&k.key).unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save raw rows as a pretty JSON array.
pub fn save_rows_json<P: AsRef<Path>>(rows: &[Row], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(rows)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save a shaped chart payload as pretty JSON.
pub fn save_payload_json<P: AsRef<Path>>(payload: &ChartPayload, path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(payload)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
