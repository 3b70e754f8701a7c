// CSV decoding into entity tables
use crate::domain::table::{CellValue, Table, ENTITY_KEY};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP Error {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line} has {found} fields, expected {expected}")]
    RowWidth {
        line: u64,
        found: usize,
        expected: usize,
    },
}

/// Decode a CSV document whose first record is the header. The first column
/// becomes the entity key when the sheet has any rows.
pub fn decode(text: &str) -> Result<Table, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = Table::new(columns);
    for record in reader.records() {
        let record = record?;
        if record.len() > table.columns().len() {
            return Err(SheetError::RowWidth {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                found: record.len(),
                expected: table.columns().len(),
            });
        }
        table.push_row(record.iter().map(CellValue::parse).collect());
    }

    if !table.is_empty() {
        table.rename_column(0, ENTITY_KEY);
    }

    Ok(table)
}
