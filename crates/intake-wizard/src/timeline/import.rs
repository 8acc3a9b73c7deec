//! CSV import of timeline entries for batch checks.

use super::{truthy, TimelineEntry};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum TimelineImportError {
    #[error("failed to read timeline export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid timeline CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: is_current value '{value}' is not a boolean")]
    InvalidFlag { row: usize, value: String },
}

pub fn entries_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<TimelineEntry>, TimelineImportError> {
    let file = std::fs::File::open(path)?;
    entries_from_csv(file)
}

/// Read entries from CSV with `start_date`, `end_date`, `is_current` headers.
///
/// Header names are matched case-insensitively with spaces treated as
/// underscores. Any other column is kept as an opaque detail.
pub fn entries_from_csv<R: Read>(reader: R) -> Result<Vec<TimelineEntry>, TimelineImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();

    let mut entries = Vec::new();
    for (row, record) in csv_reader.records().enumerate() {
        let record = record?;
        let mut entry = TimelineEntry::default();

        for (header, cell) in headers.iter().zip(record.iter()) {
            if cell.is_empty() {
                continue;
            }
            match header.as_str() {
                "start_date" => entry.start_date = Some(cell.to_string()),
                "end_date" => entry.end_date = Some(cell.to_string()),
                "is_current" => {
                    entry.is_current = truthy(&Value::String(cell.to_string())).ok_or_else(
                        || TimelineImportError::InvalidFlag {
                            row: row + 1,
                            value: cell.to_string(),
                        },
                    )?;
                }
                other => {
                    entry
                        .details
                        .insert(other.to_string(), Value::String(cell.to_string()));
                }
            }
        }

        entries.push(entry);
    }

    Ok(entries)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace([' ', '-'], "_")
}
