//! CSV reading for reference tables.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::ReferenceError;
use crate::table::{ReferenceRow, ReferenceTable};

/// Read a headed CSV into a [`ReferenceTable`].
///
/// Headers are lowercased and BOM-stripped; values are trimmed.
pub fn read_reference_csv(name: &str, path: &Path) -> Result<ReferenceTable, ReferenceError> {
    let csv_error = |e: csv::Error| ReferenceError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(|h| h.trim().trim_matches('\u{feff}').to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row = ReferenceRow::new();
        for (idx, header) in headers.iter().enumerate() {
            let value = record.get(idx).unwrap_or("").trim().to_string();
            row.insert(header.clone(), value);
        }
        rows.push(row);
    }
    Ok(ReferenceTable::new(name, headers, rows))
}
