//! CSV loading for submission tables.
//!
//! Spreadsheet parsing happens upstream; the checker receives one CSV per
//! table, named `<table>.csv`.

use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::table_set::TableSet;

/// Canonical column name: trimmed, BOM stripped, inner whitespace collapsed, lowercase.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Read one CSV into a frame with normalized column names.
pub fn read_csv_frame(path: &Path) -> Result<DataFrame> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_header(name.as_str()))
        .collect();
    df.set_column_names(names)?;
    Ok(df)
}

/// Load `<table>.csv` from `dir` for each requested table.
///
/// Tables without a file are skipped with a warning; the rule engine reports
/// them against the module that needs them.
pub fn load_submission<S: AsRef<str>>(dir: &Path, tables: &[S]) -> Result<TableSet> {
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        files.push(entry.path());
    }

    let mut set = TableSet::new();
    for table in tables {
        let table = table.as_ref();
        let found = files.iter().find(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.eq_ignore_ascii_case(table))
        });
        let Some(path) = found else {
            warn!(table, dir = %dir.display(), "no CSV file for table");
            continue;
        };
        let df = read_csv_frame(path)?;
        debug!(table, path = %path.display(), rows = df.height(), "loaded table");
        set.insert(table, df)?;
    }
    Ok(set)
}
