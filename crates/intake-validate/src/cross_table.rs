//! Cross-table existence matching.
//!
//! Keys compare as trimmed strings with numbers rendered canonically, so `1`
//! and `1.0` match. A missing value on either side is replaced with
//! [`NULL_KEY`] first, which makes null equal to null.

use std::collections::HashSet;

use polars::prelude::DataFrame;
use tracing::debug;

use intake_model::RowId;

use crate::column_reader::{ColumnReader, require_columns};
use crate::error::{CheckError, Result};

/// Stand-in for a missing key value.
pub const NULL_KEY: &str = "\u{0}<null>";

/// One side of a match: a table name and its frame.
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
    pub name: &'a str,
    pub df: &'a DataFrame,
}

impl<'a> TableRef<'a> {
    pub fn new(name: &'a str, df: &'a DataFrame) -> Self {
        Self { name, df }
    }
}

/// Row ids of `source` rows whose key has no equal-valued row in `target`,
/// matching columns of the same name.
pub fn missing_matches(source: TableRef<'_>, target: TableRef<'_>, keys: &[&str]) -> Result<Vec<RowId>> {
    let pairs: Vec<(&str, &str)> = keys.iter().map(|k| (*k, *k)).collect();
    missing_matches_on(source, target, &pairs)
}

/// Like [`missing_matches`], with `(source_column, target_column)` key pairs.
///
/// Existence only: a key present many times in `target` counts once.
pub fn missing_matches_on(
    source: TableRef<'_>,
    target: TableRef<'_>,
    keys: &[(&str, &str)],
) -> Result<Vec<RowId>> {
    if keys.is_empty() {
        return Err(CheckError::invalid_argument(format!(
            "matching {} against {} requires at least one key column",
            source.name, target.name
        )));
    }
    let source_cols: Vec<&str> = keys.iter().map(|(s, _)| *s).collect();
    let target_cols: Vec<&str> = keys.iter().map(|(_, t)| *t).collect();
    require_columns(source.name, source.df, &source_cols)?;
    let target_reader = ColumnReader::new(target.name, target.df);
    let missing_target: Vec<String> = target_cols
        .iter()
        .filter(|c| !target_reader.has_column(c))
        .map(|c| (*c).to_string())
        .collect();
    if !missing_target.is_empty() {
        return Err(CheckError::MissingColumn {
            table: target.name.to_string(),
            columns: missing_target,
        });
    }

    let present: HashSet<Vec<String>> = (0..target_reader.height())
        .map(|idx| key_at(&target_reader, &target_cols, idx))
        .collect();

    let source_reader = ColumnReader::new(source.name, source.df);
    let orphans = source_reader
        .row_ids_at((0..source_reader.height()).filter(|&idx| {
            !present.contains(&key_at(&source_reader, &source_cols, idx))
        }))?;

    debug!(
        source = source.name,
        target = target.name,
        orphans = orphans.len(),
        "cross-table match"
    );
    Ok(orphans)
}

fn key_at(reader: &ColumnReader<'_>, columns: &[&str], idx: usize) -> Vec<String> {
    columns
        .iter()
        .map(|c| {
            if reader.is_missing(c, idx) {
                NULL_KEY.to_string()
            } else {
                reader.get_string(c, idx)
            }
        })
        .collect()
}
