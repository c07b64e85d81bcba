//! Single-value and delimited multi-value lookup validation.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use tracing::debug;

use intake_model::RowId;

use crate::column_reader::ColumnReader;
use crate::error::{CheckError, Result};

/// How cell values and reference values are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// Compare trimmed values exactly.
    #[default]
    Trim,
    /// Compare trimmed values ignoring case.
    TrimCaseInsensitive,
}

impl Normalization {
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Trim => value.trim().to_string(),
            Self::TrimCaseInsensitive => value.trim().to_lowercase(),
        }
    }
}

/// What a missing or blank cell means for a lookup column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Blank cells are not checked (another rule owns required-ness).
    Exempt,
    /// Blank cells are invalid.
    Flag,
}

#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub normalization: Normalization,
    pub missing: MissingPolicy,
    /// Token separator for multi-value cells.
    pub delimiter: String,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            normalization: Normalization::Trim,
            missing: MissingPolicy::Exempt,
            delimiter: ",".to_string(),
        }
    }
}

impl LookupOptions {
    #[must_use]
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    #[must_use]
    pub fn with_missing(mut self, missing: MissingPolicy) -> Self {
        self.missing = missing;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    fn normalized_reference<'s, I>(&self, reference: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'s String>,
    {
        reference
            .into_iter()
            .map(|v| self.normalization.apply(v))
            .collect()
    }
}

/// Row ids whose value in `column` is not in `reference`.
pub fn invalid_lookup_rows(
    table: &str,
    df: &DataFrame,
    column: &str,
    reference: &BTreeSet<String>,
    options: &LookupOptions,
) -> Result<Vec<RowId>> {
    let reader = ColumnReader::checked(table, df, &[column])?;
    let allowed = options.normalized_reference(reference);

    let bad = reader.row_ids_where(|row| {
        if row.is_missing(column) {
            return options.missing == MissingPolicy::Flag;
        }
        !allowed.contains(&options.normalization.apply(&row.str(column)))
    })?;
    debug!(table, column, flagged = bad.len(), "lookup");
    Ok(bad)
}

/// Split a delimited cell into trimmed, non-empty tokens.
pub fn split_tokens<'v>(value: &'v str, delimiter: &str) -> Vec<&'v str> {
    value
        .split(delimiter)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Row ids whose delimited tokens in `column` are not all in `reference`.
///
/// A cell with no tokens is treated as missing and handled by
/// [`LookupOptions::missing`].
pub fn invalid_multi_value_rows(
    table: &str,
    df: &DataFrame,
    column: &str,
    reference: &BTreeSet<String>,
    options: &LookupOptions,
) -> Result<Vec<RowId>> {
    if options.delimiter.is_empty() {
        return Err(CheckError::invalid_argument(
            "multi-value lookup delimiter must not be empty",
        ));
    }
    let reader = ColumnReader::checked(table, df, &[column])?;
    let allowed = options.normalized_reference(reference);

    let bad = reader.row_ids_where(|row| {
        let value = if row.is_missing(column) {
            String::new()
        } else {
            row.str(column)
        };
        let tokens = split_tokens(&value, &options.delimiter);
        if tokens.is_empty() {
            return options.missing == MissingPolicy::Flag;
        }
        tokens
            .iter()
            .any(|t| !allowed.contains(&options.normalization.apply(t)))
    })?;
    debug!(table, column, flagged = bad.len(), "multi-value lookup");
    Ok(bad)
}
