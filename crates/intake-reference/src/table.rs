use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReferenceError;

/// One reference row: lowercase column name to trimmed value.
pub type ReferenceRow = BTreeMap<String, String>;

/// An immutable lookup list or assignment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTable {
    name: String,
    headers: Vec<String>,
    rows: Vec<ReferenceRow>,
}

impl ReferenceTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<ReferenceRow>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Build a table from literal records, for fixtures and tests.
    pub fn from_records(name: &str, headers: &[&str], records: &[&[&str]]) -> Self {
        let headers: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
        let rows = records
            .iter()
            .map(|record| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(idx, h)| (h.clone(), record.get(idx).unwrap_or(&"").to_string()))
                    .collect()
            })
            .collect();
        Self::new(name, headers, rows)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        let column = column.to_lowercase();
        self.headers.iter().any(|h| *h == column)
    }

    fn checked_column(&self, column: &str) -> Result<String, ReferenceError> {
        let column = column.to_lowercase();
        if self.headers.contains(&column) {
            Ok(column)
        } else {
            Err(ReferenceError::UnknownColumn {
                table: self.name.clone(),
                column,
            })
        }
    }

    /// Distinct non-empty values of `column`.
    pub fn values(&self, column: &str) -> Result<BTreeSet<String>, ReferenceError> {
        self.values_where(column, |_| true)
    }

    /// Distinct non-empty values of `column` over rows matching `predicate`.
    pub fn values_where<F>(&self, column: &str, predicate: F) -> Result<BTreeSet<String>, ReferenceError>
    where
        F: Fn(&ReferenceRow) -> bool,
    {
        let column = self.checked_column(column)?;
        Ok(self
            .rows
            .iter()
            .filter(|row| predicate(row))
            .filter_map(|row| row.get(&column))
            .filter(|v| !v.is_empty())
            .cloned()
            .collect())
    }

    /// First row whose `column` equals `value`.
    pub fn find(&self, column: &str, value: &str) -> Result<Option<&ReferenceRow>, ReferenceError> {
        let column = self.checked_column(column)?;
        Ok(self
            .rows
            .iter()
            .find(|row| row.get(&column).is_some_and(|v| v == value)))
    }
}
