//! Typed finding builder.
//!
//! A `FindingRequest` is built once per check and specialised with the
//! consuming `with_*` methods. Each call returns a new value, so a column label
//! or message set for one finding cannot leak into the next.

use std::collections::{BTreeMap, BTreeSet};

use crate::finding::{Category, Finding, RowId, Severity};

#[derive(Debug, Clone, PartialEq)]
pub struct FindingRequest {
    table: String,
    columns: String,
    severity: Severity,
    category: Category,
    message: String,
    is_core_error: bool,
    group: BTreeMap<String, String>,
}

impl FindingRequest {
    /// Start a request for `table`; the message defaults to the category label.
    pub fn new(table: impl Into<String>, severity: Severity, category: Category) -> Self {
        Self {
            table: table.into(),
            columns: String::new(),
            severity,
            category,
            message: category.label().to_string(),
            is_core_error: false,
            group: BTreeMap::new(),
        }
    }

    pub fn error(table: impl Into<String>, category: Category) -> Self {
        Self::new(table, Severity::Error, category)
    }

    pub fn warning(table: impl Into<String>, category: Category) -> Self {
        Self::new(table, Severity::Warning, category)
    }

    #[must_use]
    pub fn with_columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn core_error(mut self, is_core_error: bool) -> Self {
        self.is_core_error = is_core_error;
        self
    }

    /// Replace the structured group key.
    #[must_use]
    pub fn with_group<I, K, V>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.group = group
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &str {
        &self.columns
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Materialize a finding for `rows`; `None` when `rows` is empty.
    pub fn finding<I>(&self, rows: I) -> Option<Finding>
    where
        I: IntoIterator<Item = RowId>,
    {
        let rows: BTreeSet<RowId> = rows.into_iter().collect();
        if rows.is_empty() {
            return None;
        }
        Some(Finding {
            table: self.table.clone(),
            rows,
            columns: self.columns.clone(),
            severity: self.severity,
            category: self.category,
            message: self.message.clone(),
            is_core_error: self.is_core_error,
            group: self.group.clone(),
        })
    }

    /// Materialize a module-level diagnostic with no rows to highlight.
    ///
    /// Used only when a rule module could not run at all, so there is no row
    /// set to report.
    pub fn diagnostic(&self) -> Finding {
        Finding {
            table: self.table.clone(),
            rows: BTreeSet::new(),
            columns: self.columns.clone(),
            severity: self.severity,
            category: self.category,
            message: self.message.clone(),
            is_core_error: self.is_core_error,
            group: self.group.clone(),
        }
    }
}
