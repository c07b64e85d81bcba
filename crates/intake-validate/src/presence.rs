//! Group-wise required-value presence.

use std::collections::BTreeSet;

use polars::prelude::DataFrame;
use tracing::debug;

use intake_model::{Finding, FindingRequest};

use crate::column_reader::{ColumnReader, RowView, require_columns};
use crate::error::Result;
use crate::grouping::group_rows;
use crate::recorder::{FindingSink, record};

type RowFilter<'a> = Box<dyn Fn(&RowView<'_, '_>) -> bool + 'a>;

/// Every group must contain each of a set of required values in one column.
///
/// For a group whose observed values leave some required value uncovered, one
/// finding covers every row of the group and names the missing values in
/// sorted order.
pub struct RequiredPerGroup<'a> {
    group_by: &'a [&'a str],
    column: &'a str,
    required: BTreeSet<String>,
    filter: Option<RowFilter<'a>>,
}

impl<'a> RequiredPerGroup<'a> {
    pub fn new<I, S>(group_by: &'a [&'a str], column: &'a str, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group_by,
            column,
            required: required.into_iter().map(Into::into).collect(),
            filter: None,
        }
    }

    /// Only rows matching `filter` take part. No matching rows means the rule
    /// does not apply to the submission.
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RowView<'_, '_>) -> bool + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn check(
        &self,
        table: &str,
        df: &DataFrame,
        request: &FindingRequest,
        sink: Option<&FindingSink>,
    ) -> Result<Vec<Finding>> {
        let mut columns = self.group_by.to_vec();
        columns.push(self.column);
        let reader = ColumnReader::checked(table, df, &columns)?;

        let positions = match &self.filter {
            Some(filter) => reader.positions_where(|row| filter(row)),
            None => (0..reader.height()).collect(),
        };
        if positions.is_empty() || self.required.is_empty() {
            return Ok(Vec::new());
        }

        let groups = group_rows(&reader, self.group_by, positions)?;
        let mut findings = Vec::new();
        for (key, rows) in groups.iter() {
            let observed: BTreeSet<String> = rows
                .iter()
                .map(|&idx| reader.get_string(self.column, idx))
                .collect();
            let missing: Vec<&str> = self
                .required
                .difference(&observed)
                .map(String::as_str)
                .collect();
            if missing.is_empty() {
                continue;
            }
            let request = request
                .clone()
                .with_message(format!(
                    "For {key}, you are missing the required {} values: {}",
                    self.column,
                    missing.join(", ")
                ))
                .with_group(key.to_map());
            findings.extend(record(&request, reader.row_ids_at(rows.iter().copied())?, sink));
        }
        debug!(
            table,
            column = self.column,
            groups = groups.len(),
            flagged = findings.len(),
            "required values per group"
        );
        Ok(findings)
    }
}

/// Every group must contain at least one row matching a predicate (for
/// example a certified reference material row in each analysis batch).
///
/// Groups without such a row are flagged whole; the finding message is the
/// request message prefixed with the group key.
pub struct RequireAnyPerGroup<'a> {
    group_by: &'a [&'a str],
    columns: &'a [&'a str],
    predicate: RowFilter<'a>,
    filter: Option<RowFilter<'a>>,
}

impl<'a> RequireAnyPerGroup<'a> {
    /// `columns` lists the cells `predicate` reads, so they are checked up front.
    pub fn new<P>(group_by: &'a [&'a str], columns: &'a [&'a str], predicate: P) -> Self
    where
        P: Fn(&RowView<'_, '_>) -> bool + 'a,
    {
        Self {
            group_by,
            columns,
            predicate: Box::new(predicate),
            filter: None,
        }
    }

    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&RowView<'_, '_>) -> bool + 'a,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn check(
        &self,
        table: &str,
        df: &DataFrame,
        request: &FindingRequest,
        sink: Option<&FindingSink>,
    ) -> Result<Vec<Finding>> {
        let mut columns = self.group_by.to_vec();
        columns.extend_from_slice(self.columns);
        require_columns(table, df, &columns)?;
        let reader = ColumnReader::new(table, df);

        let positions = match &self.filter {
            Some(filter) => reader.positions_where(|row| filter(row)),
            None => (0..reader.height()).collect(),
        };
        if positions.is_empty() {
            return Ok(Vec::new());
        }

        let groups = group_rows(&reader, self.group_by, positions)?;
        let mut findings = Vec::new();
        for (key, rows) in groups.iter() {
            if rows.iter().any(|&idx| (self.predicate)(&reader.row(idx))) {
                continue;
            }
            let request = request
                .clone()
                .with_message(format!("For {key}, {}", request.message()))
                .with_group(key.to_map());
            findings.extend(record(&request, reader.row_ids_at(rows.iter().copied())?, sink));
        }
        debug!(table, groups = groups.len(), flagged = findings.len(), "required row per group");
        Ok(findings)
    }
}
