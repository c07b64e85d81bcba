//! Column reader utilities for primitives.
//!
//! `ColumnReader` wraps a frame together with the table name it came from so
//! precondition errors can name the table. Cells are read as trimmed strings
//! or as `f64`; rows are addressed by frame position and reported by
//! [`RowId`], read from the identity column.

use polars::prelude::{AnyValue, BooleanChunked, Column, DataFrame, NewChunkedArray};

use intake_common::{any_to_f64, any_to_string, is_missing_value};
use intake_ingest::{ROW_ID_COLUMN, row_id_at};
use intake_model::RowId;

use crate::error::{CheckError, Result};

#[derive(Debug, Clone, Copy)]
pub struct ColumnReader<'a> {
    table: &'a str,
    df: &'a DataFrame,
}

impl<'a> ColumnReader<'a> {
    #[inline]
    pub fn new(table: &'a str, df: &'a DataFrame) -> Self {
        Self { table, df }
    }

    /// Reader over a frame whose columns have already been checked.
    pub fn checked(table: &'a str, df: &'a DataFrame, columns: &[&str]) -> Result<Self> {
        require_columns(table, df, columns)?;
        Ok(Self::new(table, df))
    }

    #[inline]
    pub fn table(&self) -> &'a str {
        self.table
    }

    #[inline]
    pub fn frame(&self) -> &'a DataFrame {
        self.df
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.df.height()
    }

    #[inline]
    pub fn column(&self, name: &str) -> Option<&'a Column> {
        self.df.column(name).ok()
    }

    #[inline]
    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    fn cell(&self, column: &str, row_idx: usize) -> AnyValue<'a> {
        self.column(column)
            .and_then(|c| c.get(row_idx).ok())
            .unwrap_or(AnyValue::Null)
    }

    /// Trimmed string value; empty for nulls, absent columns, or out-of-range rows.
    pub fn get_string(&self, column: &str, row_idx: usize) -> String {
        any_to_string(self.cell(column, row_idx)).trim().to_string()
    }

    pub fn get_f64(&self, column: &str, row_idx: usize) -> Option<f64> {
        any_to_f64(self.cell(column, row_idx))
    }

    pub fn is_missing(&self, column: &str, row_idx: usize) -> bool {
        is_missing_value(&self.cell(column, row_idx))
    }

    /// Identity of the row at `row_idx`.
    pub fn row_id(&self, row_idx: usize) -> Result<RowId> {
        Ok(row_id_at(self.df, row_idx)?)
    }

    /// Identities of every row, in frame order.
    pub fn row_ids(&self) -> Result<Vec<RowId>> {
        (0..self.height()).map(|idx| self.row_id(idx)).collect()
    }

    /// Identities of the rows at the given positions.
    pub fn row_ids_at<I>(&self, positions: I) -> Result<Vec<RowId>>
    where
        I: IntoIterator<Item = usize>,
    {
        positions.into_iter().map(|idx| self.row_id(idx)).collect()
    }

    pub fn row(&self, row_idx: usize) -> RowView<'_, 'a> {
        RowView {
            reader: self,
            idx: row_idx,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_, 'a>> {
        (0..self.height()).map(|idx| self.row(idx))
    }

    /// Positions of rows matching `predicate`.
    pub fn positions_where<F>(&self, predicate: F) -> Vec<usize>
    where
        F: Fn(&RowView<'_, 'a>) -> bool,
    {
        self.rows()
            .filter(|row| predicate(row))
            .map(|row| row.position())
            .collect()
    }

    /// Identities of rows matching `predicate`.
    pub fn row_ids_where<F>(&self, predicate: F) -> Result<Vec<RowId>>
    where
        F: Fn(&RowView<'_, 'a>) -> bool,
    {
        self.row_ids_at(self.positions_where(predicate))
    }
}

/// One row of a [`ColumnReader`], addressed by position.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'r, 'a> {
    reader: &'r ColumnReader<'a>,
    idx: usize,
}

impl RowView<'_, '_> {
    #[inline]
    pub fn position(&self) -> usize {
        self.idx
    }

    pub fn str(&self, column: &str) -> String {
        self.reader.get_string(column, self.idx)
    }

    pub fn f64(&self, column: &str) -> Option<f64> {
        self.reader.get_f64(column, self.idx)
    }

    pub fn is_missing(&self, column: &str) -> bool {
        self.reader.is_missing(column, self.idx)
    }

    /// Case-insensitive substring test on a string cell.
    pub fn contains_ci(&self, column: &str, needle: &str) -> bool {
        self.str(column)
            .to_lowercase()
            .contains(&needle.to_lowercase())
    }

    pub fn row_id(&self) -> Result<RowId> {
        self.reader.row_id(self.idx)
    }
}

/// Fail with [`CheckError::MissingColumn`] unless every column is present.
///
/// The identity column is always required.
pub fn require_columns(table: &str, df: &DataFrame, columns: &[&str]) -> Result<()> {
    let missing: Vec<String> = std::iter::once(ROW_ID_COLUMN)
        .chain(columns.iter().copied())
        .filter(|c| df.column(c).is_err())
        .map(str::to_string)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CheckError::MissingColumn {
            table: table.to_string(),
            columns: missing,
        })
    }
}

/// Derived frame holding the rows that match `predicate`.
///
/// The identity column travels with the rows.
pub fn filter_rows<F>(table: &str, df: &DataFrame, predicate: F) -> Result<DataFrame>
where
    F: Fn(&RowView<'_, '_>) -> bool,
{
    require_columns(table, df, &[])?;
    let reader = ColumnReader::new(table, df);
    let mask: Vec<bool> = reader.rows().map(|row| predicate(&row)).collect();
    let mask = BooleanChunked::from_slice("mask".into(), &mask);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_ingest::assign_row_id;
    use polars::prelude::*;

    fn results() -> DataFrame {
        let df = df! {
            "sampletype" => &["Result", "Matrix spike", "Reference Material", "Result"],
            "result" => &[Some(1.5), None, Some(3.0), Some(0.0)],
        }
        .unwrap();
        assign_row_id("tbl_chemresults", df).unwrap()
    }

    #[test]
    fn filtered_frame_keeps_identity() {
        let df = results();
        let spikes = filter_rows("tbl_chemresults", &df, |row| {
            row.contains_ci("sampletype", "spike") || row.contains_ci("sampletype", "reference")
        })
        .unwrap();
        let reader = ColumnReader::new("tbl_chemresults", &spikes);
        assert_eq!(reader.row_ids().unwrap(), vec![RowId(1), RowId(2)]);
    }

    #[test]
    fn missing_columns_are_reported_together() {
        let df = results();
        let err = require_columns("tbl_chemresults", &df, &["result", "truevalue", "units"])
            .unwrap_err();
        match err {
            CheckError::MissingColumn { table, columns } => {
                assert_eq!(table, "tbl_chemresults");
                assert_eq!(columns, vec!["truevalue", "units"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn frame_without_identity_is_rejected() {
        let df = df! { "lab" => &["A"] }.unwrap();
        assert!(require_columns("t", &df, &["lab"]).is_err());
    }

    #[test]
    fn cells_read_as_trimmed_strings_and_numbers() {
        let df = results();
        let reader = ColumnReader::new("tbl_chemresults", &df);
        assert_eq!(reader.get_string("sampletype", 1), "Matrix spike");
        assert_eq!(reader.get_f64("result", 0), Some(1.5));
        assert!(reader.is_missing("result", 1));
        assert_eq!(reader.get_string("nope", 0), "");
        assert_eq!(reader.get_string("sampletype", 99), "");
    }
}
