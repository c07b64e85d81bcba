use polars::prelude::DataFrame;

use intake_model::{Finding, FindingRequest};

use crate::column_reader::{ColumnReader, RowView};
use crate::error::Result;
use crate::recorder::{FindingSink, record};

/// Flag every row for which `predicate` holds.
///
/// `columns` lists the cells the predicate reads; each must exist.
pub fn flag_rows<F>(
    table: &str,
    df: &DataFrame,
    columns: &[&str],
    request: &FindingRequest,
    sink: Option<&FindingSink>,
    predicate: F,
) -> Result<Option<Finding>>
where
    F: Fn(&RowView<'_, '_>) -> bool,
{
    let reader = ColumnReader::checked(table, df, columns)?;
    let rows = reader.row_ids_where(predicate)?;
    Ok(record(request, rows, sink))
}
