//! Stable row identity.
//!
//! The identity column is added by [`assign_row_id`] when a table is loaded and
//! holds the row's 0-based position in the upload. Filtering, sorting, or
//! joining a frame moves rows around but leaves this column untouched, so
//! [`row_ids`] on a derived frame still names the uploaded rows.

use polars::prelude::{AnyValue, DataFrame};

use intake_common::any_to_i64;
use intake_model::RowId;

use crate::error::{IngestError, Result};

/// Name of the identity column added to every loaded table.
pub const ROW_ID_COLUMN: &str = "row_id";

/// Add the identity column to a freshly loaded table.
///
/// Fails if the frame already has one: identity is assigned once, at load.
pub fn assign_row_id(table: &str, df: DataFrame) -> Result<DataFrame> {
    if has_row_id(&df) {
        return Err(IngestError::RowIdAlreadyAssigned {
            table: table.to_string(),
            column: ROW_ID_COLUMN.to_string(),
        });
    }
    Ok(df.with_row_index(ROW_ID_COLUMN.into(), None)?)
}

pub fn has_row_id(df: &DataFrame) -> bool {
    df.column(ROW_ID_COLUMN).is_ok()
}

/// Row id of the row at `position` in `df` (which may be a derived frame).
pub fn row_id_at(df: &DataFrame, position: usize) -> Result<RowId> {
    let column = df
        .column(ROW_ID_COLUMN)
        .map_err(|_| IngestError::MissingRowId {
            column: ROW_ID_COLUMN.to_string(),
        })?;
    let value = column.get(position).unwrap_or(AnyValue::Null);
    any_to_i64(value)
        .and_then(|v| u32::try_from(v).ok())
        .map(RowId)
        .ok_or(IngestError::InvalidRowId { position })
}

/// Row ids of every row of `df`, in frame order.
pub fn row_ids(df: &DataFrame) -> Result<Vec<RowId>> {
    (0..df.height()).map(|idx| row_id_at(df, idx)).collect()
}
