//! Submission tables and their row identity.
//!
//! Every table enters the checker through [`TableSet`], which assigns the
//! [`ROW_ID_COLUMN`] exactly once. Checks report that column, never a frame
//! position.

pub mod csv_table;
pub mod error;
pub mod row_id;
pub mod table_set;

pub use csv_table::{load_submission, normalize_header, read_csv_frame};
pub use error::{IngestError, Result};
pub use row_id::{ROW_ID_COLUMN, assign_row_id, has_row_id, row_id_at, row_ids};
pub use table_set::TableSet;
