//! Precondition failures raised by primitives and rule modules.
//!
//! A `CheckError` is an authoring defect in a rule module, never a data-quality
//! finding. The engine turns one into a single authoring finding for the
//! module that raised it.

use intake_ingest::IngestError;
use intake_reference::ReferenceError;
use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("table {table} is missing required column(s): {}", columns.join(", "))]
    MissingColumn { table: String, columns: Vec<String> },

    #[error("required table not loaded: {table}")]
    MissingTable { table: String },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("grouping {table} by [{}] produced no groups", keys.join(", "))]
    EmptyGrouping { table: String, keys: Vec<String> },

    #[error("rule module {module} panicked: {message}")]
    Panicked { module: String, message: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl CheckError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckError>;
