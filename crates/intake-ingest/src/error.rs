use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    #[error("table {table} already carries a {column} column")]
    RowIdAlreadyAssigned { table: String, column: String },

    #[error("frame has no {column} column; it was not loaded through a TableSet")]
    MissingRowId { column: String },

    #[error("row {position} has an invalid row id")]
    InvalidRowId { position: usize },

    #[error("table {table} was loaded twice")]
    DuplicateTable { table: String },

    #[error("table {table} is not part of this submission")]
    MissingTable { table: String },

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
