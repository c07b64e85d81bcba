use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::row_id::{ROW_ID_COLUMN, assign_row_id, has_row_id};

/// The named tables of one submission, each carrying its row identity.
///
/// Table names are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct TableSet {
    tables: BTreeMap<String, DataFrame>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a freshly loaded table and assign its row ids.
    pub fn insert(&mut self, name: &str, df: DataFrame) -> Result<()> {
        let key = name.to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(IngestError::DuplicateTable { table: key });
        }
        let df = assign_row_id(&key, df)?;
        debug!(table = %key, rows = df.height(), "table registered");
        self.tables.insert(key, df);
        Ok(())
    }

    /// Add a table whose identity column was assigned elsewhere.
    pub fn insert_identified(&mut self, name: &str, df: DataFrame) -> Result<()> {
        let key = name.to_lowercase();
        if !has_row_id(&df) {
            return Err(IngestError::MissingRowId {
                column: ROW_ID_COLUMN.to_string(),
            });
        }
        if self.tables.contains_key(&key) {
            return Err(IngestError::DuplicateTable { table: key });
        }
        self.tables.insert(key, df);
        Ok(())
    }

    /// Builder-style insert, for tests and fixtures.
    pub fn with_table(mut self, name: &str, df: DataFrame) -> Result<Self> {
        self.insert(name, df)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&DataFrame> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn require(&self, name: &str) -> Result<&DataFrame> {
        self.get(name).ok_or_else(|| IngestError::MissingTable {
            table: name.to_lowercase(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataFrame)> {
        self.tables.iter().map(|(name, df)| (name.as_str(), df))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
