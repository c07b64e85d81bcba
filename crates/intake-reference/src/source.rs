use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReferenceError;
use crate::table::{ReferenceRow, ReferenceTable};

/// Read-only access to reference tables for one validation run.
///
/// Implementations must not change between calls within a run, so callers
/// may cache whatever they read.
pub trait ReferenceSource: Send + Sync {
    fn table(&self, name: &str) -> Option<&ReferenceTable>;

    fn require(&self, name: &str) -> Result<&ReferenceTable, ReferenceError> {
        self.table(name).ok_or_else(|| ReferenceError::UnknownTable {
            name: name.to_string(),
        })
    }

    fn values(&self, name: &str, column: &str) -> Result<BTreeSet<String>, ReferenceError> {
        self.require(name)?.values(column)
    }

    fn values_where(
        &self,
        name: &str,
        column: &str,
        predicate: &dyn Fn(&ReferenceRow) -> bool,
    ) -> Result<BTreeSet<String>, ReferenceError> {
        self.require(name)?.values_where(column, predicate)
    }
}

/// In-memory reference store keyed by lowercase table name.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    tables: BTreeMap<String, ReferenceTable>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, table: ReferenceTable) -> Result<(), ReferenceError> {
        let key = table.name().to_lowercase();
        if self.tables.contains_key(&key) {
            return Err(ReferenceError::DuplicateTable { name: key });
        }
        self.tables.insert(key, table);
        Ok(())
    }

    /// Builder-style insert; a duplicate name replaces the earlier table.
    #[must_use]
    pub fn with_table(mut self, table: ReferenceTable) -> Self {
        self.tables.insert(table.name().to_lowercase(), table);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl ReferenceSource for ReferenceStore {
    fn table(&self, name: &str) -> Option<&ReferenceTable> {
        self.tables.get(&name.to_lowercase())
    }
}
