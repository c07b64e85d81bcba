use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of an uploaded row.
///
/// Assigned once when the table is loaded (the row's 0-based position in the
/// upload) and carried through every derived frame. It is never a position in
/// a filtered or merged frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u32);

impl RowId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for RowId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Finding severity. Errors block acceptance; warnings are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Parse severity from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Finding category, independent of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Format,
    Lookup,
    Logic,
    Value,
    Range,
    MissingData,
    IncompleteData,
    Location,
    /// A rule module failed a precondition or panicked.
    Authoring,
}

impl Category {
    /// Label shown in the report layer.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Format => "Format Error",
            Self::Lookup => "Lookup Error",
            Self::Logic => "Logic Error",
            Self::Value => "Value Error",
            Self::Range => "Range Error",
            Self::MissingData => "Missing Required Data",
            Self::IncompleteData => "Incomplete Data",
            Self::Location => "Location Error",
            Self::Authoring => "Checker Authoring Error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One reported validation outcome tied to rows of one table.
///
/// Only [`FindingRequest::finding`](crate::FindingRequest::finding) builds
/// these, and only for a non-empty row set. The one exception is the
/// engine's diagnostic for a rule module that could not run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub(crate) table: String,
    pub(crate) rows: BTreeSet<RowId>,
    pub(crate) columns: String,
    pub(crate) severity: Severity,
    pub(crate) category: Category,
    pub(crate) message: String,
    pub(crate) is_core_error: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub(crate) group: BTreeMap<String, String>,
}

impl Finding {
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Row ids the report layer highlights. Empty only for module diagnostics.
    pub fn rows(&self) -> &BTreeSet<RowId> {
        &self.rows
    }

    /// Human-readable column label (may be comma-joined).
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

    pub fn is_core_error(&self) -> bool {
        self.is_core_error
    }

    /// Structured group key the finding was raised for (e.g. the analysis batch).
    pub fn group(&self) -> &BTreeMap<String, String> {
        &self.group
    }
}
