use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, Severity};

/// Errors and warnings produced by one rule module invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub errors: Vec<Finding>,
    pub warnings: Vec<Finding>,
}

impl RuleResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a finding under errors or warnings according to its severity.
    pub fn push(&mut self, finding: Finding) {
        match finding.severity() {
            Severity::Error => self.errors.push(finding),
            Severity::Warning => self.warnings.push(finding),
        }
    }

    /// Push every present finding; absent ones are the normal "nothing wrong" case.
    pub fn extend<I>(&mut self, findings: I)
    where
        I: IntoIterator<Item = Option<Finding>>,
    {
        for finding in findings.into_iter().flatten() {
            self.push(finding);
        }
    }

    pub fn merge(&mut self, other: RuleResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// All findings regrouped by table, errors first within each table.
    pub fn by_table(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut grouped: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in self.errors.iter().chain(self.warnings.iter()) {
            grouped.entry(finding.table()).or_default().push(finding);
        }
        grouped
    }
}
