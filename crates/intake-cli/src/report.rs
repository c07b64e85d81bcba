//! JSON report of one check.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use intake_model::RuleResult;
use intake_validate::ModuleStatus;

use crate::pipeline::CheckOutcome;

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub submission_id: &'a str,
    pub dataset: &'a str,
    pub generated_at: String,
    pub modules: Vec<ModuleReport<'a>>,
    #[serde(flatten)]
    pub result: RuleResult,
}

#[derive(Debug, Serialize)]
pub struct ModuleReport<'a> {
    pub module: &'a str,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'a str>,
    pub errors: usize,
    pub warnings: usize,
}

impl<'a> JsonReport<'a> {
    pub fn from_outcome(outcome: &'a CheckOutcome) -> Self {
        let modules = outcome
            .run
            .modules
            .iter()
            .map(|m| ModuleReport {
                module: &m.module,
                completed: !m.is_failed(),
                failure: match &m.status {
                    ModuleStatus::Completed => None,
                    ModuleStatus::Failed { reason } => Some(reason.as_str()),
                },
                errors: m.result.error_count(),
                warnings: m.result.warning_count(),
            })
            .collect();
        Self {
            submission_id: &outcome.submission_id,
            dataset: &outcome.dataset.name,
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            modules,
            result: outcome.combined(),
        }
    }
}

pub fn write_json_report(outcome: &CheckOutcome, path: &Path) -> Result<()> {
    let report = JsonReport::from_outcome(outcome);
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))
}
