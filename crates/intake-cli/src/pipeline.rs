//! Load reference data and a submission, then run the dataset's rule modules.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use intake_ingest::load_submission;
use intake_model::{DatasetSpec, RuleResult};
use intake_reference::{ReferenceBundle, default_config_path};
use intake_rules::{builtin_datasets, modules_for};
use intake_validate::{RuleEngine, ValidationContext, ValidationRun};

#[derive(Debug)]
pub struct CheckOutcome {
    pub submission_id: String,
    pub dataset: DatasetSpec,
    pub run: ValidationRun,
    pub elapsed: Duration,
}

impl CheckOutcome {
    pub fn has_errors(&self) -> bool {
        self.run.has_errors()
    }

    pub fn combined(&self) -> RuleResult {
        self.run.combined()
    }
}

/// Load the manifest at `config`, or at the default location.
pub fn load_bundle(config: Option<&Path>) -> Result<ReferenceBundle> {
    let path = config.map_or_else(default_config_path, Path::to_path_buf);
    ReferenceBundle::load(&path)
        .with_context(|| format!("load reference manifest {}", path.display()))
}

/// Configured datasets, or the built-in ones when the manifest declares none.
pub fn available_datasets(bundle: &ReferenceBundle) -> Vec<DatasetSpec> {
    if bundle.datasets.is_empty() {
        builtin_datasets()
    } else {
        bundle.datasets.clone()
    }
}

pub fn resolve_dataset(bundle: &ReferenceBundle, name: &str) -> Result<DatasetSpec> {
    available_datasets(bundle)
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
        .with_context(|| format!("unknown dataset type: {name}"))
}

/// Folder name of the submission, used when no explicit id is given.
pub fn derive_submission_id(dir: &Path) -> String {
    dir.file_name()
        .and_then(|v| v.to_str())
        .map_or_else(|| "submission".to_string(), str::to_string)
}

pub fn check_submission(
    bundle: &ReferenceBundle,
    submission_dir: &Path,
    dataset: &str,
    submission_id: Option<&str>,
) -> Result<CheckOutcome> {
    let start = Instant::now();
    let submission_id = submission_id.map_or_else(|| derive_submission_id(submission_dir), str::to_string);
    let span = info_span!("check", submission = %submission_id, dataset);
    let _guard = span.enter();

    let spec = resolve_dataset(bundle, dataset)?;
    let modules = modules_for(&spec.name);
    if modules.is_empty() {
        bail!("no rule modules are registered for dataset {}", spec.name);
    }

    let mut tables: Vec<String> = spec.tables.clone();
    for module in &modules {
        for table in module.tables() {
            if !tables.iter().any(|t| t.eq_ignore_ascii_case(table)) {
                warn!(table, dataset = %spec.name, "table used by a rule module is not declared for the dataset");
                tables.push((*table).to_string());
            }
        }
    }

    let mut engine = RuleEngine::new();
    for module in modules {
        engine.register(module);
    }

    let submission = load_submission(submission_dir, tables.as_slice())
        .with_context(|| format!("load submission {}", submission_dir.display()))?;
    info!(tables = submission.len(), "submission loaded");

    let mut ctx = ValidationContext::new(submission_id.clone(), &bundle.store);
    if let Some(boundaries) = &bundle.boundaries {
        ctx = ctx.with_boundaries(boundaries);
    }
    let run = engine.run(&ctx, &submission);

    Ok(CheckOutcome {
        submission_id,
        dataset: spec,
        run,
        elapsed: start.elapsed(),
    })
}
