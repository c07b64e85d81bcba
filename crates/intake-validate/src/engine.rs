//! Rule-module trait and the concurrent engine.
//!
//! Every registered module runs on its own scoped thread against the same
//! immutable tables and reference data. The run returns only after every
//! module has finished. A module that errors or panics contributes exactly one
//! authoring finding and never affects the others.
//!
//! Findings a module records are held back until it completes, so a streaming
//! consumer never sees part of a failed module's output.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread;
use std::time::Instant;

use tracing::{Span, info, info_span, warn};

use intake_ingest::TableSet;
use intake_model::{Category, Finding, FindingRequest, RuleResult};

use crate::context::ValidationContext;
use crate::error::CheckError;

/// One dataset's set of business rules, built from the primitives.
pub trait RuleModule: Send + Sync {
    fn name(&self) -> &str;

    /// Tables that must be loaded before [`check`](Self::check) runs.
    fn tables(&self) -> &[&'static str];

    fn check(&self, ctx: &ValidationContext<'_>, tables: &TableSet) -> Result<RuleResult, CheckError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleStatus {
    Completed,
    /// The module did not complete; its result holds one authoring finding.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRun {
    pub module: String,
    pub status: ModuleStatus,
    pub result: RuleResult,
}

impl ModuleRun {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, ModuleStatus::Failed { .. })
    }
}

/// Results of every module for one submission, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRun {
    pub submission_id: String,
    pub modules: Vec<ModuleRun>,
}

impl ValidationRun {
    /// All modules' findings in one result.
    pub fn combined(&self) -> RuleResult {
        let mut combined = RuleResult::new();
        for module in &self.modules {
            combined.merge(module.result.clone());
        }
        combined
    }

    pub fn has_errors(&self) -> bool {
        self.modules.iter().any(|m| m.result.has_errors())
    }

    pub fn failed_modules(&self) -> impl Iterator<Item = &ModuleRun> {
        self.modules.iter().filter(|m| m.is_failed())
    }
}

#[derive(Default)]
pub struct RuleEngine {
    modules: Vec<Box<dyn RuleModule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Box<dyn RuleModule>) {
        self.modules.push(module);
    }

    #[must_use]
    pub fn with_module<M: RuleModule + 'static>(mut self, module: M) -> Self {
        self.register(Box::new(module));
        self
    }

    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Run every module concurrently and wait for all of them.
    pub fn run(&self, ctx: &ValidationContext<'_>, tables: &TableSet) -> ValidationRun {
        let span = info_span!("submission", id = %ctx.submission_id());
        let _guard = span.enter();
        let started = Instant::now();

        let modules: Vec<ModuleRun> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .modules
                .iter()
                .map(|module| {
                    let parent = span.clone();
                    scope.spawn(move || run_module(module.as_ref(), ctx, tables, &parent))
                })
                .collect();
            handles
                .into_iter()
                .zip(&self.modules)
                .map(|(handle, module)| {
                    handle.join().unwrap_or_else(|payload| {
                        let err = CheckError::Panicked {
                            module: module.name().to_string(),
                            message: panic_payload_to_string(payload.as_ref()),
                        };
                        failed(module.as_ref(), ctx, &err)
                    })
                })
                .collect()
        });

        let run = ValidationRun {
            submission_id: ctx.submission_id().to_string(),
            modules,
        };
        info!(
            modules = run.modules.len(),
            failed = run.failed_modules().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "validation run complete"
        );
        run
    }
}

fn run_module(
    module: &dyn RuleModule,
    ctx: &ValidationContext<'_>,
    tables: &TableSet,
    parent: &Span,
) -> ModuleRun {
    let _span = info_span!(parent: parent, "module", name = module.name()).entered();

    let missing: Vec<&str> = module
        .tables()
        .iter()
        .copied()
        .filter(|t| !tables.contains(t))
        .collect();
    if !missing.is_empty() {
        let err = CheckError::MissingTable {
            table: missing.join(", "),
        };
        return failed(module, ctx, &err);
    }

    let (buffer, buffered) = crossbeam_channel::unbounded();
    let module_ctx = ctx.redirected(buffer);
    let outcome = catch_unwind(AssertUnwindSafe(|| module.check(&module_ctx, tables)));
    drop(module_ctx);

    match outcome {
        Ok(Ok(result)) => {
            for finding in buffered.try_iter() {
                ctx.publish(&finding);
            }
            info!(
                errors = result.error_count(),
                warnings = result.warning_count(),
                "module completed"
            );
            ModuleRun {
                module: module.name().to_string(),
                status: ModuleStatus::Completed,
                result,
            }
        }
        Ok(Err(err)) => failed(module, ctx, &err),
        Err(payload) => {
            let err = CheckError::Panicked {
                module: module.name().to_string(),
                message: panic_payload_to_string(payload.as_ref()),
            };
            failed(module, ctx, &err)
        }
    }
}

fn failed(module: &dyn RuleModule, ctx: &ValidationContext<'_>, err: &CheckError) -> ModuleRun {
    warn!(module = module.name(), error = %err, "rule module failed");
    let finding = authoring_finding(module, err);
    ctx.publish(&finding);
    let mut result = RuleResult::new();
    result.push(finding);
    ModuleRun {
        module: module.name().to_string(),
        status: ModuleStatus::Failed {
            reason: err.to_string(),
        },
        result,
    }
}

fn authoring_finding(module: &dyn RuleModule, err: &CheckError) -> Finding {
    let table = module.tables().first().copied().unwrap_or(module.name());
    FindingRequest::error(table, Category::Authoring)
        .with_message(format!(
            "The {} checks could not be completed ({err}). Please contact the data manager.",
            module.name()
        ))
        .with_group([("module", module.name())])
        .diagnostic()
}

fn panic_payload_to_string(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
