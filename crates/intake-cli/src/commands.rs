use std::path::Path;

use anyhow::Result;
use comfy_table::Table;
use tracing::info;

use intake_cli::pipeline::{CheckOutcome, available_datasets, check_submission, load_bundle};
use intake_cli::report::write_json_report;
use intake_rules::modules_for;

use crate::cli::CheckArgs;
use crate::summary::apply_table_style;

pub fn run_check(args: &CheckArgs, config: Option<&Path>) -> Result<CheckOutcome> {
    let bundle = load_bundle(config)?;
    let outcome = check_submission(
        &bundle,
        &args.submission_dir,
        &args.dataset,
        args.submission_id.as_deref(),
    )?;
    if let Some(path) = &args.json {
        write_json_report(&outcome, path)?;
        info!(path = %path.display(), "JSON report written");
    }
    Ok(outcome)
}

pub fn run_datasets(config: Option<&Path>) -> Result<()> {
    let bundle = load_bundle(config)?;
    let mut table = Table::new();
    table.set_header(vec!["Dataset", "Tables", "Rule modules", "Description"]);
    apply_table_style(&mut table);
    for dataset in available_datasets(&bundle) {
        let modules: Vec<String> = modules_for(&dataset.name)
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        let modules = if modules.is_empty() {
            "-".to_string()
        } else {
            modules.join(", ")
        };
        table.add_row(vec![
            dataset.name.clone(),
            dataset.tables.join(", "),
            modules,
            dataset.description.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    Ok(())
}
