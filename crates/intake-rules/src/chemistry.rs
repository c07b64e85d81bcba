//! Sediment chemistry: batch and results tables.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use intake_ingest::TableSet;
use intake_model::{Category, FindingRequest, RuleResult, Severity};
use intake_reference::{ReferenceError, ReferenceSource};
use intake_validate::{
    CheckError, ColumnReader, LookupOptions, MissingPolicy, PERCENT_RECOVERY_COLUMN,
    RecoveryColumns, RequireAnyPerGroup, RequiredPerGroup, RuleModule, TableRef,
    Unevaluable, ValidationContext, invalid_lookup_rows, invalid_multi_value_rows,
    missing_matches, pass_rate, percent_recovery, replicate_rpd,
};

pub const BATCH: &str = "tbl_chembatch";
pub const RESULTS: &str = "tbl_chemresults";

const BATCH_KEYS: &[&str] = &["lab", "preparationbatchid"];
const CLASS_GROUP: &[&str] = &["analysisbatchid", "analyteclass"];
const REPLICATE_GROUP: &[&str] = &[
    "analysisbatchid",
    "analysismethod",
    "sampletype",
    "analytename",
    "sampleid",
];

/// Derived column holding each result row's analyte class.
const ANALYTE_CLASS: &str = "analyteclass";

/// Sample types each analyte class must report within an analysis batch.
const REQUIRED_SAMPLE_TYPES: &[(&str, &[&str])] = &[
    ("Inorganics", &["Method blank", "Blank spiked", "Result"]),
    ("PAH", &["Method blank", "Matrix spike", "Result"]),
    ("PCB", &["Method blank", "Matrix spike", "Result"]),
    ("Chlorinated Hydrocarbons", &["Method blank", "Matrix spike", "Result"]),
    ("PBDE", &["Method blank", "Matrix spike", "Result"]),
    ("Pyrethroid", &["Method blank", "Matrix spike", "Result"]),
    ("TN", &["Method blank", "Result"]),
    ("TOC", &["Method blank", "Result"]),
];

/// Analyte classes whose batches need a certified reference material.
const REQUIRES_CRM: &[&str] = &[
    "Inorganics",
    "PAH",
    "PCB",
    "Chlorinated Hydrocarbons",
    "PBDE",
    "TOC",
];

/// Methods held to a 20% duplicate RPD; all others are held to 30%.
const METHODS_20_RPD: &[&str] = &["ICPAES", "EPA200.7", "EPA 6010B"];

const MATRIX_SPIKE_RECOVERY: std::ops::RangeInclusive<f64> = 60.0..=140.0;
const MATRIX_SPIKE_PASS_FRACTION: f64 = 0.8;

#[derive(Debug, Default, Clone, Copy)]
pub struct ChemistryModule;

impl RuleModule for ChemistryModule {
    fn name(&self) -> &str {
        "chemistry"
    }

    fn tables(&self) -> &[&'static str] {
        &[BATCH, RESULTS]
    }

    fn check(&self, ctx: &ValidationContext<'_>, tables: &TableSet) -> Result<RuleResult, CheckError> {
        let batch = tables.require(BATCH)?;
        let results = tables.require(RESULTS)?;
        let mut out = RuleResult::new();

        check_batch_logic(ctx, batch, results, &mut out)?;

        let classes = analyte_classes(ctx)?;
        let analytes: BTreeSet<String> = classes.keys().cloned().collect();
        let unknown = invalid_lookup_rows(
            RESULTS,
            results,
            "analytename",
            &analytes,
            &LookupOptions::default(),
        )?;
        out.extend([ctx.record(
            &FindingRequest::error(RESULTS, Category::Lookup)
                .with_columns("AnalyteName")
                .with_message("The AnalyteName is not in the analyte lookup list (lu_analytes)"),
            unknown,
        )]);

        let results = with_analyte_class(results, &classes)?;
        check_required_sample_types(ctx, &results, &mut out)?;
        check_qualifiers(ctx, &results, &mut out)?;

        let recovery = percent_recovery(RESULTS, &results, RecoveryColumns::default())?;
        out.extend([ctx.record(
            &FindingRequest::warning(RESULTS, Category::Value)
                .with_columns("TrueValue")
                .with_message(
                    "TrueValue is zero or missing for a spike or reference sample, so percent recovery was not computed",
                ),
            recovery.skipped.iter().copied(),
        )]);

        check_duplicate_rpd(ctx, &recovery.frame, &mut out)?;
        check_matrix_spike_recovery(ctx, &recovery.frame, &mut out)?;

        debug!(
            errors = out.error_count(),
            warnings = out.warning_count(),
            "chemistry checks finished"
        );
        Ok(out)
    }
}

fn check_batch_logic(
    ctx: &ValidationContext<'_>,
    batch: &DataFrame,
    results: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let b = TableRef::new(BATCH, batch);
    let r = TableRef::new(RESULTS, results);

    out.extend([
        ctx.record(
            &FindingRequest::error(BATCH, Category::Logic)
                .with_columns("Lab, PreparationBatchID")
                .with_message(
                    "Each Batch record must have a corresponding Results record. Records are matched on Lab and PreparationBatchID",
                ),
            missing_matches(b, r, BATCH_KEYS)?,
        ),
        ctx.record(
            &FindingRequest::error(RESULTS, Category::Logic)
                .with_columns("Lab, PreparationBatchID")
                .with_message(
                    "Each Results record must have a corresponding Batch record. Records are matched on Lab and PreparationBatchID",
                ),
            missing_matches(r, b, BATCH_KEYS)?,
        ),
    ]);
    Ok(())
}

fn analyte_classes(ctx: &ValidationContext<'_>) -> Result<BTreeMap<String, String>, CheckError> {
    let table = ctx.reference().require("lu_analytes")?;
    for column in ["analyte", "analyteclass"] {
        if !table.has_column(column) {
            return Err(ReferenceError::UnknownColumn {
                table: table.name().to_string(),
                column: column.to_string(),
            }
            .into());
        }
    }
    Ok(table
        .rows()
        .iter()
        .filter_map(|row| {
            let analyte = row.get("analyte")?;
            let class = row.get("analyteclass")?;
            Some((analyte.clone(), class.clone()))
        })
        .collect())
}

/// Results frame with a derived analyte-class column.
fn with_analyte_class(
    results: &DataFrame,
    classes: &BTreeMap<String, String>,
) -> Result<DataFrame, CheckError> {
    let reader = ColumnReader::checked(RESULTS, results, &["analytename"])?;
    let values: Vec<Option<String>> = reader
        .rows()
        .map(|row| classes.get(&row.str("analytename")).cloned())
        .collect();
    let mut frame = results.clone();
    frame.with_column(Column::new(ANALYTE_CLASS.into(), values))?;
    Ok(frame)
}

fn check_required_sample_types(
    ctx: &ValidationContext<'_>,
    results: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let request = FindingRequest::error(RESULTS, Category::MissingData).with_columns("SampleType");
    for (class, sample_types) in REQUIRED_SAMPLE_TYPES {
        let findings = RequiredPerGroup::new(CLASS_GROUP, "sampletype", sample_types.iter().copied())
            .with_filter(|row| row.str(ANALYTE_CLASS) == *class)
            .check(RESULTS, results, &request, ctx.sink())?;
        out.extend(findings.into_iter().map(Some));
    }

    let crm_request = request.with_message("you are missing a Certified Reference Material");
    let findings = RequireAnyPerGroup::new(CLASS_GROUP, &["sampletype"], |row| {
        row.contains_ci("sampletype", "reference")
    })
    .with_filter(|row| REQUIRES_CRM.contains(&row.str(ANALYTE_CLASS).as_str()))
    .check(RESULTS, results, &crm_request, ctx.sink())?;
    out.extend(findings.into_iter().map(Some));
    Ok(())
}

fn check_qualifiers(
    ctx: &ValidationContext<'_>,
    results: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let allowed = ctx.reference().values("lu_qualifiers", "qualifier")?;
    let bad = invalid_multi_value_rows(
        RESULTS,
        results,
        "qualifier",
        &allowed,
        &LookupOptions::default().with_missing(MissingPolicy::Flag),
    )?;
    out.extend([ctx.record(
        &FindingRequest::error(RESULTS, Category::Lookup)
            .with_columns("Qualifier")
            .with_message(
                "Every comma-separated Qualifier must be in the qualifier lookup list (lu_qualifiers); use 'none' when no qualifier applies",
            ),
        bad,
    )]);
    Ok(())
}

fn check_duplicate_rpd(
    ctx: &ValidationContext<'_>,
    results: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let reader = ColumnReader::checked(RESULTS, results, REPLICATE_GROUP)?;
    let positions = reader.positions_where(|row| {
        matches!(row.str("sampletype").as_str(), "Matrix spike" | "Result")
    });
    if positions.is_empty() {
        return Ok(());
    }
    let outcome = replicate_rpd(&reader, REPLICATE_GROUP, "result", positions)?;

    let base = FindingRequest::warning(RESULTS, Category::Value).with_columns("Result");
    for (group, value) in &outcome.evaluated {
        let method = group.key.value("analysismethod").unwrap_or_default();
        let limit = if METHODS_20_RPD.contains(&method) { 0.20 } else { 0.30 };
        if *value < limit {
            continue;
        }
        let request = base
            .clone()
            .with_message(format!(
                "For the AnalysisMethod {method}, duplicate Matrix spikes or Results should have an RPD under {:.0}%",
                limit * 100.0
            ))
            .with_group(group.key.to_map());
        out.extend([ctx.record(&request, group.rows.iter().copied())]);
    }

    for (group, why) in &outcome.unevaluable {
        let message = match why {
            Unevaluable::ZeroMean => {
                "RPD could not be computed for these duplicates because their mean is zero"
            }
            // A lone replicate is not a duplicate pair.
            Unevaluable::TooFewValues if group.rows.len() < 2 => continue,
            Unevaluable::TooFewValues => {
                "RPD could not be computed for these duplicates because fewer than two results are numeric"
            }
        };
        let request = base
            .clone()
            .with_message(message)
            .with_group(group.key.to_map());
        out.extend([ctx.record(&request, group.rows.iter().copied())]);
    }
    Ok(())
}

fn check_matrix_spike_recovery(
    ctx: &ValidationContext<'_>,
    results: &DataFrame,
    out: &mut RuleResult,
) -> Result<(), CheckError> {
    let reader = ColumnReader::checked(
        RESULTS,
        results,
        &["analysisbatchid", "sampletype", PERCENT_RECOVERY_COLUMN],
    )?;
    let positions = reader.positions_where(|row| row.contains_ci("sampletype", "matrix spike"));
    if positions.is_empty() {
        return Ok(());
    }
    let failing = pass_rate(
        &reader,
        &["analysisbatchid"],
        positions,
        MATRIX_SPIKE_PASS_FRACTION,
        |row| {
            row.f64(PERCENT_RECOVERY_COLUMN)
                .is_some_and(|pct| MATRIX_SPIKE_RECOVERY.contains(&pct))
        },
    )?;
    for group in failing {
        let request = FindingRequest::new(RESULTS, Severity::Warning, Category::Range)
            .with_columns("Result, TrueValue")
            .with_message(format!(
                "Only {} of {} Matrix spike recoveries in this AnalysisBatch are within 60-140%; at least 80% must be",
                group.passed, group.total
            ))
            .with_group(group.key.to_map());
        out.extend([ctx.record(&request, group.rows)]);
    }
    Ok(())
}
