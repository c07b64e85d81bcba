//! Statistical comparators: relative percent difference, percent recovery,
//! and the threshold pass-rate aggregator.

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use intake_model::RowId;

use crate::column_reader::{ColumnReader, RowView, require_columns};
use crate::error::{CheckError, Result};
use crate::grouping::{GroupKey, group_rows};

/// Name of the derived column added by [`percent_recovery`].
pub const PERCENT_RECOVERY_COLUMN: &str = "percent_recovery";

const PASS_EPSILON: f64 = 1e-9;

/// Relative percent difference `|max - min| / |(max + min) / 2|`, as a fraction.
///
/// `None` for fewer than two values, any non-finite value, or `max + min == 0`.
/// The magnitude of the mean is used so negative results still compare
/// against a positive limit.
pub fn rpd(values: &[f64]) -> Option<f64> {
    if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let sum = max + min;
    if sum == 0.0 {
        return None;
    }
    Some((max - min).abs() / (sum / 2.0).abs())
}

/// Why a replicate group could not be compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unevaluable {
    /// Fewer than two finite numeric values in the group.
    TooFewValues,
    /// `max + min` is zero, so the mean is zero.
    ZeroMean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicateGroup {
    pub key: GroupKey,
    pub rows: Vec<RowId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RpdOutcome {
    pub evaluated: Vec<(ReplicateGroup, f64)>,
    pub unevaluable: Vec<(ReplicateGroup, Unevaluable)>,
}

impl RpdOutcome {
    /// Evaluated groups whose RPD meets or exceeds `limit`.
    pub fn exceeding(&self, limit: f64) -> impl Iterator<Item = &(ReplicateGroup, f64)> {
        self.evaluated.iter().filter(move |(_, rpd)| *rpd >= limit)
    }
}

/// RPD of `value_column` for each replicate group of the rows at `positions`.
///
/// Missing and non-finite values are left out of a group's comparison but
/// their rows still belong to the group.
pub fn replicate_rpd<I>(
    reader: &ColumnReader<'_>,
    group_by: &[&str],
    value_column: &str,
    positions: I,
) -> Result<RpdOutcome>
where
    I: IntoIterator<Item = usize>,
{
    let mut columns = group_by.to_vec();
    columns.push(value_column);
    require_columns(reader.table(), reader.frame(), &columns)?;

    let mut outcome = RpdOutcome::default();
    for (key, positions) in group_rows(reader, group_by, positions)? {
        let values: Vec<f64> = positions
            .iter()
            .filter_map(|&idx| reader.get_f64(value_column, idx))
            .filter(|v| v.is_finite())
            .collect();
        let group = ReplicateGroup {
            key,
            rows: reader.row_ids_at(positions)?,
        };
        match rpd(&values) {
            Some(value) => outcome.evaluated.push((group, value)),
            None if values.len() < 2 => outcome.unevaluable.push((group, Unevaluable::TooFewValues)),
            None => outcome.unevaluable.push((group, Unevaluable::ZeroMean)),
        }
    }
    debug!(
        table = reader.table(),
        evaluated = outcome.evaluated.len(),
        unevaluable = outcome.unevaluable.len(),
        "replicate rpd"
    );
    Ok(outcome)
}

/// Columns read by [`percent_recovery`].
#[derive(Debug, Clone, Copy)]
pub struct RecoveryColumns<'a> {
    pub sample_type: &'a str,
    pub result: &'a str,
    pub true_value: &'a str,
}

impl Default for RecoveryColumns<'_> {
    fn default() -> Self {
        Self {
            sample_type: "sampletype",
            result: "result",
            true_value: "truevalue",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recovery {
    /// Input frame plus [`PERCENT_RECOVERY_COLUMN`], null where not computed.
    pub frame: DataFrame,
    /// Spike/reference rows skipped because their true value is zero or missing.
    pub skipped: Vec<RowId>,
}

/// True for sample types that carry a known expected value.
pub fn is_spike_or_reference(sample_type: &str) -> bool {
    let lower = sample_type.to_lowercase();
    lower.contains("spike") || lower.contains("reference")
}

/// `result / true_value * 100` for spike and reference rows.
///
/// A zero or missing true value is never divided by; those rows are returned
/// in [`Recovery::skipped`].
pub fn percent_recovery(table: &str, df: &DataFrame, columns: RecoveryColumns<'_>) -> Result<Recovery> {
    let reader = ColumnReader::checked(
        table,
        df,
        &[columns.sample_type, columns.result, columns.true_value],
    )?;

    let mut values: Vec<Option<f64>> = Vec::with_capacity(reader.height());
    let mut skipped = Vec::new();
    for row in reader.rows() {
        if !is_spike_or_reference(&row.str(columns.sample_type)) {
            values.push(None);
            continue;
        }
        match row.f64(columns.true_value) {
            Some(truth) if truth != 0.0 => {
                values.push(row.f64(columns.result).map(|r| r / truth * 100.0));
            }
            _ => {
                skipped.push(row.row_id()?);
                values.push(None);
            }
        }
    }

    let mut frame = df.clone();
    frame.with_column(Column::new(PERCENT_RECOVERY_COLUMN.into(), values))?;
    debug!(table, skipped = skipped.len(), "percent recovery");
    Ok(Recovery { frame, skipped })
}

/// A group whose in-range fraction fell below the required fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct FailingGroup {
    pub key: GroupKey,
    /// Every row of the group, in range or not.
    pub rows: Vec<RowId>,
    pub passed: usize,
    pub total: usize,
}

impl FailingGroup {
    pub fn pass_fraction(&self) -> f64 {
        self.passed as f64 / self.total as f64
    }
}

/// Threshold pass-rate aggregator.
///
/// A group fails iff `passed / total < required`; a fraction exactly equal to
/// `required` passes.
pub fn pass_rate<I, F>(
    reader: &ColumnReader<'_>,
    group_by: &[&str],
    positions: I,
    required: f64,
    in_range: F,
) -> Result<Vec<FailingGroup>>
where
    I: IntoIterator<Item = usize>,
    F: Fn(&RowView<'_, '_>) -> bool,
{
    if !(0.0..=1.0).contains(&required) {
        return Err(CheckError::invalid_argument(format!(
            "required pass fraction must be within 0..=1, got {required}"
        )));
    }
    require_columns(reader.table(), reader.frame(), group_by)?;

    let mut failing = Vec::new();
    for (key, positions) in group_rows(reader, group_by, positions)? {
        let total = positions.len();
        let passed = positions
            .iter()
            .filter(|&&idx| in_range(&reader.row(idx)))
            .count();
        if (passed as f64) < required * total as f64 - PASS_EPSILON {
            failing.push(FailingGroup {
                key,
                rows: reader.row_ids_at(positions)?,
                passed,
                total,
            });
        }
    }
    debug!(table = reader.table(), failing = failing.len(), required, "pass rate");
    Ok(failing)
}
