use std::cmp::Ordering;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use intake_cli::pipeline::CheckOutcome;
use intake_model::{Finding, Severity};
use intake_validate::ModuleStatus;

const MAX_LISTED_ROWS: usize = 8;

pub fn print_summary(outcome: &CheckOutcome) {
    println!("Submission: {}", outcome.submission_id);
    println!("Dataset: {}", outcome.dataset.name);
    println!("Checked in {:.2?}", outcome.elapsed);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Module"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_errors = 0usize;
    let mut total_warnings = 0usize;
    for module in &outcome.run.modules {
        let errors = module.result.error_count();
        let warnings = module.result.warning_count();
        total_errors += errors;
        total_warnings += warnings;
        table.add_row(vec![
            Cell::new(&module.module)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            status_cell(&module.status),
            count_cell(errors, Color::Red),
            count_cell(warnings, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_errors, Color::Red).add_attribute(Attribute::Bold),
        count_cell(total_warnings, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    print_finding_table(outcome);

    for failed in outcome.run.failed_modules() {
        if let ModuleStatus::Failed { reason } = &failed.status {
            eprintln!("- module {} failed: {reason}", failed.module);
        }
    }
}

fn print_finding_table(outcome: &CheckOutcome) {
    let result = outcome.combined();
    let mut findings: Vec<&Finding> = result.errors.iter().chain(&result.warnings).collect();
    if findings.is_empty() {
        return;
    }
    findings.sort_by(|a, b| {
        let severity = severity_rank(b.severity()).cmp(&severity_rank(a.severity()));
        if severity != Ordering::Equal {
            return severity;
        }
        a.table().cmp(b.table())
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Severity"),
        header_cell("Category"),
        header_cell("Columns"),
        header_cell("Rows"),
        header_cell("Message"),
    ]);
    apply_finding_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for finding in findings {
        table.add_row(vec![
            Cell::new(finding.table()),
            severity_cell(finding.severity()),
            Cell::new(finding.category().label()),
            if finding.columns().is_empty() {
                dim_cell("-")
            } else {
                Cell::new(finding.columns())
            },
            rows_cell(finding),
            Cell::new(finding.message()),
        ]);
    }
    println!();
    println!("Findings:");
    println!("{table}");
}

fn rows_cell(finding: &Finding) -> Cell {
    let rows = finding.rows();
    if rows.is_empty() {
        return dim_cell("-");
    }
    let mut listed: Vec<String> = rows
        .iter()
        .take(MAX_LISTED_ROWS)
        .map(ToString::to_string)
        .collect();
    if rows.len() > MAX_LISTED_ROWS {
        listed.push(format!("... ({} rows)", rows.len()));
    }
    Cell::new(listed.join(", "))
}

fn status_cell(status: &ModuleStatus) -> Cell {
    match status {
        ModuleStatus::Completed => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        ModuleStatus::Failed { .. } => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_finding_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
    if table.column_count() >= 6 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(24)),
            ColumnConstraint::UpperBoundary(Width::Fixed(9)),
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::UpperBoundary(Width::Fixed(28)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::LowerBoundary(Width::Percentage(35)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 2,
        Severity::Warning => 1,
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
