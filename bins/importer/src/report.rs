//! Rendering of reports for the terminal.

use std::fmt::Write as _;

use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::Serialize;
use sitebudget_core::budget::{
    BudgetLineItem, CostCodeRollup, ImportSummary, SheetTemplate, ValidationResult, format_money,
};

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Output format for the template command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TemplateFormat {
    /// A single CSV header row, ready to fill in.
    #[default]
    Csv,
    /// Column definitions and cost codes as JSON.
    Json,
}

/// Everything printed after a successful import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport<'a> {
    /// Store outcome.
    pub summary: &'a ImportSummary,
    /// Items as saved.
    pub items: &'a [BudgetLineItem],
    /// Per cost code totals.
    pub rollup: &'a [CostCodeRollup],
    /// Total budget across items.
    pub budget_total: Decimal,
    /// Total billing across items.
    pub billing_total: Decimal,
}

/// Renders a validation report.
pub fn render_validation(
    report: &ValidationResult,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Text => Ok(validation_text(report)),
    }
}

fn validation_text(report: &ValidationResult) -> String {
    let mut out = String::new();
    let status = if report.is_valid { "valid" } else { "invalid" };
    let _ = writeln!(
        out,
        "Sheet is {status}: {} data rows, {} errors, {} warnings",
        report.row_count,
        report.errors.len(),
        report.warnings.len()
    );

    for error in &report.errors {
        if error.row == 0 {
            let _ = writeln!(out, "  error [{}] {}", error.column, error.message);
        } else {
            let _ = writeln!(
                out,
                "  error row {} [{}] {}",
                error.row, error.column, error.message
            );
        }
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "  warning {warning}");
    }
    out
}

/// Renders the result of an import.
pub fn render_import(report: &ImportReport<'_>, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Text => Ok(import_text(report)),
    }
}

fn import_text(report: &ImportReport<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Imported {} items into location {} ({} category rows skipped)",
        report.summary.items_saved,
        report.summary.location_id,
        report.summary.groups.len()
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<10} {:<28} {:<16} {:>14} {:>14}",
        "Item", "Name", "Cost Code", "Budget", "Billing"
    );
    for item in report.items {
        let _ = writeln!(
            out,
            "{:<10} {:<28} {:<16} {:>14} {:>14}",
            item.line_item_number,
            truncate(&item.line_item_name, 28),
            item.cost_code,
            format_money(item.budget_total),
            format_money(item.billing)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<16} {:>6} {:>12} {:>14} {:>14}",
        "Cost Code", "Items", "Hours", "Budget", "Billing"
    );
    for row in report.rollup {
        let _ = writeln!(
            out,
            "{:<16} {:>6} {:>12} {:>14} {:>14}",
            row.cost_code,
            row.item_count,
            format_money(row.hours),
            format_money(row.budget_total),
            format_money(row.billing)
        );
    }
    let _ = writeln!(
        out,
        "{:<16} {:>6} {:>12} {:>14} {:>14}",
        "Total",
        report.items.len(),
        "",
        format_money(report.budget_total),
        format_money(report.billing_total)
    );
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Renders an import template.
pub fn render_template(template: &SheetTemplate, format: TemplateFormat) -> anyhow::Result<String> {
    match format {
        TemplateFormat::Json => Ok(serde_json::to_string_pretty(template)?),
        TemplateFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(template.columns.iter().map(|column| column.header))?;
            let bytes = writer.into_inner().map_err(|err| err.into_error())?;
            Ok(String::from_utf8(bytes)?)
        }
    }
}
