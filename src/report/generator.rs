//! Report rendering.
//!
//! Turns an aggregated [`TenureReport`] into console text, Markdown or JSON.

use crate::cli::OutputFormat;
use crate::models::{EntityTenure, TenureOutcome, TenureReport, TenureSummary};
use anyhow::{Context, Result};
use std::path::Path;

/// Render in the requested format.
pub fn render(report: &TenureReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(generate_text_report(report)),
        OutputFormat::Markdown => Ok(generate_markdown_report(report)),
        OutputFormat::Json => generate_json_report(report),
    }
}

/// Generate the plain console report.
pub fn generate_text_report(report: &TenureReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Found {} direct and indirect reports (including manager) under {}.\n",
        report.summary.total_entities, report.manager
    ));
    output.push_str(&format!("Tenure measured as of {}.\n\n", report.as_of));

    for entry in &report.entries {
        output.push_str(&generate_text_entry(entry));
    }

    output.push_str(&generate_text_summary(&report.summary));
    output
}

fn generate_text_entry(entry: &EntityTenure) -> String {
    let label = format!("Employee: {} ({})", entry.display_name, entry.principal_name);

    match entry.tenure {
        TenureOutcome::Computed(ref record) => format!(
            "{}\n  Hire Date: {}\n  Working days since hire: {}\n  Elapsed years since hire: {:.2}\n\n",
            label,
            record.hire_date.format("%Y-%m-%d"),
            record.working_days,
            record.elapsed_years
        ),
        TenureOutcome::InvalidFormat { .. } => format!("{} - Invalid hire date format\n", label),
        TenureOutcome::Missing => format!("{} - No hire date found\n", label),
    }
}

fn generate_text_summary(summary: &TenureSummary) -> String {
    let mut section = String::new();

    section.push_str(&format!(
        "Total number of users in hierarchy: {}\n",
        summary.total_entities
    ));
    if summary.invalid_format > 0 || summary.missing > 0 {
        section.push_str(&format!(
            "Users without usable hire date: {} ({} invalid, {} missing)\n",
            summary.invalid_format + summary.missing,
            summary.invalid_format,
            summary.missing
        ));
    }
    section.push_str(&format!(
        "Sum of working days for all users: {}\n",
        summary.total_working_days
    ));
    section.push_str(&format!(
        "Sum of elapsed years for all users: {:.2}\n",
        summary.total_elapsed_years
    ));

    section
}

/// Generate a Markdown report.
pub fn generate_markdown_report(report: &TenureReport) -> String {
    let mut output = String::new();

    output.push_str("# Tenure Report\n\n");

    output.push_str("## Metadata\n\n");
    output.push_str(&format!("- **Manager:** {}\n", report.manager));
    output.push_str(&format!("- **As Of:** {}\n", report.as_of));
    output.push_str(&format!(
        "- **People in Hierarchy:** {}\n\n",
        report.summary.total_entities
    ));

    output.push_str(&generate_markdown_summary(&report.summary));

    output.push_str("## People\n\n");
    output.push_str("| Name | Principal Name | Hire Date | Working Days | Elapsed Years |\n");
    output.push_str("|------|----------------|-----------|--------------|---------------|\n");
    for entry in &report.entries {
        output.push_str(&generate_markdown_row(entry));
    }
    output.push('\n');

    output.push_str("---\n\n*Generated by OrgTenure*\n");
    output
}

fn generate_markdown_summary(summary: &TenureSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|--------|-------|\n");
    section.push_str(&format!(
        "| With hire date | {} |\n",
        summary.with_hire_date
    ));
    section.push_str(&format!(
        "| Invalid hire date | {} |\n",
        summary.invalid_format
    ));
    section.push_str(&format!("| No hire date | {} |\n", summary.missing));
    section.push_str(&format!(
        "| Total working days | {} |\n",
        summary.total_working_days
    ));
    section.push_str(&format!(
        "| Total elapsed years | {:.2} |\n\n",
        summary.total_elapsed_years
    ));

    section
}

fn generate_markdown_row(entry: &EntityTenure) -> String {
    let (hire_date, working_days, elapsed_years) = match entry.tenure {
        TenureOutcome::Computed(ref record) => (
            record.hire_date.format("%Y-%m-%d").to_string(),
            record.working_days.to_string(),
            format!("{:.2}", record.elapsed_years),
        ),
        TenureOutcome::InvalidFormat { ref raw } => (
            format!("*invalid:* `{}`", raw.replace('|', "\\|")),
            "-".to_string(),
            "-".to_string(),
        ),
        TenureOutcome::Missing => ("*none*".to_string(), "-".to_string(), "-".to_string()),
    };

    format!(
        "| {} | {} | {} | {} | {} |\n",
        entry.display_name.replace('|', "\\|"),
        entry.principal_name.replace('|', "\\|"),
        hire_date,
        working_days,
        elapsed_years
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &TenureReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write rendered report content to disk.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
