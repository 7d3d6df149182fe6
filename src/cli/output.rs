//! Output formatting for CLI commands.
//!
//! This module provides formatting utilities for displaying reconcile
//! reports, task outcomes, and platform status to the user.

use colored::Colorize;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::orchestrator::{TaskOutcome, TaskStatus};
use crate::platform::RemoteFunctionRecord;
use crate::sync::ReconcileReport;

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Function status row for table display.
#[derive(Tabled)]
struct FunctionStatusRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Deployed at")]
    deployed_at: String,
    #[tabled(rename = "Uuid")]
    uuid: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a reconcile report for display before confirmation.
    #[must_use]
    pub fn format_report(&self, report: &ReconcileReport) -> String {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = report
                    .entries
                    .iter()
                    .map(|e| match &e.change {
                        Ok(change) => serde_json::json!({
                            "name": e.name,
                            "change": change.to_string(),
                        }),
                        Err(err) => serde_json::json!({
                            "name": e.name,
                            "error": err.to_string(),
                        }),
                    })
                    .collect();
                serde_json::to_string_pretty(&entries).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_report_text(report),
        }
    }

    /// Formats a reconcile report as text.
    fn format_report_text(report: &ReconcileReport) -> String {
        let mut output = String::new();

        for entry in &report.entries {
            let line = match &entry.change {
                Ok(change) if change.is_unchanged() => {
                    format!(
                        "  {} {} - skipped, nothing to do",
                        "-".dimmed(),
                        entry.name
                    )
                }
                Ok(change) => {
                    format!("  {} {} - {}", "~".yellow(), entry.name, change.summary())
                }
                Err(err) => format!("  {} {} - {err}", "x".red(), entry.name),
            };
            let _ = writeln!(output, "{line}");
        }

        let _ = writeln!(output, "\n{report}");
        output
    }

    /// Formats task outcomes for display after orchestration.
    #[must_use]
    pub fn format_outcomes(&self, outcomes: &[TaskOutcome]) -> String {
        match self.format {
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = outcomes
                    .iter()
                    .map(|o| {
                        let (status, message) = match &o.status {
                            TaskStatus::Succeeded => ("succeeded", None),
                            TaskStatus::Skipped { message } => ("skipped", Some(message.clone())),
                            TaskStatus::Failed { message } => ("failed", Some(message.clone())),
                        };
                        serde_json::json!({
                            "function": o.function_name,
                            "status": status,
                            "message": message,
                        })
                    })
                    .collect();
                serde_json::to_string_pretty(&entries).unwrap_or_default()
            }
            OutputFormat::Text => Self::format_outcomes_text(outcomes),
        }
    }

    /// Formats task outcomes as text.
    fn format_outcomes_text(outcomes: &[TaskOutcome]) -> String {
        let mut output = String::new();

        for outcome in outcomes {
            let line = match &outcome.status {
                TaskStatus::Succeeded => {
                    format!("  {} {}", "ok".green(), outcome.function_name)
                }
                TaskStatus::Skipped { message } => format!(
                    "  {} {} - {message}",
                    "skip".yellow(),
                    outcome.function_name
                ),
                TaskStatus::Failed { message } => format!(
                    "  {} {} - {message}",
                    "fail".red(),
                    outcome.function_name
                ),
            };
            let _ = writeln!(output, "{line}");
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.iter().filter(|o| o.is_failure()).count();
        let skipped = outcomes.len() - succeeded - failed;

        let _ = write!(
            output,
            "\n{} succeeded, {} skipped, {} failed",
            succeeded.to_string().green(),
            skipped.to_string().yellow(),
            failed.to_string().red()
        );

        output
    }

    /// Formats the platform status table.
    #[must_use]
    pub fn format_status(&self, records: &[RemoteFunctionRecord]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(records).unwrap_or_default(),
            OutputFormat::Text => Self::format_status_text(records),
        }
    }

    /// Formats the platform status as a table.
    fn format_status_text(records: &[RemoteFunctionRecord]) -> String {
        if records.is_empty() {
            return String::from("No functions on the platform.");
        }

        let rows: Vec<FunctionStatusRow> = records
            .iter()
            .map(|r| FunctionStatusRow {
                name: r.name.clone(),
                state: r.state.to_string(),
                version: if r.manifest.version < 0 {
                    String::from("-")
                } else {
                    r.manifest.version.to_string()
                },
                deployed_at: r
                    .deployed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| String::from("never")),
                uuid: r.uuid.to_string(),
            })
            .collect();

        Table::new(rows).to_string()
    }
}
