//! Console rendering of run results.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

use crate::availability::AggregationReport;
use crate::error::Result;
use crate::merge::MergeReport;
use crate::summary::SummaryStatistics;
use crate::validate::ValidationSummary;

fn styled_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header.to_vec());
    table
}

fn new_table(title: &str) -> Table {
    styled_table(&[title])
}

/// Formats pipeline results for output.
pub struct RunReport;

impl RunReport {
    pub fn format_validation(summary: &ValidationSummary) -> String {
        let mut table = styled_table(&["Artifact", "Exists", "Parses", "Records", "Path"]);

        for status in &summary.per_file {
            table.add_row(vec![
                status.label.clone(),
                yes_no(status.exists).to_string(),
                yes_no(status.parses).to_string(),
                status
                    .record_count
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                status.path.display().to_string(),
            ]);
        }

        let verdict = if summary.all_valid {
            "All artifacts valid".to_string()
        } else {
            format!("{} artifact(s) invalid", summary.failed_count())
        };
        format!("{table}\n{verdict}")
    }

    pub fn format_summary(summary: &SummaryStatistics) -> String {
        let mut table = new_table("Symphony Layer Summary");

        table.add_row(vec!["Total layers:", &summary.total_layers.to_string()]);
        table.add_row(vec![
            "Parameter matches:",
            &summary.total_parameter_matches.to_string(),
        ]);

        table.add_row(vec!["", ""]);
        table.add_row(vec!["Improvement potential", "small / medium / large"]);
        table.add_row(vec![
            "",
            &format!(
                "{} / {} / {}",
                summary.improvement_potential.small,
                summary.improvement_potential.medium,
                summary.improvement_potential.large
            ),
        ]);
        table.add_row(vec!["Difficulty", "low / medium / high"]);
        table.add_row(vec![
            "",
            &format!(
                "{} / {} / {}",
                summary.difficulty.low, summary.difficulty.medium, summary.difficulty.high
            ),
        ]);
        table.add_row(vec![
            "Satellite:",
            &format!("{} yes / {} no", summary.satellite.yes, summary.satellite.no),
        ]);

        table.add_row(vec!["", ""]);
        match &summary.data_availability {
            Some(stats) => {
                table.add_row(vec!["Availability", "mean / median / min / max / std"]);
                table.add_row(vec![
                    "",
                    &format!(
                        "{:.1} / {:.1} / {:.1} / {:.1} / {:.1}",
                        stats.mean, stats.median, stats.min, stats.max, stats.std_dev
                    ),
                ]);
            }
            None => {
                table.add_row(vec!["Availability", "no layers with tracked data"]);
            }
        }

        table.to_string()
    }

    pub fn format_merge(report: &MergeReport) -> String {
        let mut table = new_table("Merge");

        table.add_row(vec!["Processed:", &report.processed_count.to_string()]);
        table.add_row(vec!["Skipped:", &report.skipped_count.to_string()]);
        for (reason, count) in &report.skipped_by_reason {
            table.add_row(vec![format!("  {reason}"), count.to_string()]);
        }
        table.add_row(vec![
            "Missing improvement:",
            &report.missing_improvement.to_string(),
        ]);
        table.add_row(vec!["Missing matches:", &report.missing_matches.to_string()]);
        table.add_row(vec![
            "Missing availability:",
            &report.missing_availability.to_string(),
        ]);
        table.add_row(vec!["Invalid values:", &report.invalid_values.to_string()]);
        if !report.unmapped_keys.is_empty() {
            let keys: Vec<&str> = report.unmapped_keys.keys().map(String::as_str).collect();
            table.add_row(vec!["Unmapped keys:".to_string(), keys.join(", ")]);
        }
        if !report.shadowed_keys.is_empty() {
            let keys: Vec<&str> = report.shadowed_keys.keys().map(String::as_str).collect();
            table.add_row(vec!["Shadowed keys:".to_string(), keys.join(", ")]);
        }

        table.to_string()
    }

    pub fn format_aggregation(report: &AggregationReport) -> String {
        let mut table = new_table("Layer Availability");

        table.add_row(vec!["Layers:", &report.layers.to_string()]);
        table.add_row(vec!["Parameters:", &report.total_parameters.to_string()]);
        table.add_row(vec![
            "Layers without parameters:",
            &report.layers_without_parameters.to_string(),
        ]);
        table.add_row(vec![
            "Codes not in table:",
            &report.missing_codes.len().to_string(),
        ]);
        table.add_row(vec!["Unknown indexes:", &report.unknown_indexes.to_string()]);

        table.to_string()
    }

    /// Format any report as JSON.
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
