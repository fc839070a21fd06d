use niftyindices_lib::{DeltaGroup, IndexFailure, RunSummary, SummaryReport};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "Index")]
    index: String,
    #[tabled(rename = "Sent as")]
    sent_as: String,
    #[tabled(rename = "Attempts")]
    attempts: u32,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn build_failure_rows(failures: &[IndexFailure]) -> Vec<FailureRow> {
    failures
        .iter()
        .map(|f| FailureRow {
            index: f.index_name.clone(),
            sent_as: f.display_name.clone().unwrap_or_else(|| "-".to_string()),
            attempts: f.attempts,
            reason: f.reason.clone(),
        })
        .collect()
}

fn format_group(group: &DeltaGroup) -> String {
    let sign = if group.delta > 0 { "+" } else { "" };
    format!("  {}{} -> ({})", sign, group.delta, group.indices.join(", "))
}

/// Human-readable summary, one line per delta group, then failures and totals.
pub fn render_summary(report: &SummaryReport) -> String {
    let mut lines = vec!["Summary:".to_string()];

    lines.extend(report.increased.iter().map(format_group));
    if !report.unchanged.is_empty() {
        lines.push(format!("  No changes -> ({})", report.unchanged.join(", ")));
    }
    lines.extend(report.decreased.iter().map(format_group));

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed:".to_string());
        let mut table = Table::new(build_failure_rows(&report.failures));
        table.with(Style::rounded());
        lines.push(table.to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "{} successful, {} failed",
        report.successful, report.failed
    ));
    if report.interrupted {
        lines.push(format!(
            "Interrupted after {} of {} indices",
            report.processed, report.total
        ));
    }
    lines.join("\n")
}

pub fn print_summary(summary: &RunSummary) {
    println!("{}", render_summary(&summary.report()));
}

pub fn print_json<T: Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use niftyindices_lib::ChangeRecord;

    fn summary() -> RunSummary {
        RunSummary {
            total: 5,
            changes: vec![
                ChangeRecord::new("NIFTY 50", 100, 101),
                ChangeRecord::new("NIFTY BANK", 100, 101),
                ChangeRecord::new("NIFTY AUTO", 7, 7),
                ChangeRecord::new("NIFTY IT", 10, 8),
            ],
            failures: vec![IndexFailure {
                index_name: "Nifty Auto Index".to_string(),
                display_name: Some("NIFTY AUTO".to_string()),
                reason: "upstream returned no records".to_string(),
                attempts: 3,
            }],
            interrupted: false,
        }
    }

    #[test]
    fn groups_render_with_signs() {
        let text = render_summary(&summary().report());
        assert!(text.contains("  +1 -> (NIFTY 50, NIFTY BANK)"));
        assert!(text.contains("  No changes -> (NIFTY AUTO)"));
        assert!(text.contains("  -2 -> (NIFTY IT)"));
    }

    #[test]
    fn increases_come_before_decreases() {
        let text = render_summary(&summary().report());
        let up = text.find("+1 ->").unwrap();
        let same = text.find("No changes").unwrap();
        let down = text.find("-2 ->").unwrap();
        assert!(up < same && same < down);
    }

    #[test]
    fn failures_listed_in_table() {
        let text = render_summary(&summary().report());
        assert!(text.contains("Failed:"));
        assert!(text.contains("Nifty Auto Index"));
        assert!(text.contains("NIFTY AUTO"));
        assert!(text.contains("upstream returned no records"));
        assert!(text.contains("Attempts"));
        assert!(text.contains("4 successful, 1 failed"));
        assert!(!text.contains("Interrupted"));
    }

    #[test]
    fn interrupted_run_reports_progress() {
        let mut summary = RunSummary::new(3);
        summary.changes.push(ChangeRecord::new("NIFTY 50", 0, 1));
        summary.interrupted = true;

        let text = render_summary(&summary.report());
        assert!(text.contains("1 successful, 0 failed"));
        assert!(text.contains("Interrupted after 1 of 3 indices"));
    }

    #[test]
    fn failure_rows_fill_missing_alias() {
        let rows = build_failure_rows(&[IndexFailure {
            index_name: "NIFTY 50".to_string(),
            display_name: None,
            reason: "boom".to_string(),
            attempts: 0,
        }]);
        assert_eq!(rows[0].sent_as, "-");
        assert_eq!(rows[0].attempts, 0);
    }
}
