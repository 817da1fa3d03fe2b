//! Run summary presentation.

use crate::cli::presentation::shared::table;
use crate::generation::RunSummary;
use owo_colors::OwoColorize;

pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Generation summary".bold().underline()));
    out.push_str(&format!("  Design tool: {}\n", summary.base_url));
    if let Some(secs) = summary.elapsed_secs() {
        out.push_str(&format!("  Elapsed: {}s\n", secs));
    }

    let mut sizes = table(vec!["Size", "Wave", "Sessions", "Succeeded", "Failed"]);
    for report in &summary.sizes {
        sizes.add_row(vec![
            report.size_label.clone(),
            report.wave.as_str().to_string(),
            report.sessions_created.to_string(),
            report.successes().to_string(),
            report.failures().to_string(),
        ]);
    }
    out.push_str(&format!("\n{}\n", sizes));

    let mut locales = table(vec!["Locale", "Succeeded", "Failed"]);
    for (locale, counts) in &summary.per_locale {
        locales.add_row(vec![
            locale.clone(),
            counts.success.to_string(),
            counts.failure.to_string(),
        ]);
    }
    out.push_str(&format!("\n{}\n", locales));

    let totals = format!(
        "{} succeeded, {} failed, {} expected",
        summary.success_count, summary.failure_count, summary.total_expected
    );
    if summary.exit_code() == 0 {
        out.push_str(&format!("\n{}", totals.green()));
    } else {
        out.push_str(&format!("\n{}", totals.red()));
    }

    let failed: Vec<_> = summary.failed_records().collect();
    if !failed.is_empty() {
        out.push_str(&format!("\n\nFailures ({}):", failed.len()));
        for record in failed {
            out.push_str(&format!(
                "\n  - {}/{}/{}: {}",
                record.locale,
                record.size_label,
                record.artifact_id,
                record.error.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::SizeReport;
    use crate::model::Wave;
    use crate::task::{Outcome, TaskRecord};
    use std::path::PathBuf;

    #[test]
    fn lists_failures_with_their_errors() {
        let mut summary = RunSummary::new("http://localhost:8080", 2);
        summary.absorb(SizeReport {
            size_label: "iPhone 6.9\"".to_string(),
            wave: Wave::Parallel,
            sessions_created: 1,
            records: vec![
                TaskRecord {
                    artifact_id: "home".to_string(),
                    locale: "de".to_string(),
                    size_label: "iPhone 6.9\"".to_string(),
                    outcome: Outcome::Success,
                    attempts: 1,
                    session_id: Some(1),
                    output_path: PathBuf::from("out/de/iPhone_6.9_/home.png"),
                    error: None,
                },
                TaskRecord {
                    artifact_id: "list".to_string(),
                    locale: "de".to_string(),
                    size_label: "iPhone 6.9\"".to_string(),
                    outcome: Outcome::Failure,
                    attempts: 1,
                    session_id: Some(1),
                    output_path: PathBuf::from("out/de/iPhone_6.9_/list.png"),
                    error: Some("Source image missing: shots/de/list.png".to_string()),
                },
            ],
        });

        let text = format_run_summary(&summary);

        assert!(text.contains("Failures (1):"));
        assert!(text.contains("de/iPhone 6.9\"/list: Source image missing"));
        assert!(text.contains("1 succeeded, 1 failed, 2 expected"));
    }
}
