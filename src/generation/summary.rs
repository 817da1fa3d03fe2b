//! Run-level aggregation of size reports.

use crate::error::ApiError;
use crate::generation::scheduler::SizeReport;
use crate::task::TaskRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub success: usize,
    pub failure: usize,
}

impl Counts {
    fn add(&mut self, record: &TaskRecord) {
        if record.is_success() {
            self.success += 1;
        } else {
            self.failure += 1;
        }
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_expected: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub per_locale: BTreeMap<String, Counts>,
    pub per_size: BTreeMap<String, Counts>,
    /// Size reports in configuration order
    pub sizes: Vec<SizeReport>,
}

impl RunSummary {
    pub fn new(base_url: impl Into<String>, total_expected: usize) -> Self {
        Self {
            base_url: base_url.into(),
            started_at: Utc::now(),
            finished_at: None,
            total_expected,
            success_count: 0,
            failure_count: 0,
            per_locale: BTreeMap::new(),
            per_size: BTreeMap::new(),
            sizes: Vec::new(),
        }
    }

    pub fn absorb(&mut self, report: SizeReport) {
        for record in &report.records {
            self.per_locale
                .entry(record.locale.clone())
                .or_default()
                .add(record);
            self.per_size
                .entry(record.size_label.clone())
                .or_default()
                .add(record);
        }
        self.success_count += report.successes();
        self.failure_count += report.failures();
        self.sizes.push(report);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Every declared task ended in exactly one outcome.
    pub fn is_consistent(&self) -> bool {
        self.success_count + self.failure_count == self.total_expected
    }

    pub fn exit_code(&self) -> i32 {
        if self.failure_count == 0 && self.is_consistent() {
            0
        } else {
            1
        }
    }

    pub fn failed_records(&self) -> impl Iterator<Item = &TaskRecord> {
        self.sizes
            .iter()
            .flat_map(|s| s.records.iter())
            .filter(|r| !r.is_success())
    }

    pub fn elapsed_secs(&self) -> Option<i64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_seconds())
    }

    /// Write the summary as pretty JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ApiError> {
        let json = serde_json::to_vec_pretty(self).map_err(|e| {
            ApiError::ConfigError(format!("Failed to serialize run summary: {}", e))
        })?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Wave;
    use crate::task::Outcome;
    use std::path::PathBuf;

    fn record(locale: &str, size: &str, outcome: Outcome) -> TaskRecord {
        TaskRecord {
            artifact_id: "home".to_string(),
            locale: locale.to_string(),
            size_label: size.to_string(),
            outcome,
            attempts: 1,
            session_id: Some(1),
            output_path: PathBuf::from("out/home.png"),
            error: None,
        }
    }

    fn report(size: &str, records: Vec<TaskRecord>) -> SizeReport {
        SizeReport {
            size_label: size.to_string(),
            wave: Wave::Parallel,
            sessions_created: 1,
            records,
        }
    }

    #[test]
    fn counts_roll_up_by_locale_and_size() {
        let mut summary = RunSummary::new("http://localhost:8080", 3);
        summary.absorb(report(
            "iPhone",
            vec![
                record("de", "iPhone", Outcome::Success),
                record("en", "iPhone", Outcome::Failure),
            ],
        ));
        summary.absorb(report("iPad", vec![record("de", "iPad", Outcome::Success)]));

        assert!(summary.is_consistent());
        assert_eq!(summary.per_locale["de"], Counts { success: 2, failure: 0 });
        assert_eq!(summary.per_size["iPhone"], Counts { success: 1, failure: 1 });
        assert_eq!(summary.failed_records().count(), 1);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn clean_run_exits_zero() {
        let mut summary = RunSummary::new("x", 1);
        summary.absorb(report("iPhone", vec![record("de", "iPhone", Outcome::Success)]));
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn missing_records_break_the_invariant() {
        let mut summary = RunSummary::new("x", 2);
        summary.absorb(report("iPhone", vec![record("de", "iPhone", Outcome::Success)]));
        assert!(!summary.is_consistent());
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn writes_json_report() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("run.json");
        let mut summary = RunSummary::new("x", 1);
        summary.absorb(report("iPhone", vec![record("de", "iPhone", Outcome::Success)]));
        summary.finish();

        summary.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(value["success_count"], 1);
        assert_eq!(value["per_locale"]["de"]["success"], 1);
    }
}
