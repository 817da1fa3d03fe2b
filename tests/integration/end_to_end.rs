//! Full generation runs against the scripted design tool.

use crate::integration::test_utils::{Project, IPAD, IPHONE};
use shotforge::cli::GenerateRequest;
use shotforge::generation::RunCoordinator;
use shotforge::remote::fake::{FakeScript, FakeUi};
use shotforge::task::Outcome;

#[test]
fn test_full_batch_writes_every_output() {
    let project = Project::new(&[IPHONE]);
    let context = project.context();
    let ui = FakeUi::new();
    let report_path = project.dir.path().join("reports").join("run.json");

    let output = context
        .generate_with_launcher(
            GenerateRequest {
                report: Some(report_path.clone()),
                ..GenerateRequest::default()
            },
            ui.launcher(),
        )
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.text.contains("4 succeeded, 0 failed, 4 expected"));
    for locale in ["en", "de"] {
        for artifact in ["home-screen", "settings"] {
            let path = project.output(locale, "iPhone_6.9_", artifact);
            assert!(path.exists(), "missing {}", path.display());
            assert!(!std::fs::read(&path).unwrap().is_empty());
        }
    }

    let report: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&report_path).unwrap()).unwrap();
    assert_eq!(report["base_url"], "http://design.test");
    assert_eq!(report["total_expected"], 4);
    assert_eq!(report["success_count"], 4);
    assert_eq!(report["per_locale"]["de"]["success"], 2);
    assert!(report["finished_at"].is_string());

    let observed = ui.observed();
    assert_eq!(observed.launches, 1);
    assert_eq!(observed.uploads.len(), 4);
    assert_eq!(observed.downloads, 4);
    assert_eq!(observed.count_events("goto http://design.test"), 1);
}

#[test]
fn test_missing_source_fails_only_its_task() {
    let project = Project::new(&[IPHONE]);
    project.remove_source("en", "settings");
    let context = project.context();
    let ui = FakeUi::new();

    let output = context
        .generate_with_launcher(GenerateRequest::default(), ui.launcher())
        .unwrap();

    assert_eq!(output.exit_code, 1);
    assert!(output.text.contains("3 succeeded, 1 failed, 4 expected"));
    assert!(output.text.contains("Failures (1):"));
    assert!(output.text.contains("en/iPhone 6.9\"/settings"));
    assert!(!project.output("en", "iPhone_6.9_", "settings").exists());
    assert!(project.output("de", "iPhone_6.9_", "settings").exists());
    assert_eq!(ui.observed().uploads.len(), 3);
}

#[test]
fn test_filters_restrict_the_batch() {
    let project = Project::new(&[IPHONE, IPAD]);
    let context = project.context();
    let ui = FakeUi::new();

    let output = context
        .generate_with_launcher(
            GenerateRequest {
                sizes: vec![IPAD.to_string()],
                locales: vec!["de".to_string()],
                ..GenerateRequest::default()
            },
            ui.launcher(),
        )
        .unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.text.contains("2 succeeded, 0 failed, 2 expected"));
    assert!(project.output("de", "iPad_13_", "home-screen").exists());
    assert!(!project.output("en", "iPad_13_", "home-screen").exists());
    assert!(!project.output("de", "iPhone_6.9_", "home-screen").exists());
}

#[test]
fn test_unknown_filter_is_rejected_before_launch() {
    let project = Project::new(&[IPHONE]);
    let context = project.context();
    let ui = FakeUi::new();

    let result = context.generate_with_launcher(
        GenerateRequest {
            locales: vec!["fr".to_string()],
            ..GenerateRequest::default()
        },
        ui.launcher(),
    );

    assert!(result.is_err());
    assert_eq!(ui.observed().launches, 0);
}

#[tokio::test]
async fn test_transient_export_failures_are_retried() {
    let project = Project::new(&[IPHONE]);
    let config = project.load();
    let ui = FakeUi::new().with_script(FakeScript {
        export_failures: 2,
        ..FakeScript::default()
    });

    let summary = RunCoordinator::new(&config, ui.launcher(), "http://design.test")
        .run()
        .await;

    assert_eq!(summary.success_count, 4);
    assert_eq!(summary.exit_code(), 0);
    let records = &summary.sizes[0].records;
    assert_eq!(records[0].attempts, 3);
    assert!(records[1..].iter().all(|r| r.attempts == 1));
    assert!(records.iter().all(|r| r.outcome == Outcome::Success));
}

#[tokio::test]
async fn test_stale_project_items_are_cleared_before_upload() {
    let project = Project::new(&[IPHONE]);
    let config = project.load();
    let ui = FakeUi::new().with_project_items(5);

    let summary = RunCoordinator::new(&config, ui.launcher(), "http://design.test")
        .run()
        .await;

    assert_eq!(summary.success_count, 4);
    // Each task leaves only its own upload behind.
    assert_eq!(ui.project_items(), 1);
}
