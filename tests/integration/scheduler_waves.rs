//! Parallel and sequential waves, session recycling and run accounting.

use crate::integration::test_utils::{Project, IPAD, IPHONE};
use shotforge::generation::RunCoordinator;
use shotforge::model::Wave;
use shotforge::remote::fake::{FakeScript, FakeUi};

#[tokio::test]
async fn test_mixed_waves_report_in_config_order() {
    let project = Project::new(&[IPAD, IPHONE]);
    let config = project.load();
    let ui = FakeUi::new();

    let summary = RunCoordinator::new(&config, ui.launcher(), "http://design.test")
        .run()
        .await;

    assert_eq!(summary.total_expected, 8);
    assert_eq!(summary.success_count, 8);
    assert!(summary.is_consistent());
    let labels: Vec<_> = summary.sizes.iter().map(|s| s.size_label.as_str()).collect();
    assert_eq!(labels, vec![IPAD, IPHONE]);
    assert_eq!(summary.sizes[0].wave, Wave::Sequential);
    assert_eq!(summary.sizes[1].wave, Wave::Parallel);
    assert_eq!(summary.per_size[IPAD].success, 4);
    assert_eq!(summary.per_locale["en"].success, 4);
    assert_eq!(ui.observed().launches, 2);
}

#[tokio::test]
async fn test_sessions_recycle_at_the_wave_interval() {
    let project = Project::with_extra(
        &[IPHONE, IPAD],
        "refresh_interval_parallel = 3\nrefresh_interval_sequential = 2\n",
    );
    let config = project.load();
    let ui = FakeUi::new();

    let summary = RunCoordinator::new(&config, ui.launcher(), "http://design.test")
        .run()
        .await;

    assert_eq!(summary.success_count, 8);
    assert_eq!(summary.sizes[0].sessions_created, 2);
    assert_eq!(summary.sizes[1].sessions_created, 2);
    let observed = ui.observed();
    assert_eq!(observed.navigations, 4);
    assert_eq!(observed.pages_closed, 4);
}

#[tokio::test]
async fn test_launch_failure_fails_one_size_and_keeps_accounting() {
    let project = Project::new(&[IPHONE, IPAD]);
    let config = project.load();
    let ui = FakeUi::new().with_script(FakeScript {
        launch_failures: 1,
        ..FakeScript::default()
    });

    let summary = RunCoordinator::new(&config, ui.launcher(), "http://design.test")
        .run()
        .await;

    assert!(summary.is_consistent());
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.failure_count, 4);
    assert_eq!(summary.per_size[IPHONE].failure, 4);
    assert_eq!(summary.per_size[IPAD].success, 4);
    assert!(summary.sizes[0].records.iter().all(|r| r.attempts == 0));
}

#[tokio::test]
async fn test_crash_mid_batch_recreates_session() {
    let project = Project::new(&[IPHONE]);
    let config = project.load();
    let ui = FakeUi::new().with_script(FakeScript {
        fatal_exports: 1,
        ..FakeScript::default()
    });

    let summary = RunCoordinator::new(&config, ui.launcher(), "http://design.test")
        .run()
        .await;

    assert_eq!(summary.success_count, 4);
    assert_eq!(summary.sizes[0].sessions_created, 2);
    assert_eq!(summary.sizes[0].records[0].attempts, 2);
}
