//! Config loading through the layered sources and the CLI validate/plan routes.

use crate::integration::test_utils::{env_lock, with_xdg_env, Project, IPAD, IPHONE};
use shotforge::cli::{Commands, RunContext};
use shotforge::config::ConfigLoader;
use shotforge::error::ApiError;
use tempfile::TempDir;

#[test]
fn test_global_file_fills_settings_the_project_leaves_out() {
    let project = Project::new(&[IPHONE]);
    let xdg = TempDir::new().unwrap();
    let global_dir = xdg.path().join("shotforge");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::write(
        global_dir.join("config.toml"),
        r#"
[remote]
fallback_url = "https://design.example.org"

[timings]
max_retries = 7
task_timeout_secs = 45
"#,
    )
    .unwrap();

    let config = with_xdg_env(&xdg, || {
        assert_eq!(
            ConfigLoader::global_config_path().unwrap(),
            global_dir.join("config.toml")
        );
        ConfigLoader::load_from_file(&project.config_path).unwrap()
    });

    assert_eq!(config.remote.fallback_url, "https://design.example.org");
    assert_eq!(config.remote.base_url.as_deref(), Some("http://design.test"));
    assert_eq!(config.timings.task_timeout_secs, 45);
    assert_eq!(config.timings.max_retries, 7);
    // Project timings table only touches settle delays.
    assert_eq!(config.timings.step_settle_ms, 0);
}

#[test]
fn test_project_file_overrides_global_file() {
    let project = Project::with_extra(&[IPHONE], "max_retries = 5\n");
    let xdg = TempDir::new().unwrap();
    let global_dir = xdg.path().join("shotforge");
    std::fs::create_dir_all(&global_dir).unwrap();
    std::fs::write(global_dir.join("config.toml"), "[timings]\nmax_retries = 7\n").unwrap();

    let config = with_xdg_env(&xdg, || {
        ConfigLoader::load_from_file(&project.config_path).unwrap()
    });

    assert_eq!(config.timings.max_retries, 5);
}

#[test]
fn test_environment_overrides_files() {
    let project = Project::with_extra(&[IPHONE], "max_retries = 5\n");

    let config = {
        let _guard = env_lock();
        std::env::set_var("SHOTFORGE__TIMINGS__MAX_RETRIES", "9");
        std::env::set_var("SHOTFORGE__REMOTE__HEADLESS", "false");
        let loaded = ConfigLoader::load_from_file(&project.config_path);
        std::env::remove_var("SHOTFORGE__TIMINGS__MAX_RETRIES");
        std::env::remove_var("SHOTFORGE__REMOTE__HEADLESS");
        loaded.unwrap()
    };

    assert_eq!(config.timings.max_retries, 9);
    assert!(!config.remote.headless);
}

#[test]
fn test_validate_route_reports_counts() {
    let project = Project::new(&[IPHONE, IPAD]);
    let context = project.context();

    let output = context.execute(&Commands::Validate).unwrap();

    assert_eq!(output.exit_code, 0);
    assert!(output.text.contains("Artifacts: 2"));
    assert!(output.text.contains("Locales: de, en"));
    assert!(output.text.contains("Tasks: 8"));
}

#[test]
fn test_validate_route_collects_every_problem() {
    let project = Project::new(&[IPHONE]);
    let mut raw = std::fs::read_to_string(&project.config_path).unwrap();
    raw.push_str("\n[[artifacts]]\nid = \"settings\"\n[artifacts.titles]\nen = \"Again\"\n");
    raw.push_str("\n[[sizes]]\nlabel = \"iPhone 6.9'\"\nwidth = 1320\nheight = 2868\ndevice_key = \"iphone-6.9\"\n");
    std::fs::write(&project.config_path, raw).unwrap();

    let context = project.context();
    let err = context.execute(&Commands::Validate).unwrap_err();

    match err {
        ApiError::ConfigError(msg) => {
            assert!(msg.contains("Duplicate artifact id"), "{}", msg);
            assert!(msg.contains("collides with size"), "{}", msg);
        }
        other => panic!("expected ConfigError, got {:?}", other),
    }
}

#[test]
fn test_plan_route_lists_waves_and_missing_sources() {
    let project = Project::new(&[IPHONE, IPAD]);
    project.remove_source("de", "settings");
    let context = project.context();

    let output = context.execute(&Commands::Plan).unwrap();

    assert!(output.text.contains("parallel (inferred)"));
    assert!(output.text.contains("sequential (inferred)"));
    assert!(output.text.contains("Total tasks: 8"));
    assert!(output.text.contains("Missing source files (2):"));
}

#[test]
fn test_missing_config_file_fails_context() {
    let temp_dir = TempDir::new().unwrap();
    let _guard = env_lock();
    let err = RunContext::new(temp_dir.path().join("absent.toml")).err().unwrap();
    assert!(matches!(err, ApiError::ConfigError(_)));
}
