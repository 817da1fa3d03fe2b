//! Configuration System
//!
//! Loads the project model (artifacts, design, sizes) and the layered run
//! settings (remote location, timings, logging), and validates them as a unit.
//! Validation reports every problem at once rather than stopping at the first.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::model::{ArtifactSpec, DesignSpec, SizeSpec, Wave};
use crate::task::sanitize_size_label;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration: the loaded project model plus run settings.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root of `{locale}/{size}/{artifact}.png` outputs
    pub output_root: PathBuf,
    /// Default root of `{locale}/{artifact}.png` inputs
    pub source_root: PathBuf,
    pub artifacts: Vec<ArtifactSpec>,
    pub design: DesignSpec,
    pub sizes: Vec<SizeSpec>,
    pub remote: RemoteConfig,
    pub timings: Timings,
    pub logging: LoggingConfig,
}

/// Where the design tool lives and how the browser is launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Explicit base address; skips probing when set
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_local_url")]
    pub local_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

pub(crate) fn default_local_url() -> String {
    "http://localhost:8080".to_string()
}

pub(crate) fn default_fallback_url() -> String {
    "https://appscreen.app".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    1500
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1600
}

fn default_window_height() -> u32 {
    1200
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            local_url: default_local_url(),
            fallback_url: default_fallback_url(),
            probe_timeout_ms: default_probe_timeout_ms(),
            headless: true,
            chrome_executable: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl RemoteConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Named waits, deadlines and limits used by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub navigation_settle_ms: u64,
    pub reload_settle_ms: u64,
    /// Settle after reload on attempts after the first
    pub retry_settle_ms: u64,
    pub step_settle_ms: u64,
    pub render_settle_ms: u64,
    pub blank_canvas_extra_ms: u64,
    pub element_timeout_ms: u64,
    pub menu_timeout_ms: u64,
    pub network_idle_timeout_ms: u64,
    pub task_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub max_retries: u32,
    pub refresh_interval_parallel: usize,
    pub refresh_interval_sequential: usize,
    pub reset_attempt_ceiling: usize,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            navigation_settle_ms: 2000,
            reload_settle_ms: 1500,
            retry_settle_ms: 3000,
            step_settle_ms: 250,
            render_settle_ms: 1500,
            blank_canvas_extra_ms: 2000,
            element_timeout_ms: 10_000,
            menu_timeout_ms: 1500,
            network_idle_timeout_ms: 15_000,
            task_timeout_secs: 90,
            download_timeout_secs: 30,
            max_retries: 3,
            refresh_interval_parallel: 12,
            refresh_interval_sequential: 5,
            reset_attempt_ceiling: 40,
        }
    }
}

impl Timings {
    pub fn navigation_settle(&self) -> Duration {
        Duration::from_millis(self.navigation_settle_ms)
    }

    /// Settle delay after reloading the page for the given attempt.
    pub fn reload_settle(&self, attempt: u32) -> Duration {
        if attempt > 1 {
            Duration::from_millis(self.retry_settle_ms)
        } else {
            Duration::from_millis(self.reload_settle_ms)
        }
    }

    pub fn step_settle(&self) -> Duration {
        Duration::from_millis(self.step_settle_ms)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_millis(self.render_settle_ms)
    }

    pub fn blank_canvas_extra(&self) -> Duration {
        Duration::from_millis(self.blank_canvas_extra_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    pub fn menu_timeout(&self) -> Duration {
        Duration::from_millis(self.menu_timeout_ms)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.network_idle_timeout_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Tasks a session may process before it is recycled.
    pub fn refresh_interval_for(&self, wave: Wave) -> usize {
        match wave {
            Wave::Parallel => self.refresh_interval_parallel,
            Wave::Sequential => self.refresh_interval_sequential,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries == 0 {
            return Err("max_retries must be at least 1".to_string());
        }
        if self.refresh_interval_parallel == 0 || self.refresh_interval_sequential == 0 {
            return Err("refresh intervals must be at least 1".to_string());
        }
        if self.task_timeout_secs == 0 || self.download_timeout_secs == 0 {
            return Err("task and download timeouts must be non-zero".to_string());
        }
        if self.reset_attempt_ceiling == 0 {
            return Err("reset_attempt_ceiling must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Artifact(String, String),
    Size(String, String),
    Project(String),
    Timings(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Artifact(id, msg) => write!(f, "Artifact '{}': {}", id, msg),
            ValidationError::Size(label, msg) => write!(f, "Size '{}': {}", label, msg),
            ValidationError::Project(msg) => write!(f, "Project: {}", msg),
            ValidationError::Timings(msg) => write!(f, "Timings: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl GeneratorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.artifacts.is_empty() {
            errors.push(ValidationError::Project(
                "At least one artifact is required".to_string(),
            ));
        }
        if self.sizes.is_empty() {
            errors.push(ValidationError::Project(
                "At least one size is required".to_string(),
            ));
        }

        let mut artifact_ids = BTreeSet::new();
        for artifact in &self.artifacts {
            if let Err(e) = artifact.validate() {
                errors.push(ValidationError::Artifact(artifact.id.clone(), e));
            }
            if !artifact_ids.insert(artifact.id.as_str()) {
                errors.push(ValidationError::Artifact(
                    artifact.id.clone(),
                    "Duplicate artifact id".to_string(),
                ));
            }
        }

        // Two labels that sanitize alike would write into the same directory.
        let mut output_dirs: HashMap<String, &str> = HashMap::new();
        for size in &self.sizes {
            if let Err(e) = size.validate() {
                errors.push(ValidationError::Size(size.label.clone(), e));
            }
            let dir = sanitize_size_label(&size.label);
            if let Some(existing) = output_dirs.insert(dir.clone(), &size.label) {
                errors.push(ValidationError::Size(
                    size.label.clone(),
                    format!(
                        "Output directory '{}' collides with size '{}'",
                        dir, existing
                    ),
                ));
            }
        }

        if let Err(e) = self.timings.validate() {
            errors.push(ValidationError::Timings(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    /// Number of tasks a full run declares: every artifact locale for every size.
    pub fn total_expected(&self) -> usize {
        let per_size: usize = self.artifacts.iter().map(|a| a.titles.len()).sum();
        per_size * self.sizes.len()
    }

    /// Distinct locale codes across all artifacts, sorted.
    pub fn locales(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.artifacts.iter().flat_map(|a| a.locales()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Source root used for a size.
    pub fn source_dir_for(&self, size: &SizeSpec) -> PathBuf {
        size.source_dir
            .clone()
            .unwrap_or_else(|| self.source_root.clone())
    }

    /// Narrow the run to the given size labels and locales. Empty filters keep everything.
    pub fn restrict(&self, sizes: &[String], locales: &[String]) -> Result<GeneratorConfig, ApiError> {
        let mut restricted = self.clone();

        if !sizes.is_empty() {
            if let Some(unknown) = sizes
                .iter()
                .find(|label| !self.sizes.iter().any(|s| &s.label == *label))
            {
                return Err(ApiError::ConfigError(format!("Unknown size '{}'", unknown)));
            }
            restricted.sizes.retain(|s| sizes.contains(&s.label));
        }

        if !locales.is_empty() {
            let known = self.locales();
            if let Some(unknown) = locales.iter().find(|l| !known.contains(l)) {
                return Err(ApiError::ConfigError(format!("Unknown locale '{}'", unknown)));
            }
            for artifact in &mut restricted.artifacts {
                artifact.titles.retain(|locale, _| locales.contains(locale));
            }
            restricted.artifacts.retain(|a| !a.titles.is_empty());
        }

        Ok(restricted)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{BackgroundDesign, DeviceDesign, TextDesign};
    use std::collections::BTreeMap;

    pub(crate) fn design() -> DesignSpec {
        DesignSpec {
            background: BackgroundDesign {
                color1: "#101820".to_string(),
                color2: "#2a3b4c".to_string(),
                angle_degrees: 135.0,
            },
            device: DeviceDesign {
                corner_radius: 40.0,
                shape: "rounded".to_string(),
                position: "center".to_string(),
            },
            text: TextDesign {
                font: "Inter".to_string(),
                headline_weight: "700".to_string(),
                headline_color: "#ffffff".to_string(),
                vertical_offset_percent: 8.0,
            },
        }
    }

    /// Default limits with every settle delay removed.
    pub(crate) fn fast_timings() -> Timings {
        Timings {
            navigation_settle_ms: 0,
            reload_settle_ms: 0,
            retry_settle_ms: 0,
            step_settle_ms: 0,
            render_settle_ms: 0,
            blank_canvas_extra_ms: 0,
            menu_timeout_ms: 0,
            network_idle_timeout_ms: 0,
            ..Timings::default()
        }
    }

    pub(crate) fn artifact(id: &str, locales: &[&str]) -> ArtifactSpec {
        ArtifactSpec {
            id: id.to_string(),
            titles: locales
                .iter()
                .map(|l| (l.to_string(), format!("{} title {}", id, l)))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    pub(crate) fn size(label: &str) -> SizeSpec {
        SizeSpec {
            label: label.to_string(),
            width: 1320,
            height: 2868,
            device_key: "iphone-6.9".to_string(),
            source_dir: None,
            corner_radius_override: None,
            border: None,
            wave: None,
        }
    }

    pub(crate) fn config() -> GeneratorConfig {
        GeneratorConfig {
            output_root: PathBuf::from("out"),
            source_root: PathBuf::from("src"),
            artifacts: vec![artifact("home", &["de", "en"]), artifact("list", &["de", "en"])],
            design: design(),
            sizes: vec![size("iPhone 6.9\""), size("iPad 13\"")],
            remote: RemoteConfig::default(),
            timings: Timings::default(),
            logging: LoggingConfig::default(),
        }
    }

    #[test]
    fn test_total_expected_is_cross_product() {
        assert_eq!(config().total_expected(), 8);
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_duplicate_artifact_ids_fail() {
        let mut c = config();
        c.artifacts.push(artifact("home", &["en"]));
        let errors = c.validate().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("Duplicate artifact id")));
    }

    #[test]
    fn test_path_like_artifact_ids_fail() {
        for id in ["./home", "a/b", "../x", "..", "sub\\home"] {
            let mut c = config();
            c.artifacts.push(artifact(id, &["de"]));
            let errors = c.validate().unwrap_err();
            assert!(
                errors
                    .iter()
                    .any(|e| e.to_string().contains("single file name segment")),
                "{} was accepted",
                id
            );
        }
    }

    #[test]
    fn test_path_like_locales_and_labels_fail() {
        let mut c = config();
        c.artifacts.push(artifact("banner", &["../de"]));
        c.sizes.push(size("Tablet/Large"));
        let errors = c.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("Invalid locale code '../de'")));
        assert!(errors.iter().any(|e| e.to_string().contains("single directory name")));
    }

    #[test]
    fn test_colliding_output_dirs_fail() {
        let mut c = config();
        c.sizes.push(size("iPhone 6.9'"));
        let errors = c.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.to_string().contains("collides")));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let mut c = config();
        c.timings.max_retries = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_restrict_filters_sizes_and_locales() {
        let c = config();
        let r = c
            .restrict(&["iPad 13\"".to_string()], &["de".to_string()])
            .unwrap();
        assert_eq!(r.sizes.len(), 1);
        assert_eq!(r.locales(), vec!["de".to_string()]);
        assert_eq!(r.total_expected(), 2);
    }

    #[test]
    fn test_restrict_rejects_unknown_names() {
        let c = config();
        assert!(c.restrict(&["Watch".to_string()], &[]).is_err());
        assert!(c.restrict(&[], &["fr".to_string()]).is_err());
    }

    #[test]
    fn test_refresh_interval_smaller_for_sequential_wave() {
        let t = Timings::default();
        assert!(t.refresh_interval_for(Wave::Sequential) < t.refresh_interval_for(Wave::Parallel));
    }

    #[test]
    fn test_retry_settle_is_longer() {
        let t = Timings::default();
        assert!(t.reload_settle(2) > t.reload_settle(1));
    }
}
