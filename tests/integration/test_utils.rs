//! Shared test utilities for integration tests
//!
//! Provides a project fixture on disk and centralized setup/teardown for the
//! environment variables the config loader reads.

use shotforge::cli::RunContext;
use shotforge::config::{ConfigLoader, GeneratorConfig};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests.
/// Every config load in this binary takes it, so an override set by one test
/// never leaks into another.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

pub fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with XDG_CONFIG_HOME and HOME pointing into `test_dir`, then restore them.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = env_lock();
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    std::fs::create_dir_all(&test_home).unwrap();
    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());

    let result = f();

    env_state.restore();
    result
}

pub const IPHONE: &str = "iPhone 6.9\"";
pub const IPAD: &str = "iPad 13\"";

/// A project directory with a config file, a source tree and an output root.
pub struct Project {
    pub dir: TempDir,
    pub config_path: PathBuf,
}

impl Project {
    /// Two artifacts (`home-screen`, `settings`) in `en` and `de` for the given sizes,
    /// with every settle delay removed and all sources present.
    pub fn new(sizes: &[&str]) -> Self {
        Self::with_extra(sizes, "")
    }

    /// Like [`Project::new`], with raw TOML appended to the config file.
    pub fn with_extra(sizes: &[&str], extra: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("shotforge.toml");
        let project = Self { dir, config_path };

        let mut toml = project_toml(&project.source_root(), &project.output_root());
        for label in sizes {
            toml.push_str(&size_toml(label));
        }
        toml.push_str(FAST_TIMINGS);
        toml.push_str(extra);
        std::fs::write(&project.config_path, toml).unwrap();

        for locale in ["en", "de"] {
            for artifact in ["home-screen", "settings"] {
                project.write_source(locale, artifact);
            }
        }
        project
    }

    pub fn source_root(&self) -> PathBuf {
        self.dir.path().join("shots")
    }

    pub fn output_root(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn write_source(&self, locale: &str, artifact: &str) {
        let path = self.source_root().join(locale).join(format!("{}.png", artifact));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"\x89PNG source").unwrap();
    }

    pub fn remove_source(&self, locale: &str, artifact: &str) {
        let path = self.source_root().join(locale).join(format!("{}.png", artifact));
        std::fs::remove_file(path).unwrap();
    }

    pub fn output(&self, locale: &str, size_dir: &str, artifact: &str) -> PathBuf {
        self.output_root()
            .join(locale)
            .join(size_dir)
            .join(format!("{}.png", artifact))
    }

    pub fn load(&self) -> GeneratorConfig {
        let _guard = env_lock();
        ConfigLoader::load_from_file(&self.config_path).unwrap()
    }

    pub fn context(&self) -> RunContext {
        let _guard = env_lock();
        RunContext::new(self.config_path.clone()).unwrap()
    }
}

fn toml_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn project_toml(source_root: &Path, output_root: &Path) -> String {
    format!(
        r##"output_root = '{}'
source_root = '{}'

[[artifacts]]
id = "home-screen"
[artifacts.titles]
en = "Everything at a glance"
de = "Alles im Blick"

[[artifacts]]
id = "settings"
[artifacts.titles]
en = "Make it yours"
de = "Ganz nach deinem Geschmack"

[design.background]
color1 = "#101820"
color2 = "#2a3b4c"
angle_degrees = 135

[design.device]
corner_radius = 40

[design.text]
font = "Inter"
headline_weight = "700"
headline_color = "#ffffff"
vertical_offset_percent = 8

[remote]
base_url = "http://design.test"
"##,
        toml_path(output_root),
        toml_path(source_root)
    )
}

fn size_toml(label: &str) -> String {
    let (width, height, device_key) = if label.starts_with("iPad") {
        (2064, 2752, "ipad-13")
    } else {
        (1320, 2868, "iphone-6.9")
    };
    format!(
        "\n[[sizes]]\nlabel = '{}'\nwidth = {}\nheight = {}\ndevice_key = \"{}\"\n",
        label, width, height, device_key
    )
}

const FAST_TIMINGS: &str = r#"
[timings]
navigation_settle_ms = 0
reload_settle_ms = 0
retry_settle_ms = 0
step_settle_ms = 0
render_settle_ms = 0
blank_canvas_extra_ms = 0
menu_timeout_ms = 0
network_idle_timeout_ms = 0
"#;
