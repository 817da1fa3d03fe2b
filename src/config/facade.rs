//! Config loader: parse the project model and layer the run settings.

use crate::config::merge::merge_policy;
use crate::config::sources::project_file::ProjectFormat;
use crate::config::sources::{global_file, project_file};
use crate::config::{GeneratorConfig, RemoteConfig, Timings};
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::model::{ArtifactSpec, DesignSpec, SizeSpec};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project model as written in the file. Parsed with serde directly so locale
/// keys keep their case.
#[derive(Debug, Deserialize)]
struct ProjectFile {
    #[serde(default = "default_output_root")]
    output_root: PathBuf,
    #[serde(default = "default_source_root")]
    source_root: PathBuf,
    artifacts: Vec<ArtifactSpec>,
    design: DesignSpec,
    sizes: Vec<SizeSpec>,
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_source_root() -> PathBuf {
    PathBuf::from("screenshots")
}

/// Layered settings tables.
#[derive(Debug, Default, Deserialize)]
struct RunSettings {
    #[serde(default)]
    remote: RemoteConfig,
    #[serde(default)]
    timings: Timings,
    #[serde(default)]
    logging: LoggingConfig,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a project file (TOML or JSON by extension). Does not validate.
    pub fn load_from_file(path: &Path) -> Result<GeneratorConfig, ApiError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let project = Self::parse_project(&raw, ProjectFormat::from_path(path))
            .map_err(|e| ApiError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let settings = Self::load_settings(path)?;

        debug!(
            config_path = %path.display(),
            artifacts = project.artifacts.len(),
            sizes = project.sizes.len(),
            "Configuration loaded"
        );

        Ok(GeneratorConfig {
            output_root: project.output_root,
            source_root: project.source_root,
            artifacts: project.artifacts,
            design: project.design,
            sizes: project.sizes,
            remote: settings.remote,
            timings: settings.timings,
            logging: settings.logging,
        })
    }

    /// Load only the logging table, for early logger setup.
    pub fn load_logging(path: &Path) -> Result<LoggingConfig, ApiError> {
        Ok(Self::load_settings(path)?.logging)
    }

    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }

    fn parse_project(raw: &str, format: ProjectFormat) -> Result<ProjectFile, String> {
        match format {
            ProjectFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            ProjectFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
        }
    }

    fn load_settings(path: &Path) -> Result<RunSettings, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, path)?;
        let settings = builder
            .add_source(merge_policy::environment())
            .build()?
            .try_deserialize::<RunSettings>()?;
        Ok(settings)
    }
}
