//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{format_plan, format_run_summary, format_validation};
use crate::config::{ConfigLoader, GeneratorConfig};
use crate::error::ApiError;
use crate::generation::{resolve_base_url, RunCoordinator, SizePlan};
use crate::remote::{BrowserLauncher, ChromiumLauncher};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::{error, info};

/// Text for stdout plus the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn ok(text: String) -> Self {
        Self { text, exit_code: 0 }
    }
}

/// Options of one `generate` invocation.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub base_url: Option<String>,
    pub sizes: Vec<String>,
    pub locales: Vec<String>,
    pub headful: bool,
    pub report: Option<PathBuf>,
}

/// Runtime context for CLI execution: the loaded configuration and an async runtime.
pub struct RunContext {
    config: GeneratorConfig,
    config_path: PathBuf,
    runtime: Runtime,
}

impl RunContext {
    /// Load the configuration file. Validation happens per command.
    pub fn new(config_path: PathBuf) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_from_file(&config_path)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to start async runtime: {}", e)))?;
        Ok(Self {
            config,
            config_path,
            runtime,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, ApiError> {
        let started = Instant::now();
        let name = command_name(command);
        info!(command = name, config = %self.config_path.display(), "Executing command");

        let result = match command {
            Commands::Validate => self.handle_validate(),
            Commands::Plan => self.handle_plan(),
            Commands::Generate {
                base_url,
                sizes,
                locales,
                headful,
                report,
            } => self.handle_generate(GenerateRequest {
                base_url: base_url.clone(),
                sizes: sizes.clone(),
                locales: locales.clone(),
                headful: *headful,
                report: report.clone(),
            }),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(output) => info!(command = name, exit_code = output.exit_code, elapsed_ms, "Command finished"),
            Err(e) => error!(command = name, error = %e, elapsed_ms, "Command failed"),
        }
        result
    }

    fn handle_validate(&self) -> Result<CommandOutput, ApiError> {
        self.config.ensure_valid()?;
        Ok(CommandOutput::ok(format_validation(&self.config)))
    }

    fn handle_plan(&self) -> Result<CommandOutput, ApiError> {
        self.config.ensure_valid()?;
        let plans: Vec<SizePlan> = self
            .config
            .sizes
            .iter()
            .map(|size| SizePlan::for_size(&self.config, size))
            .collect();
        Ok(CommandOutput::ok(format_plan(&plans)))
    }

    fn handle_generate(&self, request: GenerateRequest) -> Result<CommandOutput, ApiError> {
        let mut remote = self.config.remote.clone();
        if request.headful {
            remote.headless = false;
        }
        let launcher: Arc<dyn BrowserLauncher> =
            Arc::new(ChromiumLauncher::new(&remote, &self.config.timings));
        self.generate_with_launcher(request, launcher)
    }

    /// Run a generation batch against the given browser launcher.
    pub fn generate_with_launcher(
        &self,
        request: GenerateRequest,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Result<CommandOutput, ApiError> {
        self.config.ensure_valid()?;
        let config = self.config.restrict(&request.sizes, &request.locales)?;

        let summary = self.runtime.block_on(async {
            let base_url = resolve_base_url(&config.remote, request.base_url.as_deref()).await;
            RunCoordinator::new(&config, launcher, base_url).run().await
        });

        if let Some(path) = &request.report {
            summary.write_json(path)?;
            info!(report = %path.display(), "Run report written");
        }

        Ok(CommandOutput {
            text: format_run_summary(&summary),
            exit_code: summary.exit_code(),
        })
    }
}
