//! CLI command-name contract for logging.

use crate::cli::parse::Commands;

/// Stable command name recorded on log lines (e.g. "generate", "plan").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Generate { .. } => "generate",
        Commands::Validate => "validate",
        Commands::Plan => "plan",
    }
}
