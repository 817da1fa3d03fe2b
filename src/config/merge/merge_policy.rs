//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources win key by key: defaults, global file, project file, environment.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

use crate::config::{default_fallback_url, default_local_url};

/// Prefix for environment overrides, e.g. `SHOTFORGE__TIMINGS__MAX_RETRIES=5`.
pub const ENV_PREFIX: &str = "SHOTFORGE";

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("remote.local_url", default_local_url())?
        .set_default("remote.fallback_url", default_fallback_url())?
        .set_default("logging.output", "stderr")
}

/// Environment source applied last.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}
