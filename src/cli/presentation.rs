//! CLI presentation: text formatters per command.

mod config;
mod run;
mod shared;

pub use config::{format_plan, format_validation};
pub use run::format_run_summary;
