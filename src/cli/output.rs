//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, FailureKind};

/// Map domain errors to a message for stderr, with a hint for environment problems.
pub fn map_error(e: &ApiError) -> String {
    match (e.kind(), e) {
        (_, ApiError::BrowserLaunch(_)) => format!(
            "{}\nhint: install Chrome/Chromium or set remote.chrome_executable",
            e
        ),
        (FailureKind::Environment, _) => format!("{}\nhint: check the --config file", e),
        _ => e.to_string(),
    }
}
