//! Error types for the screenshot generation orchestrator.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving the remote design tool page.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Toggle {control} did not settle to {expected}")]
    ToggleMismatch { control: String, expected: bool },

    #[error("Interaction timed out: {0}")]
    InteractionTimeout(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Download not observed within {0:?}")]
    DownloadTimeout(Duration),

    #[error("Browser connection lost: {0}")]
    ConnectionLost(String),

    #[error("UI I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Source image missing: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("UI error: {0}")]
    Ui(#[from] UiError),

    #[error("Task exceeded timeout of {0:?}")]
    TaskTimeout(Duration),

    #[error("Session fatal: {0}")]
    SessionFatal(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure buckets that drive retry and session recovery decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Input is missing; retrying cannot help.
    Precondition,
    /// Selector, toggle or click problem; retried with a full reset.
    TransientUi,
    /// Page or process is gone; the session must be recreated.
    SessionFatal,
    /// Download or task deadline elapsed; retried like a transient failure.
    ExternalTimeout,
    /// Configuration or host environment problem.
    Environment,
}

impl ApiError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::MissingSource(_) => FailureKind::Precondition,
            ApiError::Ui(UiError::ConnectionLost(_)) | ApiError::SessionFatal(_) => {
                FailureKind::SessionFatal
            }
            ApiError::Ui(UiError::DownloadTimeout(_)) | ApiError::TaskTimeout(_) => {
                FailureKind::ExternalTimeout
            }
            ApiError::Ui(_) | ApiError::Io(_) => FailureKind::TransientUi,
            ApiError::ConfigError(_) | ApiError::BrowserLaunch(_) => FailureKind::Environment,
        }
    }

    /// Whether another attempt with a reset page can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::TransientUi | FailureKind::ExternalTimeout
        )
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
