//! Browser driver seam: the minimal interaction surface the orchestrator needs.

use crate::error::{ApiError, UiError};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// One page inside its own isolated browsing context.
///
/// Element lookups wait up to the driver's element timeout before failing
/// with [`UiError::ElementNotFound`].
#[async_trait]
pub trait UiPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), UiError>;

    /// Reload the current document, discarding in-page state.
    async fn reload(&self) -> Result<(), UiError>;

    /// Wait until network activity settles or the timeout elapses. Never fails on timeout.
    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), UiError>;

    /// Whether `selector` matches something within `timeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool, UiError>;

    async fn count(&self, selector: &str) -> Result<usize, UiError>;

    async fn click(&self, selector: &str) -> Result<(), UiError>;

    /// Click the first element matching `selector` whose trimmed text equals `text`.
    async fn click_text(&self, selector: &str, text: &str) -> Result<(), UiError>;

    /// Fire a `contextmenu` event on the first element matching `selector`.
    async fn context_click(&self, selector: &str) -> Result<(), UiError>;

    /// Read the active/checked state of a toggle control.
    async fn is_active(&self, selector: &str) -> Result<bool, UiError>;

    /// Write a field value and fire `input` and `change` so reactive listeners run.
    async fn set_value(&self, selector: &str, value: &str) -> Result<(), UiError>;

    async fn set_input_file(&self, selector: &str, path: &Path) -> Result<(), UiError>;

    /// True when every sampled pixel of the canvas is fully transparent.
    async fn canvas_is_blank(&self, selector: &str) -> Result<bool, UiError>;

    /// Arm a download listener, click `trigger`, and return the downloaded bytes.
    async fn download(&self, trigger: &str, timeout: Duration) -> Result<Vec<u8>, UiError>;

    /// Close the page and release its browsing context.
    async fn close(&self) -> Result<(), UiError>;
}

/// A running browser process that hands out isolated pages.
#[async_trait]
pub trait BrowserProcess: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn UiPage>, UiError>;

    async fn close(&mut self) -> Result<(), UiError>;
}

/// Starts browser processes.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserProcess>, ApiError>;
}
