//! Waiting for the preview to paint and exporting the rendered artifact.

use crate::config::Timings;
use crate::error::UiError;
use crate::remote::driver::UiPage;
use crate::ui::controls;
use std::path::Path;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Result of sampling the preview canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCheck {
    Painted,
    /// Still blank after the extra wait. Export proceeds anyway.
    Blank,
}

/// Let the preview settle, then check it is not blank, waiting once more if it is.
pub async fn wait_for_render(page: &dyn UiPage, timings: &Timings) -> Result<RenderCheck, UiError> {
    sleep(timings.render_settle()).await;
    if !page.canvas_is_blank(controls::PREVIEW_CANVAS).await? {
        return Ok(RenderCheck::Painted);
    }

    debug!("Preview canvas blank; waiting for a late paint");
    sleep(timings.blank_canvas_extra()).await;
    if !page.canvas_is_blank(controls::PREVIEW_CANVAS).await? {
        return Ok(RenderCheck::Painted);
    }

    warn!("Preview canvas still blank; exporting anyway");
    Ok(RenderCheck::Blank)
}

/// Trigger the export, wait for the download and write it to `dest`.
///
/// Returns the number of bytes written. Parent directories are created as needed.
pub async fn export_artifact(page: &dyn UiPage, dest: &Path, timeout: Duration) -> Result<usize, UiError> {
    let bytes = page.download(controls::EXPORT_BUTTON, timeout).await?;
    if bytes.is_empty() {
        return Err(UiError::Script("export produced an empty file".to_string()));
    }

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;

    debug!(path = %dest.display(), bytes = bytes.len(), "Artifact written");
    Ok(bytes.len())
}
