//! Verify-and-correct for flip-only toggle controls.

use crate::error::UiError;
use crate::remote::driver::UiPage;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Clicks allowed after the initial read before giving up.
const MAX_CORRECTIONS: u32 = 2;

/// Bring a toggle to `desired`.
///
/// Toggles only flip, so the state is read before clicking and read back after
/// every click. A click the tool swallowed is corrected with one more click.
pub async fn ensure_toggle(
    page: &dyn UiPage,
    selector: &str,
    desired: bool,
    settle: Duration,
) -> Result<(), UiError> {
    if page.is_active(selector).await? == desired {
        return Ok(());
    }

    for click in 1..=MAX_CORRECTIONS {
        page.click(selector).await?;
        sleep(settle).await;
        if page.is_active(selector).await? == desired {
            return Ok(());
        }
        debug!(control = selector, desired, click, "Toggle did not change after click");
    }

    Err(UiError::ToggleMismatch {
        control: selector.to_string(),
        expected: desired,
    })
}
