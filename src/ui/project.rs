//! Project state of the design tool: clearing persisted items and uploading a source.
//!
//! The tool persists uploaded screenshots across reloads, so every task starts
//! by deleting whatever a previous task (or a previous run) left behind.

use crate::config::Timings;
use crate::error::UiError;
use crate::remote::driver::UiPage;
use crate::ui::controls;
use std::path::Path;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Delete every persisted project item.
///
/// Returns the number of items removed. Stops early when the context menu does
/// not appear; the ceiling bounds the loop if deletes stop taking effect.
pub async fn reset_project_state(page: &dyn UiPage, timings: &Timings) -> Result<usize, UiError> {
    let mut removed = 0;

    for _ in 0..timings.reset_attempt_ceiling {
        if page.count(controls::PROJECT_ITEMS).await? == 0 {
            return Ok(removed);
        }

        page.context_click(controls::PROJECT_ITEMS).await?;
        if !page
            .wait_for(controls::ITEM_CONTEXT_MENU, timings.menu_timeout())
            .await?
        {
            debug!(removed, "Item context menu did not open; stopping reset");
            return Ok(removed);
        }

        page.click(controls::ITEM_MENU_DELETE).await?;
        sleep(timings.step_settle()).await;
        removed += 1;
    }

    let remaining = page.count(controls::PROJECT_ITEMS).await?;
    if remaining > 0 {
        warn!(
            removed,
            remaining,
            ceiling = timings.reset_attempt_ceiling,
            "Project reset hit the attempt ceiling"
        );
    }
    Ok(removed)
}

/// Clear the project, upload `source` and select it as the active item.
pub async fn upload_source(page: &dyn UiPage, source: &Path, timings: &Timings) -> Result<(), UiError> {
    reset_project_state(page, timings).await?;

    page.set_input_file(controls::FILE_INPUT, source).await?;
    if !page
        .wait_for(controls::PROJECT_ITEMS, timings.element_timeout())
        .await?
    {
        return Err(UiError::ElementNotFound(controls::PROJECT_ITEMS.to_string()));
    }
    page.click(controls::LATEST_PROJECT_ITEM).await?;
    sleep(timings.step_settle()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::fake::{FakeScript, FakeUi};
    use std::path::PathBuf;

    #[tokio::test(start_paused = true)]
    async fn reset_deletes_all_items() {
        let ui = FakeUi::new().with_project_items(3);
        let page = ui.open_page();

        let removed = reset_project_state(&page, &Timings::default()).await.unwrap();

        assert_eq!(removed, 3);
        assert_eq!(ui.project_items(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_on_empty_project_is_noop() {
        let ui = FakeUi::new();
        let page = ui.open_page();

        assert_eq!(reset_project_state(&page, &Timings::default()).await.unwrap(), 0);
        assert_eq!(ui.observed().count_events("context_click"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_at_ceiling() {
        let ui = FakeUi::new().with_project_items(10);
        let page = ui.open_page();
        let timings = Timings {
            reset_attempt_ceiling: 4,
            ..Timings::default()
        };

        assert_eq!(reset_project_state(&page, &timings).await.unwrap(), 4);
        assert_eq!(ui.project_items(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_when_menu_missing() {
        let mut script = FakeScript::default();
        script
            .missing_controls
            .insert(controls::ITEM_CONTEXT_MENU.to_string());
        let ui = FakeUi::new().with_project_items(2).with_script(script);
        let page = ui.open_page();

        assert_eq!(reset_project_state(&page, &Timings::default()).await.unwrap(), 0);
        assert_eq!(ui.project_items(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn upload_leaves_exactly_one_item() {
        let ui = FakeUi::new().with_project_items(2);
        let page = ui.open_page();
        let source = PathBuf::from("/shots/en/home.png");

        upload_source(&page, &source, &Timings::default()).await.unwrap();

        assert_eq!(ui.project_items(), 1);
        assert_eq!(ui.observed().uploads, vec![source]);
        assert_eq!(ui.observed().count_events(" click .screenshot-item"), 1);
    }
}
