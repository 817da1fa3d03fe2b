//! Applying the shared design to the current project item.
//!
//! Each function opens its tab first. Controls are written through
//! [`UiPage::set_value`], which fires the events the tool listens for.

use crate::config::Timings;
use crate::error::UiError;
use crate::model::{BackgroundDesign, DeviceDesign, SizeSpec, TextDesign};
use crate::remote::driver::UiPage;
use crate::ui::controls;
use crate::ui::toggle::ensure_toggle;
use tokio::time::sleep;

async fn open_tab(page: &dyn UiPage, tab_id: &str, timings: &Timings) -> Result<(), UiError> {
    page.click(&controls::tab(tab_id)).await?;
    sleep(timings.step_settle()).await;
    Ok(())
}

/// Gradient background with the configured colors and angle.
pub async fn apply_background(
    page: &dyn UiPage,
    background: &BackgroundDesign,
    timings: &Timings,
) -> Result<(), UiError> {
    open_tab(page, controls::TAB_BACKGROUND, timings).await?;
    page.click(controls::BACKGROUND_GRADIENT).await?;
    page.set_value(controls::GRADIENT_ANGLE, &background.angle_degrees.to_string())
        .await?;
    page.set_value(controls::GRADIENT_COLOR_1, &background.color1)
        .await?;
    page.set_value(controls::GRADIENT_COLOR_2, &background.color2)
        .await?;
    Ok(())
}

/// Device frame: shape, position, corner radius and the size's border.
///
/// A size-level corner radius wins over the design's. Sizes without a border
/// get width 0 so a border from an earlier task does not leak through.
pub async fn apply_device(
    page: &dyn UiPage,
    device: &DeviceDesign,
    size: &SizeSpec,
    timings: &Timings,
) -> Result<(), UiError> {
    open_tab(page, controls::TAB_DEVICE, timings).await?;
    ensure_toggle(page, controls::FRAME_TOGGLE, true, timings.step_settle()).await?;

    page.click(&controls::device_shape(&device.shape)).await?;
    page.click(&controls::position_preset(&device.position))
        .await?;

    let radius = size.corner_radius_override.unwrap_or(device.corner_radius);
    page.set_value(controls::CORNER_RADIUS, &radius.to_string())
        .await?;

    match &size.border {
        Some(border) => {
            page.set_value(controls::BORDER_WIDTH, &border.width.to_string())
                .await?;
            page.set_value(controls::BORDER_COLOR, &border.color).await?;
            page.set_value(controls::BORDER_OPACITY, &border.opacity.to_string())
                .await?;
        }
        None => {
            page.set_value(controls::BORDER_WIDTH, "0").await?;
        }
    }
    Ok(())
}

/// Headline with the localized title; the subheadline is always hidden.
pub async fn apply_text(
    page: &dyn UiPage,
    text: &TextDesign,
    title: &str,
    timings: &Timings,
) -> Result<(), UiError> {
    open_tab(page, controls::TAB_TEXT, timings).await?;
    ensure_toggle(page, controls::HEADLINE_TOGGLE, true, timings.step_settle()).await?;
    page.set_value(controls::HEADLINE_TEXT, title).await?;

    page.click(controls::FONT_PICKER).await?;
    page.set_value(controls::FONT_SEARCH, &text.font).await?;
    sleep(timings.step_settle()).await;
    page.click_text(controls::FONT_OPTION, &text.font).await?;

    page.set_value(controls::HEADLINE_WEIGHT, &text.headline_weight)
        .await?;
    page.set_value(controls::HEADLINE_COLOR, &text.headline_color)
        .await?;
    page.set_value(
        controls::TEXT_OFFSET_Y,
        &text.vertical_offset_percent.to_string(),
    )
    .await?;

    ensure_toggle(page, controls::SUBHEADLINE_TOGGLE, false, timings.step_settle()).await?;
    Ok(())
}
