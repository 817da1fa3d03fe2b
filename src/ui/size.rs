use crate::config::Timings;
use crate::error::UiError;
use crate::model::{SizeSpec, CUSTOM_DEVICE_KEY};
use crate::remote::driver::UiPage;
use crate::ui::controls;
use tokio::time::sleep;

/// Pick the output size: a named preset, or the custom panel with explicit dimensions.
pub async fn select_size(page: &dyn UiPage, size: &SizeSpec, timings: &Timings) -> Result<(), UiError> {
    page.click(controls::SIZE_PICKER).await?;
    sleep(timings.step_settle()).await;

    if size.is_custom() {
        page.click(&controls::size_preset(CUSTOM_DEVICE_KEY)).await?;
        sleep(timings.step_settle()).await;
        page.set_value(controls::CUSTOM_WIDTH, &size.width.to_string())
            .await?;
        page.set_value(controls::CUSTOM_HEIGHT, &size.height.to_string())
            .await?;
    } else {
        page.click(&controls::size_preset(&size.device_key)).await?;
    }

    sleep(timings.step_settle()).await;
    Ok(())
}
