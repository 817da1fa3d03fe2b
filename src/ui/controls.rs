//! Named controls of the design tool.
//!
//! Renaming any of these in the tool breaks generation at runtime; there is no
//! way to detect it earlier.

pub const FILE_INPUT: &str = "#file-input";

/// Listed project screenshots, excluding the upload placeholder tile.
pub const PROJECT_ITEMS: &str = ".screenshot-item:not(.upload-placeholder)";
pub const LATEST_PROJECT_ITEM: &str = ".screenshot-item:not(.upload-placeholder):last-of-type";
pub const ITEM_CONTEXT_MENU: &str = ".context-menu.visible";
pub const ITEM_MENU_DELETE: &str = ".context-menu.visible [data-action=\"delete\"]";

pub const SIZE_PICKER: &str = "#output-size-btn";
pub const CUSTOM_WIDTH: &str = "#custom-width";
pub const CUSTOM_HEIGHT: &str = "#custom-height";

pub const TAB_BACKGROUND: &str = "background";
pub const TAB_DEVICE: &str = "device";
pub const TAB_TEXT: &str = "text";

pub const BACKGROUND_GRADIENT: &str = "#bg-type-gradient";
pub const GRADIENT_ANGLE: &str = "#gradient-angle";
pub const GRADIENT_COLOR_1: &str = "#gradient-color-1";
pub const GRADIENT_COLOR_2: &str = "#gradient-color-2";

pub const FRAME_TOGGLE: &str = "#frame-toggle";
pub const CORNER_RADIUS: &str = "#corner-radius";
pub const BORDER_WIDTH: &str = "#border-width";
pub const BORDER_COLOR: &str = "#border-color";
pub const BORDER_OPACITY: &str = "#border-opacity";

pub const HEADLINE_TOGGLE: &str = "#headline-toggle";
pub const HEADLINE_TEXT: &str = "#headline-text";
pub const FONT_PICKER: &str = "#font-picker-btn";
pub const FONT_SEARCH: &str = "#font-search";
pub const FONT_OPTION: &str = ".font-option";
pub const HEADLINE_WEIGHT: &str = "#headline-weight";
pub const HEADLINE_COLOR: &str = "#headline-color";
pub const TEXT_OFFSET_Y: &str = "#text-offset-y";
pub const SUBHEADLINE_TOGGLE: &str = "#subheadline-toggle";

pub const PREVIEW_CANVAS: &str = "#preview-canvas";
pub const EXPORT_BUTTON: &str = "#export-current";

/// Preset button in the size picker for a device key (also used for `custom`).
pub fn size_preset(device_key: &str) -> String {
    format!("[data-device=\"{}\"]", device_key)
}

pub fn tab(tab_id: &str) -> String {
    format!(".tab-btn[data-tab=\"{}\"]", tab_id)
}

pub fn device_shape(shape: &str) -> String {
    format!("[data-shape=\"{}\"]", shape)
}

pub fn position_preset(position: &str) -> String {
    format!("[data-position=\"{}\"]", position)
}
