//! UI control surface: one function per configuration step of the design tool.
//!
//! Each operation assumes a navigated page and returns once the tool has
//! observably applied the step. Nothing here keeps state between calls.

pub mod controls;
pub mod design;
pub mod project;
pub mod render;
pub mod size;
pub mod toggle;

pub use design::{apply_background, apply_device, apply_text};
pub use project::{reset_project_state, upload_source};
pub use render::{export_artifact, wait_for_render, RenderCheck};
pub use size::select_size;
pub use toggle::ensure_toggle;
