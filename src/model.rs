//! Configuration model: artifacts, sizes and the shared visual design.
//!
//! Everything here is read-only once loaded; tasks borrow from it.

use crate::task::{is_plain_segment, sanitize_size_label};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Device key that routes width/height into the custom-size panel.
pub const CUSTOM_DEVICE_KEY: &str = "custom";

/// One source image, titled per locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSpec {
    pub id: String,
    /// Locale code to headline text. Keys define the locale set for the artifact.
    pub titles: BTreeMap<String, String>,
}

impl ArtifactSpec {
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.titles.keys().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Artifact id cannot be empty".to_string());
        }
        if !is_plain_segment(&self.id) {
            return Err("Artifact id must be a single file name segment".to_string());
        }
        if self.titles.is_empty() {
            return Err("Artifact must define at least one locale title".to_string());
        }
        if let Some(locale) = self
            .titles
            .keys()
            .find(|l| l.trim().is_empty() || !is_plain_segment(l))
        {
            return Err(format!("Invalid locale code '{}'", locale));
        }
        Ok(())
    }
}

/// Scheduling partition for a size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wave {
    /// Small handheld canvases; sizes run concurrently.
    Parallel,
    /// Large canvases; sizes run one at a time.
    Sequential,
}

impl Wave {
    pub fn as_str(self) -> &'static str {
        match self {
            Wave::Parallel => "parallel",
            Wave::Sequential => "sequential",
        }
    }

    /// Wave for a size that does not declare one.
    ///
    /// Only phone-class labels run in parallel; a tablet marker anywhere in the
    /// label keeps the size sequential.
    pub fn infer_from_label(label: &str) -> Wave {
        let lower = label.to_ascii_lowercase();
        let handheld = ["phone", "handheld"].iter().any(|needle| lower.contains(needle));
        let large = ["tablet", "ipad"].iter().any(|needle| lower.contains(needle));
        if handheld && !large {
            Wave::Parallel
        } else {
            Wave::Sequential
        }
    }
}

/// Optional device border drawn around the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderSpec {
    pub width: f64,
    pub color: String,
    pub opacity: f64,
}

/// One output size class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeSpec {
    /// Human-readable label, also the output directory name after sanitization.
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Preset identifier in the size picker, or `custom`.
    pub device_key: String,
    /// Source root for this size; falls back to the project `source_root`.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,
    #[serde(default)]
    pub corner_radius_override: Option<f64>,
    #[serde(default)]
    pub border: Option<BorderSpec>,
    #[serde(default)]
    pub wave: Option<Wave>,
}

impl SizeSpec {
    pub fn is_custom(&self) -> bool {
        self.device_key == CUSTOM_DEVICE_KEY
    }

    /// Declared wave, or the label inference when none is declared.
    pub fn wave(&self) -> Wave {
        self.wave
            .unwrap_or_else(|| Wave::infer_from_label(&self.label))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("Size label cannot be empty".to_string());
        }
        let dir = sanitize_size_label(&self.label);
        if !is_plain_segment(&dir) {
            return Err(format!(
                "Size label must map to a single directory name, got '{}'",
                dir
            ));
        }
        if self.device_key.trim().is_empty() {
            return Err("Device key cannot be empty".to_string());
        }
        if self.is_custom() && (self.width == 0 || self.height == 0) {
            return Err("Custom sizes require non-zero width and height".to_string());
        }
        if let Some(border) = &self.border {
            if border.width < 0.0 {
                return Err("Border width cannot be negative".to_string());
            }
            if !(0.0..=100.0).contains(&border.opacity) {
                return Err("Border opacity must be between 0 and 100".to_string());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundDesign {
    pub color1: String,
    pub color2: String,
    pub angle_degrees: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDesign {
    pub corner_radius: f64,
    #[serde(default = "default_shape")]
    pub shape: String,
    #[serde(default = "default_position")]
    pub position: String,
}

fn default_shape() -> String {
    "rounded".to_string()
}

fn default_position() -> String {
    "center".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextDesign {
    pub font: String,
    pub headline_weight: String,
    pub headline_color: String,
    pub vertical_offset_percent: f64,
}

/// Visual parameters shared by every artifact and size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSpec {
    pub background: BackgroundDesign,
    pub device: DeviceDesign,
    pub text: TextDesign,
}
