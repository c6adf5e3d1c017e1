use serde::{Deserialize, Serialize};

fn default_font_family() -> String {
    "Courier New".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct OverlayConfig {
    /// Font family used for overlay and patch labels
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
        }
    }
}
