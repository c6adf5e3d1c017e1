use serde::{Deserialize, Serialize};

fn default_enabled() -> bool {
    true
}

fn default_capture() -> String {
    "F8".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Global shortcut for capturing the active region, e.g. "F8" or "ctrl+shift+KeyS"
    #[serde(default = "default_capture")]
    pub capture: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capture: default_capture(),
        }
    }
}
