use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use starlay_types::Rect;

use crate::error::ConfigError;

fn default_enabled() -> bool {
    true
}

fn default_trigger_crop() -> Rect {
    Rect::new(752, 241, 413, 111)
}

fn default_stop_crop() -> Rect {
    Rect::new(1191, 433, 62, 69)
}

fn default_overlay_rect() -> Rect {
    Rect::new(641, 60, 639, 960)
}

fn default_video_path() -> PathBuf {
    PathBuf::from("cg.mp4")
}

fn default_start_marker() -> String {
    "__START_CG__".to_string()
}

fn default_stop_marker() -> String {
    "__STOP_CG__".to_string()
}

/// `{hwnd}`, `{path}`, `{x}`, `{y}`, `{width}` and `{height}` are substituted
/// before the player is spawned
fn default_player_command() -> Vec<String> {
    [
        "vlc",
        "--intf=dummy",
        "--no-video-title-show",
        "--quiet",
        "--no-audio",
        "--play-and-exit",
        "--drawable-hwnd={hwnd}",
        "{path}",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CutsceneConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Sampled while idle, looking for the start marker
    #[serde(default = "default_trigger_crop")]
    pub trigger_crop: Rect,
    /// Sampled while playing, looking for the stop marker
    #[serde(default = "default_stop_crop")]
    pub stop_crop: Rect,
    /// Where the video surface is placed
    #[serde(default = "default_overlay_rect")]
    pub overlay_rect: Rect,
    #[serde(default = "default_video_path")]
    pub video_path: PathBuf,
    #[serde(default = "default_start_marker")]
    pub start_marker: String,
    #[serde(default = "default_stop_marker")]
    pub stop_marker: String,
    #[serde(default = "default_player_command")]
    pub player_command: Vec<String>,
}

impl Default for CutsceneConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            trigger_crop: default_trigger_crop(),
            stop_crop: default_stop_crop(),
            overlay_rect: default_overlay_rect(),
            video_path: default_video_path(),
            start_marker: default_start_marker(),
            stop_marker: default_stop_marker(),
            player_command: default_player_command(),
        }
    }
}

impl CutsceneConfig {
    /// Reject markers that would match any untranslated crop or that cannot
    /// tell start from stop
    pub fn validate(&self) -> Result<(), ConfigError> {
        let start = self.start_marker.trim();
        let stop = self.stop_marker.trim();

        if start.is_empty() {
            return Err(ConfigError::InvalidCutscene("start_marker is blank".to_string()));
        }
        if stop.is_empty() {
            return Err(ConfigError::InvalidCutscene("stop_marker is blank".to_string()));
        }
        if start == stop {
            return Err(ConfigError::InvalidCutscene(format!(
                "start_marker and stop_marker are both '{start}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers_are_valid() {
        assert!(CutsceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_blank_or_equal_markers_rejected() {
        let blank_start = CutsceneConfig {
            start_marker: "  ".to_string(),
            ..CutsceneConfig::default()
        };
        assert!(matches!(blank_start.validate(), Err(ConfigError::InvalidCutscene(_))));

        let blank_stop = CutsceneConfig {
            stop_marker: String::new(),
            ..CutsceneConfig::default()
        };
        assert!(matches!(blank_stop.validate(), Err(ConfigError::InvalidCutscene(_))));

        let same = CutsceneConfig {
            start_marker: "__CG__".to_string(),
            stop_marker: " __CG__\n".to_string(),
            ..CutsceneConfig::default()
        };
        assert!(matches!(same.validate(), Err(ConfigError::InvalidCutscene(_))));
    }

    #[test]
    fn test_blank_marker_in_settings_file_is_rejected() {
        let cutscene: CutsceneConfig = serde_json::from_str(r#"{ "start_marker": "" }"#).unwrap();
        assert_eq!(cutscene.stop_marker, "__STOP_CG__");
        assert!(cutscene.validate().is_err());
    }
}
