use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use self::cutscene::CutsceneConfig;
use self::hotkey::HotkeyConfig;
use self::overlay::OverlayConfig;

pub mod cutscene;
pub mod error;
pub mod hotkey;
pub mod overlay;
pub mod paths;
pub mod regions;

pub use error::ConfigError;
pub use regions::{PatchRecord, RectRecord, RegionFile, RegionRecord};

/// Name of the optional application settings file beside the executable
pub const CONFIG_FILE: &str = "starlay.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub overlay: OverlayConfig,
    pub cutscene: CutsceneConfig,
    pub hotkey: HotkeyConfig,

    /// Delay between two screen samples
    pub check_interval_ms: u64,
    /// Hash -> translation database
    pub database_path: PathBuf,
    /// Archive of captured but untranslated regions
    pub unseen_dir: PathBuf,
    /// Region and color override definitions
    pub regions_path: PathBuf,
}

impl Config {
    pub fn new() -> Self {
        let check_interval_ms = env::var("STARLAY_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10); // 10ms default

        let database_path = env::var("STARLAY_HASH_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| paths::beside_exe("hash_db.json"));

        let unseen_dir = env::var("STARLAY_UNSEEN_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| paths::beside_exe("untranslated"));

        let regions_path = env::var("STARLAY_REGIONS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| paths::beside_exe(regions::REGIONS_FILE));

        Config {
            overlay: OverlayConfig::default(),
            cutscene: CutsceneConfig::default(),
            hotkey: HotkeyConfig::default(),

            check_interval_ms,
            database_path,
            unseen_dir,
            regions_path,
        }
    }

    /// Read settings from `path`, falling back to [`Config::new`] when the
    /// file is missing or unreadable
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return Self::new();
        }

        let parsed = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|data| serde_json::from_str::<Config>(&data).map_err(ConfigError::from));

        match parsed {
            Ok(config) => {
                tracing::info!("Loaded settings from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}, using defaults", path.display());
                Self::new()
            }
        }
    }

    /// Polling interval, never below one millisecond
    pub fn check_interval_ms(&self) -> u64 {
        self.check_interval_ms.max(1)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
