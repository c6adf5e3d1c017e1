use std::path::PathBuf;

use clap::Parser;
use starlay_config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Projects curated translations over a game window", long_about = None)]
pub struct Cli {
    /// Settings file, defaults to starlay.json beside the executable
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Region and color override definitions
    #[arg(short, long)]
    pub regions: Option<PathBuf>,

    /// Hash -> translation database
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Directory receiving captured but untranslated regions
    #[arg(long)]
    pub unseen_dir: Option<PathBuf>,

    /// Polling interval in milliseconds
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Track surfaces without creating native windows
    #[arg(long)]
    pub headless: bool,

    /// Do not register the capture hotkey
    #[arg(long)]
    pub no_hotkey: bool,

    /// Start with cutscene playback disabled
    #[arg(long)]
    pub no_cutscene: bool,

    /// Do not read commands from stdin
    #[arg(long)]
    pub no_console: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Command-line flags win over the settings file and environment
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.regions {
            config.regions_path = path.clone();
        }
        if let Some(path) = &self.db {
            config.database_path = path.clone();
        }
        if let Some(path) = &self.unseen_dir {
            config.unseen_dir = path.clone();
        }
        if let Some(interval) = self.interval {
            config.check_interval_ms = interval;
        }
        if self.no_hotkey {
            config.hotkey.enabled = false;
        }
        if self.no_cutscene {
            config.cutscene.enabled = false;
        }
    }
}
