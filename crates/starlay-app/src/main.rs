use std::collections::BTreeMap;

use anyhow::Context;
use clap::Parser;
use starlay_capture::{PerceptualHasher, XcapScreen};
use starlay_config::{CONFIG_FILE, Config, RegionFile, paths};
use starlay_core::region::build_regions;
use starlay_core::{OverlayBackend, ScreenSource, Session, TickDriver, TranslationStore};
use starlay_overlay::{HeadlessBackend, PlayerCommand};
use starlay_types::{Color, HashKey};
use tokio::signal;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod console;
pub mod controller;
pub mod hotkey;
pub mod runner;

#[cfg(test)]
mod tests;

use self::cli::Cli;
use self::controller::AppController;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| paths::beside_exe(CONFIG_FILE));
    let mut config = Config::load(&config_path);
    cli.apply(&mut config);
    config.cutscene.validate().context("Invalid cutscene settings")?;

    let region_file = RegionFile::load(&config.regions_path)
        .with_context(|| format!("Invalid region file {}", config.regions_path.display()))?;
    let specs = build_regions(&region_file.regions).context("Invalid region definition")?;
    let overrides: BTreeMap<HashKey, Color> = region_file
        .hash_color_overrides
        .into_iter()
        .map(|(hash, color)| (HashKey::from(hash), color))
        .collect();
    tracing::info!("{} regions, {} color overrides", specs.len(), overrides.len());

    let store = TranslationStore::open(&config.database_path, &config.unseen_dir);
    let session = Session::new(&config, specs.len(), overrides);

    match starlay_capture::list_monitors() {
        Ok(monitors) => {
            for (index, rect) in monitors.iter().enumerate() {
                tracing::debug!("Monitor {index}: {rect}");
            }
        }
        Err(e) => tracing::warn!("Failed to list monitors: {e:#}"),
    }
    let screen: Box<dyn ScreenSource> = Box::new(XcapScreen::primary()?);
    let backend: Box<dyn OverlayBackend> = if cli.headless {
        Box::new(HeadlessBackend::new())
    } else {
        starlay_overlay::native_backend(
            &session.font_family,
            PlayerCommand::new(config.cutscene.player_command.clone()),
        )
    };

    let mut driver = TickDriver::new(
        session,
        store,
        specs,
        config.cutscene.clone(),
        Box::new(PerceptualHasher::new()),
        screen,
        backend,
    );

    let controller = AppController::new(config.hotkey.clone());
    let mut tasks = controller.spawn_tasks(!cli.no_console);
    let (control_rx, capture_rx) = controller.receivers();

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl+c: {e}");
            std::future::pending::<()>().await;
        }
    };

    runner::run(
        &mut driver,
        control_rx,
        capture_rx,
        controller.cancel_token(),
        shutdown,
    )
    .await;

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        if let Err(e) = result {
            tracing::error!("Background task panicked: {e}");
        }
    }

    Ok(())
}
