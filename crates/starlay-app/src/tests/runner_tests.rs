use std::time::Duration;

use image::{Rgba, RgbaImage};
use starlay_config::Config;
use starlay_core::{
    OverlayBackend, RegionSpec, ScreenSource, Session, TickDriver, TranslationDatabase,
    TranslationStore,
};
use starlay_overlay::HeadlessBackend;
use starlay_types::{ControlEvent, HashKey, Rect};
use tokio::time::timeout;

use crate::controller::ChannelSet;
use crate::runner;

const CROP: Rect = Rect::new(0, 0, 16, 16);

struct StillScreen(RgbaImage);

impl ScreenSource for StillScreen {
    fn grab(&mut self) -> anyhow::Result<RgbaImage> {
        Ok(self.0.clone())
    }
}

fn corner_hash(image: &RgbaImage) -> HashKey {
    let [r, g, b, _] = image.get_pixel(0, 0).0;
    HashKey::new(format!("{r:02x}{g:02x}{b:02x}"))
}

fn driver(
    dir: &std::path::Path,
    database: TranslationDatabase,
) -> TickDriver<StillScreen, HeadlessBackend> {
    let screen = RgbaImage::from_pixel(64, 64, Rgba([0xa1, 0xb2, 0xc3, 0xff]));
    let spec = RegionSpec::new(CROP, Rect::new(20, 20, 30, 10), Vec::new(), 12, None);

    let mut session = Session::new(&Config::default(), 1, Default::default());
    session.cutscene_enabled = false;
    session.set_interval(5);

    let store = TranslationStore::with_database(
        dir.join("hash_db.json"),
        dir.join("untranslated"),
        database,
    );

    TickDriver::new(
        session,
        store,
        vec![spec],
        Config::default().cutscene,
        Box::new(corner_hash),
        StillScreen(screen),
        HeadlessBackend::new(),
    )
}

#[tokio::test]
async fn test_quit_tears_down_overlays() {
    let dir = tempfile::tempdir().unwrap();
    let database: TranslationDatabase = [("a1b2c3", "Hello")].into_iter().collect();
    let mut driver = driver(dir.path(), database);

    let channels = ChannelSet::new();
    let (control_tx, control_rx) = channels.control;
    let (_capture_tx, capture_rx) = channels.capture;

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        control_tx.to_async().send(ControlEvent::Quit).await.expect("send failed");
    });

    let cancel = tokio_util::sync::CancellationToken::new();
    let finished = timeout(
        Duration::from_secs(5),
        runner::run(
            &mut driver,
            control_rx.to_async(),
            capture_rx.to_async(),
            cancel,
            std::future::pending(),
        ),
    )
    .await;

    assert!(finished.is_ok(), "runner did not stop on quit");
    assert_eq!(driver.backend().live_surfaces(), 0);
    assert_eq!(
        driver.session().current_hash().map(HashKey::as_str),
        Some("a1b2c3")
    );
    assert_eq!(driver.session().edit_buffer(), "Hello");
}

#[tokio::test]
async fn test_hotkey_capture_archives_crop() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = driver(dir.path(), TranslationDatabase::new());

    let channels = ChannelSet::new();
    let (control_tx, control_rx) = channels.control;
    let (capture_tx, capture_rx) = channels.capture;

    assert!(crate::hotkey::request_capture(&capture_tx));
    let cancel = tokio_util::sync::CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        stop.cancel();
    });

    let finished = timeout(
        Duration::from_secs(5),
        runner::run(
            &mut driver,
            control_rx.to_async(),
            capture_rx.to_async(),
            cancel,
            std::future::pending(),
        ),
    )
    .await;
    drop(control_tx);

    assert!(finished.is_ok(), "runner did not stop on cancel");
    assert!(dir.path().join("untranslated").join("a1b2c3.png").exists());
    assert!(driver.store().database().contains("a1b2c3"));

    let saved = std::fs::read_to_string(dir.path().join("hash_db.json")).unwrap();
    assert!(saved.contains("a1b2c3"));
}

#[tokio::test]
async fn test_shutdown_future_stops_runner() {
    let dir = tempfile::tempdir().unwrap();
    let database: TranslationDatabase = [("a1b2c3", "Hello")].into_iter().collect();
    let mut driver = driver(dir.path(), database);

    let channels = ChannelSet::new();
    let (_control_tx, control_rx) = channels.control;
    let (_capture_tx, capture_rx) = channels.capture;

    let finished = timeout(
        Duration::from_secs(5),
        runner::run(
            &mut driver,
            control_rx.to_async(),
            capture_rx.to_async(),
            tokio_util::sync::CancellationToken::new(),
            tokio::time::sleep(Duration::from_millis(100)),
        ),
    )
    .await;

    assert!(finished.is_ok(), "runner ignored shutdown");
    assert_eq!(driver.backend().live_surfaces(), 0);
}
