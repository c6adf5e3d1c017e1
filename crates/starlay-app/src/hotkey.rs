use std::time::Duration;

use kanal::Sender;
use starlay_types::ControlEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Queue a capture for the tick thread. Presses arriving while one is still
/// pending collapse into it.
pub fn request_capture(capture_tx: &Sender<ControlEvent>) -> bool {
    match capture_tx.try_send(ControlEvent::CaptureNow) {
        Ok(true) => true,
        Ok(false) => {
            tracing::debug!("Capture already pending");
            false
        }
        Err(e) => {
            tracing::warn!("Capture mailbox closed: {e}");
            false
        }
    }
}

/// Listen for the capture hotkey on a blocking thread until cancelled. The
/// manager is created and polled on that thread so its messages get pumped.
pub fn spawn_hotkey_listener(
    tasks: &mut JoinSet<()>,
    accelerator: String,
    capture_tx: Sender<ControlEvent>,
    cancel: CancellationToken,
) {
    tasks.spawn_blocking(move || {
        let hotkey_manager = match starlay_capture::HotkeyManager::new(&accelerator) {
            Ok(manager) => manager,
            Err(e) => {
                tracing::error!("Failed to create capture hotkey: {e:#}");
                return;
            }
        };

        tracing::info!("Capture hotkey registered ({accelerator})");

        while !cancel.is_cancelled() {
            if hotkey_manager.poll() {
                tracing::info!("Capture hotkey pressed");
                request_capture(&capture_tx);
            }

            // Sleep briefly to avoid busy loop
            std::thread::sleep(POLL_INTERVAL);
        }

        tracing::info!("Capture hotkey listener stopping");
    });
}
