use std::future::Future;
use std::time::Duration;

use kanal::AsyncReceiver;
use starlay_core::{Flow, OverlayBackend, ScreenSource, TickDriver};
use starlay_types::ControlEvent;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

/// Drive `driver` until quit, cancellation or `shutdown` resolves, then tear
/// every surface down
pub async fn run<S, B>(
    driver: &mut TickDriver<S, B>,
    control_rx: AsyncReceiver<ControlEvent>,
    capture_rx: AsyncReceiver<ControlEvent>,
    cancel: CancellationToken,
    shutdown: impl Future<Output = ()>,
) where
    S: ScreenSource,
    B: OverlayBackend,
{
    tokio::pin!(shutdown);
    let mut interval = ticker(driver.interval());
    tracing::info!("Polling every {}ms", driver.interval().as_millis());

    loop {
        let event = tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested");
                break;
            }
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = driver.tick() {
                    tracing::warn!("Tick failed: {e}");
                }
                continue;
            }
            event = control_rx.recv() => event,
            event = capture_rx.recv() => event,
        };

        let Ok(event) = event else {
            tracing::warn!("Control channel closed");
            break;
        };

        match driver.handle(event) {
            Flow::Continue => {}
            Flow::Reschedule(period) => interval = ticker(period),
            Flow::Quit => {
                tracing::info!("Quit requested");
                break;
            }
        }
    }

    driver.shutdown();
}
