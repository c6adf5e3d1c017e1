use anyhow::{Context, Result};
use image::RgbaImage;
use starlay_core::ScreenSource;
use starlay_types::Rect;
use xcap::Monitor;

/// Bounds of every connected monitor
pub fn list_monitors() -> Result<Vec<Rect>> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    Ok(monitors
        .iter()
        .map(|m| Rect::new(m.x(), m.y(), m.width(), m.height()))
        .collect())
}

/// Full-screen snapshots of the first monitor
pub struct XcapScreen {
    monitor: Monitor,
}

impl XcapScreen {
    pub fn primary() -> Result<Self> {
        let monitors = Monitor::all().context("Failed to get monitors")?;
        let monitor = monitors.into_iter().next().context("No monitor found")?;
        tracing::info!(
            "Capturing monitor at ({}, {}) {}x{}",
            monitor.x(),
            monitor.y(),
            monitor.width(),
            monitor.height()
        );
        Ok(Self { monitor })
    }
}

impl ScreenSource for XcapScreen {
    fn grab(&mut self) -> Result<RgbaImage> {
        let image = self
            .monitor
            .capture_image()
            .context("Failed to capture screen")?;
        let (width, height) = (image.width(), image.height());
        RgbaImage::from_raw(width, height, image.into_raw())
            .context("Screen capture returned a truncated buffer")
    }
}
