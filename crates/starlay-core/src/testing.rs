//! Fakes shared by the unit tests

use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use starlay_types::{HashKey, Rect, SurfaceOwner, WindowCommand, WindowId};

use crate::error::OverlayError;
use crate::overlay::OverlayBackend;
use crate::screen::ScreenSource;

/// Hash of a crop is the hex of its top-left pixel
pub(crate) fn pixel_hash(image: &RgbaImage) -> HashKey {
    let [r, g, b, a] = image.get_pixel(0, 0).0;
    HashKey::new(format!("{r:02x}{g:02x}{b:02x}{a:02x}"))
}

/// 64x64 black screen with `rect` filled with `pixel`
pub(crate) fn screen_with(rect: Rect, pixel: [u8; 4]) -> RgbaImage {
    let mut screen = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0]));
    paint(&mut screen, rect, pixel);
    screen
}

pub(crate) fn paint(screen: &mut RgbaImage, rect: Rect, pixel: [u8; 4]) {
    let (width, height) = screen.dimensions();
    for y in rect.y.max(0) as u32..(rect.bottom().max(0) as u32).min(height) {
        for x in rect.x.max(0) as u32..(rect.right().max(0) as u32).min(width) {
            screen.put_pixel(x, y, Rgba(pixel));
        }
    }
}

pub(crate) struct FakeScreen {
    pub frame: Option<RgbaImage>,
    pub grabs: usize,
}

impl FakeScreen {
    pub fn showing(frame: RgbaImage) -> Self {
        Self {
            frame: Some(frame),
            grabs: 0,
        }
    }
}

impl ScreenSource for FakeScreen {
    fn grab(&mut self) -> anyhow::Result<RgbaImage> {
        self.grabs += 1;
        self.frame
            .clone()
            .ok_or_else(|| anyhow::anyhow!("display unavailable"))
    }
}

/// Applies commands to an in-memory surface set and keeps a log
#[derive(Default)]
pub(crate) struct RecordingBackend {
    pub log: Vec<WindowCommand>,
    pub live: HashSet<WindowId>,
    pub fail_owner: Option<SurfaceOwner>,
    pub pumps: usize,
}

impl RecordingBackend {
    pub fn take_log(&mut self) -> Vec<WindowCommand> {
        std::mem::take(&mut self.log)
    }
}

impl OverlayBackend for RecordingBackend {
    fn apply(&mut self, command: &WindowCommand) -> Result<(), OverlayError> {
        let id = command.id();
        self.log.push(command.clone());

        match command {
            WindowCommand::CreateOverlay { .. }
            | WindowCommand::CreatePatch { .. }
            | WindowCommand::ShowVideo { .. } => {
                if self.fail_owner == Some(id.owner) {
                    return Err(OverlayError::Create {
                        id,
                        reason: "refused by test".to_string(),
                    });
                }
                self.live.insert(id);
            }
            WindowCommand::SetText { .. } => {
                if !self.live.contains(&id) {
                    return Err(OverlayError::UnknownSurface(id));
                }
            }
            WindowCommand::Destroy { .. } => {
                self.live.remove(&id);
            }
        }
        Ok(())
    }

    fn pump(&mut self) {
        self.pumps += 1;
    }

    fn destroy_all(&mut self) {
        self.live.clear();
    }

    fn live_surfaces(&self) -> usize {
        self.live.len()
    }
}
