mod headless;
pub mod player;
#[cfg(windows)]
mod win32;

pub use headless::{HeadlessBackend, Surface};
pub use player::PlayerCommand;
#[cfg(windows)]
pub use win32::Win32Backend;

use starlay_core::OverlayBackend;

/// Native window backend for this platform, headless where there is none
pub fn native_backend(font_family: &str, player: PlayerCommand) -> Box<dyn OverlayBackend> {
    #[cfg(windows)]
    {
        Box::new(Win32Backend::new(font_family, player))
    }

    #[cfg(not(windows))]
    {
        let _ = (font_family, player);
        tracing::warn!("No native overlay backend on this platform, running headless");
        Box::new(HeadlessBackend::new())
    }
}
