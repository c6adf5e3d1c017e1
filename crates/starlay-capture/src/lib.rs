mod hasher;
mod hotkey;
mod screen;

pub use hasher::PerceptualHasher;
pub use hotkey::HotkeyManager;
pub use screen::{XcapScreen, list_monitors};
