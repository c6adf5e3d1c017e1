use anyhow::{Context, Result};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};

/// Global capture hotkey.
///
/// The manager's hidden window belongs to the thread that created it, so
/// [`HotkeyManager::poll`] must be called from that same thread.
pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyManager {
    /// Register `accelerator`, e.g. `"F8"` or `"ctrl+shift+KeyS"`
    pub fn new(accelerator: &str) -> Result<Self> {
        let hotkey: HotKey = accelerator
            .parse()
            .with_context(|| format!("Invalid hotkey '{accelerator}'"))?;

        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;
        manager
            .register(hotkey)
            .with_context(|| format!("Failed to register hotkey '{accelerator}'"))?;

        Ok(Self { manager, hotkey })
    }

    /// Check if the hotkey was pressed (non-blocking)
    pub fn poll(&self) -> bool {
        pump_thread_messages();

        let receiver = GlobalHotKeyEvent::receiver();
        let mut pressed = false;
        while let Ok(event) = receiver.try_recv() {
            if event.id == self.hotkey.id() && event.state == HotKeyState::Pressed {
                pressed = true;
            } else {
                tracing::trace!("Ignoring hotkey event {:?}", event.id);
            }
        }
        pressed
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.hotkey);
    }
}

/// Dispatch the calling thread's pending window messages. `WM_HOTKEY` only
/// reaches the hotkey receiver through this. Returns how many were handled.
#[cfg(windows)]
pub(crate) fn pump_thread_messages() -> usize {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, MSG, PM_REMOVE, PeekMessageW, TranslateMessage,
    };

    let mut handled = 0;
    unsafe {
        let mut msg = MSG::default();
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
            handled += 1;
        }
    }
    handled
}

#[cfg(not(windows))]
pub(crate) fn pump_thread_messages() -> usize {
    0
}
