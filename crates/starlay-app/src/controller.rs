use kanal::{AsyncReceiver, Receiver, Sender};
use starlay_config::hotkey::HotkeyConfig;
use starlay_types::ControlEvent;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::console::spawn_console;
use crate::hotkey::spawn_hotkey_listener;

/// Centralized channel management
pub struct ChannelSet {
    pub control: (Sender<ControlEvent>, Receiver<ControlEvent>),
    pub capture: (Sender<ControlEvent>, Receiver<ControlEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            control: kanal::bounded(64), // console commands
            capture: kanal::bounded(1),  // at most one pending hotkey capture
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    hotkey: HotkeyConfig,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(hotkey: HotkeyConfig) -> Self {
        Self {
            channels: ChannelSet::new(),
            hotkey,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn control_sender(&self) -> Sender<ControlEvent> {
        self.channels.control.0.clone()
    }

    pub fn capture_sender(&self) -> Sender<ControlEvent> {
        self.channels.capture.0.clone()
    }

    /// Receiving ends for the tick loop
    pub fn receivers(&self) -> (AsyncReceiver<ControlEvent>, AsyncReceiver<ControlEvent>) {
        (
            self.channels.control.1.clone_async(),
            self.channels.capture.1.clone_async(),
        )
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    pub fn spawn_tasks(&self, console: bool) -> JoinSet<()> {
        let mut tasks = JoinSet::new();

        if self.hotkey.enabled {
            spawn_hotkey_listener(
                &mut tasks,
                self.hotkey.capture.clone(),
                self.capture_sender(),
                self.cancel_token.child_token(),
            );
        }

        if console {
            match spawn_console(self.control_sender()) {
                Ok(()) => tracing::info!("Console ready, type 'help' for commands"),
                Err(e) => tracing::error!("Failed to start console: {e}"),
            }
        }

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
