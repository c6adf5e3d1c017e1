use image::RgbaImage;
use starlay_config::cutscene::CutsceneConfig;
use starlay_types::{Rect, SurfaceOwner, WindowCommand, WindowId};

use crate::hash;
use crate::reconciler::TickContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutsceneState {
    Idle,
    Playing { video: WindowId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutsceneEvent {
    Started,
    Stopped,
    /// Playback was cut short because the feature got disabled
    Reset,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CutsceneStep {
    pub commands: Vec<WindowCommand>,
    pub event: Option<CutsceneEvent>,
}

/// Plays the cutscene video between a start and a stop marker.
///
/// Markers are ordinary database entries: the trigger crop is sampled while
/// idle, the stop crop while playing, and the looked-up text is compared to
/// the configured marker. A marker seen in the wrong state is ignored.
#[derive(Debug)]
pub struct CutsceneAutomaton {
    config: CutsceneConfig,
    state: CutsceneState,
    serial: u32,
}

impl CutsceneAutomaton {
    pub fn new(config: CutsceneConfig) -> Self {
        Self {
            config,
            state: CutsceneState::Idle,
            serial: 0,
        }
    }

    pub fn state(&self) -> CutsceneState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, CutsceneState::Playing { .. })
    }

    pub fn step(&mut self, screenshot: &RgbaImage, ctx: &TickContext<'_>, enabled: bool) -> CutsceneStep {
        if !enabled {
            let commands = self.teardown();
            let event = (!commands.is_empty()).then_some(CutsceneEvent::Reset);
            return CutsceneStep { commands, event };
        }

        match self.state {
            CutsceneState::Idle => {
                if self.sees(screenshot, ctx, self.config.trigger_crop, &self.config.start_marker) {
                    let video = self.next_id();
                    self.state = CutsceneState::Playing { video };
                    tracing::info!("Cutscene started");
                    return CutsceneStep {
                        commands: vec![WindowCommand::ShowVideo {
                            id: video,
                            rect: self.config.overlay_rect,
                            path: self.config.video_path.clone(),
                        }],
                        event: Some(CutsceneEvent::Started),
                    };
                }
            }
            CutsceneState::Playing { .. } => {
                if self.sees(screenshot, ctx, self.config.stop_crop, &self.config.stop_marker) {
                    tracing::info!("Cutscene stopped");
                    return CutsceneStep {
                        commands: self.teardown(),
                        event: Some(CutsceneEvent::Stopped),
                    };
                }
            }
        }

        CutsceneStep::default()
    }

    /// Destroy the video surface if one is live and go back to idle
    pub fn teardown(&mut self) -> Vec<WindowCommand> {
        match std::mem::replace(&mut self.state, CutsceneState::Idle) {
            CutsceneState::Playing { video } => vec![WindowCommand::Destroy { id: video }],
            CutsceneState::Idle => Vec::new(),
        }
    }

    /// A blank marker never matches, otherwise every untranslated crop would
    fn sees(&self, screenshot: &RgbaImage, ctx: &TickContext<'_>, crop: Rect, marker: &str) -> bool {
        let marker = marker.trim();
        if marker.is_empty() {
            return false;
        }
        hash::sample(ctx.hasher, screenshot, &crop)
            .is_some_and(|hash| ctx.database.lookup(hash.as_str()) == marker)
    }

    fn next_id(&mut self) -> WindowId {
        self.serial = self.serial.wrapping_add(1);
        WindowId {
            owner: SurfaceOwner::Cutscene,
            serial: self.serial,
        }
    }
}
