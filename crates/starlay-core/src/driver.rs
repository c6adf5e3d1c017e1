use std::time::Duration;

use starlay_config::cutscene::CutsceneConfig;
use starlay_types::{Color, ControlEvent, HashKey, SurfaceOwner, WindowCommand, WindowId};

use crate::cutscene::{CutsceneAutomaton, CutsceneEvent};
use crate::error::{DriverError, SessionError};
use crate::hash::{self, HashExtractor};
use crate::overlay::{self, OverlayBackend};
use crate::reconciler::{Detection, RegionReconciler, TickContext};
use crate::region::RegionSpec;
use crate::screen::ScreenSource;
use crate::session::Session;
use crate::store::{Captured, TranslationStore};

/// What the tick loop should do after a control event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The polling interval changed
    Reschedule(Duration),
    Quit,
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub detections: Vec<Detection>,
    pub cutscene: Option<CutsceneEvent>,
    pub failed_regions: Vec<usize>,
}

/// Single writer of all runtime state.
///
/// Each tick takes one screenshot and feeds that same snapshot to the
/// cutscene automaton and then to every region, applying the resulting
/// window commands as it goes.
pub struct TickDriver<S: ScreenSource, B: OverlayBackend> {
    session: Session,
    store: TranslationStore,
    regions: Vec<RegionReconciler>,
    cutscene: CutsceneAutomaton,
    hasher: Box<dyn HashExtractor>,
    screen: S,
    backend: B,
    preview: Option<WindowId>,
    preview_serial: u32,
    busy: bool,
    ticks: u64,
    closed: bool,
}

impl<S: ScreenSource, B: OverlayBackend> TickDriver<S, B> {
    pub fn new(
        session: Session,
        store: TranslationStore,
        regions: Vec<RegionSpec>,
        cutscene: CutsceneConfig,
        hasher: Box<dyn HashExtractor>,
        screen: S,
        backend: B,
    ) -> Self {
        let regions = regions
            .into_iter()
            .enumerate()
            .map(|(index, spec)| RegionReconciler::new(index, spec))
            .collect();

        Self {
            session,
            store,
            regions,
            cutscene: CutsceneAutomaton::new(cutscene),
            hasher,
            screen,
            backend,
            preview: None,
            preview_serial: 0,
            busy: false,
            ticks: 0,
            closed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &TranslationStore {
        &self.store
    }

    pub fn regions(&self) -> &[RegionReconciler] {
        &self.regions
    }

    pub fn cutscene(&self) -> &CutsceneAutomaton {
        &self.cutscene
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.session.interval_ms())
    }

    /// Sample the screen once and reconcile every surface against it.
    ///
    /// A failing region is torn down and reported, the others carry on.
    pub fn tick(&mut self) -> Result<TickReport, DriverError> {
        if self.busy || self.closed {
            tracing::debug!("Tick skipped");
            return Ok(TickReport::default());
        }
        self.busy = true;
        let result = self.run_tick();
        self.busy = false;
        result
    }

    fn run_tick(&mut self) -> Result<TickReport, DriverError> {
        self.backend.pump();
        let screenshot = self.screen.grab().map_err(DriverError::Screen)?;
        self.ticks += 1;

        let ctx = TickContext {
            database: self.store.database(),
            overrides: self.session.overrides(),
            hasher: self.hasher.as_ref(),
        };
        let mut report = TickReport::default();

        let step = self
            .cutscene
            .step(&screenshot, &ctx, self.session.cutscene_enabled);
        if let Err(e) = overlay::apply_all(&mut self.backend, &step.commands) {
            tracing::error!("Cutscene: {e}");
            overlay::discard(&mut self.backend, &self.cutscene.teardown());
        }
        report.cutscene = step.event;

        for region in &mut self.regions {
            let result = region.reconcile(&screenshot, &ctx, self.session.translation_enabled);
            match overlay::apply_all(&mut self.backend, &result.commands) {
                Ok(()) => report.detections.extend(result.detection),
                Err(e) => {
                    tracing::error!("Region {}: {e}", region.index());
                    overlay::discard(&mut self.backend, &region.teardown());
                    report.failed_regions.push(region.index());
                }
            }
        }

        for detection in &report.detections {
            tracing::info!("Region {}: detected hash {}", detection.region, detection.hash);
            self.session.note_detection(detection);
        }

        Ok(report)
    }

    pub fn handle(&mut self, event: ControlEvent) -> Flow {
        match event {
            ControlEvent::SetTranslationEnabled(enabled) => {
                self.session.translation_enabled = enabled;
                tracing::info!("Translation {}", on_off(enabled));
            }
            ControlEvent::SetCutsceneEnabled(enabled) => {
                self.session.cutscene_enabled = enabled;
                tracing::info!("Cutscene playback {}", on_off(enabled));
            }
            ControlEvent::SetInterval(interval_ms) => {
                let applied = self.session.set_interval(interval_ms);
                tracing::info!("Check interval set to {applied}ms");
                return Flow::Reschedule(Duration::from_millis(applied));
            }
            ControlEvent::SelectRegion(index) => match self.session.select_region(index) {
                Ok(()) => {
                    if let Some(region) = self.regions.get(index) {
                        tracing::info!("Active region set to {index} -> {}", region.spec().crop());
                    }
                }
                Err(e) => tracing::warn!("{e}"),
            },
            ControlEvent::CaptureNow => {
                if let Err(e) = self.capture_active_region() {
                    tracing::warn!("Capture failed: {e}");
                }
            }
            ControlEvent::EditTranslation(text) => self.session.set_edit_buffer(text),
            ControlEvent::SaveTranslation => {
                if let Err(e) = self.save_current() {
                    tracing::warn!("Save failed: {e}");
                }
            }
            ControlEvent::Preview => {
                if let Err(e) = self.preview() {
                    tracing::warn!("Preview failed: {e}");
                }
            }
            ControlEvent::ClearPreview => self.clear_preview(),
            ControlEvent::Status => self.log_status(),
            ControlEvent::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Hash the active region's crop, archiving it when the hash is new, and
    /// make it the target of the next edit
    pub fn capture_active_region(&mut self) -> Result<Captured, DriverError> {
        let index = self.session.active_region();
        let crop = self
            .regions
            .get(index)
            .ok_or(SessionError::UnknownRegion {
                index,
                count: self.regions.len(),
            })?
            .spec()
            .crop();

        let screenshot = self.screen.grab().map_err(DriverError::Screen)?;
        let image = hash::crop(&screenshot, &crop).ok_or(DriverError::DegenerateCrop(index))?;
        let key = self.hasher.extract(&image);

        let captured = self.store.capture(&key, &image)?;
        if captured.is_new {
            tracing::info!("NEW hash {key} added");
        } else {
            tracing::info!("Hash {key} already known");
        }
        self.session.focus(key, captured.text.clone());
        Ok(captured)
    }

    /// Store the edit buffer as the translation of the focused hash
    pub fn save_current(&mut self) -> Result<HashKey, DriverError> {
        let hash = self
            .session
            .current_hash()
            .cloned()
            .ok_or(SessionError::NoCurrentHash)?;
        self.store.set_text(&hash, self.session.edit_buffer())?;
        tracing::info!("Saved translation for {hash}");
        Ok(hash)
    }

    /// Show the edit buffer on the active region's overlay rect
    pub fn preview(&mut self) -> Result<(), DriverError> {
        if self.session.current_hash().is_none() {
            return Err(SessionError::NoCurrentHash.into());
        }
        let index = self.session.active_region();
        let Some(region) = self.regions.get(index) else {
            return Err(SessionError::UnknownRegion {
                index,
                count: self.regions.len(),
            }
            .into());
        };
        let spec = region.spec();

        self.preview_serial = self.preview_serial.wrapping_add(1);
        let id = WindowId {
            owner: SurfaceOwner::Preview,
            serial: self.preview_serial,
        };
        let commands = [
            WindowCommand::CreateOverlay {
                id,
                rect: spec.overlay(),
                background: spec.color().unwrap_or(Color::WHITE),
                holes: spec.holes().to_vec(),
                font_pt: spec.font_pt(),
            },
            WindowCommand::SetText {
                id,
                text: self.session.edit_buffer().to_string(),
            },
        ];

        self.clear_preview();
        if let Err(e) = overlay::apply_all(&mut self.backend, &commands) {
            overlay::discard(&mut self.backend, &[WindowCommand::Destroy { id }]);
            return Err(e.into());
        }
        self.preview = Some(id);
        tracing::info!("Preview displayed");
        Ok(())
    }

    pub fn clear_preview(&mut self) {
        if let Some(id) = self.preview.take() {
            overlay::discard(&mut self.backend, &[WindowCommand::Destroy { id }]);
        }
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    pub fn log_status(&self) {
        let database = self.store.database();
        let showing = self.regions.iter().filter(|r| r.is_showing()).count();
        tracing::info!(
            "translation={} cutscene={} ({:?}) interval={}ms active_region={}/{} current_hash={}",
            on_off(self.session.translation_enabled),
            on_off(self.session.cutscene_enabled),
            self.cutscene.state(),
            self.session.interval_ms(),
            self.session.active_region(),
            self.session.region_count(),
            self.session
                .current_hash()
                .map(HashKey::as_str)
                .unwrap_or("-"),
        );
        tracing::info!(
            "{} translations ({} untranslated), {showing}/{} regions showing, {} surfaces, {} ticks",
            database.len(),
            database.untranslated(),
            self.regions.len(),
            self.backend.live_surfaces(),
            self.ticks,
        );
        for region in &self.regions {
            if let Some(hash) = region.displayed_hash() {
                tracing::info!("Region {} showing {hash}", region.index());
            }
        }
    }

    /// Tear down every overlay, patch, preview and video surface. Safe to
    /// call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for region in &mut self.regions {
            let commands = region.teardown();
            overlay::discard(&mut self.backend, &commands);
        }
        let commands = self.cutscene.teardown();
        overlay::discard(&mut self.backend, &commands);
        self.clear_preview();
        self.backend.destroy_all();
        tracing::info!("All overlays destroyed");
    }
}

impl<S: ScreenSource, B: OverlayBackend> Drop for TickDriver<S, B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}
