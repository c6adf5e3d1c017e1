use std::collections::HashMap;

use starlay_core::{OverlayBackend, OverlayError};
use starlay_types::{Color, Rect, WindowCommand, WindowId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Surface {
    Overlay {
        rect: Rect,
        background: Color,
        holes: Vec<Rect>,
        text: String,
    },
    Patch {
        rect: Rect,
        color: Color,
        text: String,
    },
    Video {
        rect: Rect,
    },
}

/// Surface bookkeeping without a display, used on platforms without a
/// native backend and for dry runs
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    surfaces: HashMap<WindowId, Surface>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self, id: WindowId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }
}

impl OverlayBackend for HeadlessBackend {
    fn apply(&mut self, command: &WindowCommand) -> Result<(), OverlayError> {
        match command {
            WindowCommand::CreateOverlay {
                id,
                rect,
                background,
                holes,
                ..
            } => {
                tracing::debug!("Overlay {id} at {rect} ({background})");
                self.surfaces.insert(
                    *id,
                    Surface::Overlay {
                        rect: *rect,
                        background: *background,
                        holes: holes.clone(),
                        text: String::new(),
                    },
                );
            }
            WindowCommand::CreatePatch {
                id,
                rect,
                color,
                text,
                ..
            } => {
                tracing::debug!("Patch {id} at {rect} ({color})");
                self.surfaces.insert(
                    *id,
                    Surface::Patch {
                        rect: *rect,
                        color: *color,
                        text: text.clone(),
                    },
                );
            }
            WindowCommand::SetText { id, text } => match self.surfaces.get_mut(id) {
                Some(Surface::Overlay { text: shown, .. } | Surface::Patch { text: shown, .. }) => {
                    tracing::debug!("{id}: {text:?}");
                    *shown = text.clone();
                }
                Some(Surface::Video { .. }) | None => return Err(OverlayError::UnknownSurface(*id)),
            },
            WindowCommand::ShowVideo { id, rect, path } => {
                tracing::info!("Video {} would play at {rect}", path.display());
                self.surfaces.insert(*id, Surface::Video { rect: *rect });
            }
            WindowCommand::Destroy { id } => {
                if self.surfaces.remove(id).is_some() {
                    tracing::debug!("Destroyed {id}");
                }
            }
        }
        Ok(())
    }

    fn destroy_all(&mut self) {
        self.surfaces.clear();
    }

    fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use starlay_types::SurfaceOwner;

    fn id(serial: u32) -> WindowId {
        WindowId {
            owner: SurfaceOwner::Region(0),
            serial,
        }
    }

    #[test]
    fn test_overlay_lifecycle() {
        let mut backend = HeadlessBackend::new();
        backend
            .apply(&WindowCommand::CreateOverlay {
                id: id(1),
                rect: Rect::new(0, 0, 10, 10),
                background: Color::WHITE,
                holes: Vec::new(),
                font_pt: 13,
            })
            .unwrap();
        backend
            .apply(&WindowCommand::SetText {
                id: id(1),
                text: "Hello".to_string(),
            })
            .unwrap();

        assert!(matches!(
            backend.surface(id(1)),
            Some(Surface::Overlay { text, .. }) if text == "Hello"
        ));

        backend.apply(&WindowCommand::Destroy { id: id(1) }).unwrap();
        backend.apply(&WindowCommand::Destroy { id: id(1) }).unwrap();
        assert_eq!(backend.live_surfaces(), 0);
    }

    #[test]
    fn test_set_text_on_unknown_surface() {
        let mut backend = HeadlessBackend::new();
        let err = backend
            .apply(&WindowCommand::SetText {
                id: id(9),
                text: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, OverlayError::UnknownSurface(_)));
    }
}
