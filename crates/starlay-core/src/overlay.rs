use starlay_types::WindowCommand;

use crate::error::OverlayError;

/// Native surface manager driven by [`WindowCommand`]s.
///
/// Surfaces are always-on-top, input-transparent and excluded from screen
/// capture. Destroying an unknown or already destroyed surface is a no-op.
pub trait OverlayBackend {
    fn apply(&mut self, command: &WindowCommand) -> Result<(), OverlayError>;

    /// Service pending native messages, called once per tick
    fn pump(&mut self) {}

    /// Tear down every live surface
    fn destroy_all(&mut self);

    fn live_surfaces(&self) -> usize;
}

impl<T: OverlayBackend + ?Sized> OverlayBackend for Box<T> {
    fn apply(&mut self, command: &WindowCommand) -> Result<(), OverlayError> {
        (**self).apply(command)
    }

    fn pump(&mut self) {
        (**self).pump()
    }

    fn destroy_all(&mut self) {
        (**self).destroy_all()
    }

    fn live_surfaces(&self) -> usize {
        (**self).live_surfaces()
    }
}

/// Apply `commands` in order, stopping at the first failure
pub fn apply_all(
    backend: &mut (impl OverlayBackend + ?Sized),
    commands: &[WindowCommand],
) -> Result<(), OverlayError> {
    for command in commands {
        backend.apply(command)?;
    }
    Ok(())
}

/// Apply teardown commands, logging failures instead of returning them
pub fn discard(backend: &mut (impl OverlayBackend + ?Sized), commands: &[WindowCommand]) {
    for command in commands {
        if let Err(e) = backend.apply(command) {
            tracing::warn!("Teardown of {} failed: {e}", command.id());
        }
    }
}
