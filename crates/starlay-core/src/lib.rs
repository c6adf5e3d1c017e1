pub mod cutscene;
pub mod driver;
pub mod error;
pub mod hash;
pub mod overlay;
pub mod reconciler;
pub mod region;
pub mod screen;
pub mod session;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use cutscene::{CutsceneAutomaton, CutsceneEvent, CutsceneState};
pub use driver::{Flow, TickDriver, TickReport};
pub use error::{DriverError, OverlayError, SessionError, StoreError};
pub use hash::HashExtractor;
pub use overlay::OverlayBackend;
pub use reconciler::{Detection, Reconciliation, RegionReconciler, TickContext};
pub use region::{BlockPatch, PatchSpec, RegionSpec};
pub use screen::ScreenSource;
pub use session::Session;
pub use store::{Captured, TranslationDatabase, TranslationStore};
