use std::path::Path;
use std::process::{Child, Command, Stdio};

use starlay_core::OverlayError;
use starlay_types::Rect;

/// Where a video should be rendered
pub struct PlaybackTarget<'a> {
    /// Native handle of the surface the player draws into
    pub hwnd: isize,
    pub path: &'a Path,
    pub rect: Rect,
}

/// External video player invocation, e.g. `vlc --drawable-hwnd={hwnd} {path}`
#[derive(Debug, Clone)]
pub struct PlayerCommand {
    template: Vec<String>,
}

impl PlayerCommand {
    pub fn new(template: Vec<String>) -> Self {
        Self { template }
    }

    /// Substitute `{hwnd}`, `{path}`, `{x}`, `{y}`, `{width}` and `{height}`
    pub fn render(&self, target: &PlaybackTarget<'_>) -> Result<Vec<String>, OverlayError> {
        if self.template.is_empty() {
            return Err(OverlayError::Player("no player command configured".to_string()));
        }

        let path = std::path::absolute(target.path)
            .unwrap_or_else(|_| target.path.to_path_buf())
            .display()
            .to_string();

        Ok(self
            .template
            .iter()
            .map(|arg| {
                arg.replace("{hwnd}", &target.hwnd.to_string())
                    .replace("{path}", &path)
                    .replace("{x}", &target.rect.x.to_string())
                    .replace("{y}", &target.rect.y.to_string())
                    .replace("{width}", &target.rect.width.to_string())
                    .replace("{height}", &target.rect.height.to_string())
            })
            .collect())
    }

    pub fn spawn(&self, target: &PlaybackTarget<'_>) -> Result<Child, OverlayError> {
        let args = self.render(target)?;
        if !target.path.exists() {
            tracing::warn!("Video {} does not exist", target.path.display());
        }

        let child = Command::new(&args[0])
            .args(&args[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| OverlayError::Player(format!("failed to start {}: {e}", args[0])))?;

        tracing::debug!("Started video player (pid {})", child.id());
        Ok(child)
    }
}

/// Stop a player process, ignoring one that already exited
pub fn stop(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}
