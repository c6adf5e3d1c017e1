use std::path::PathBuf;

use starlay_types::WindowId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid database {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Failed to create {id}: {reason}")]
    Create { id: WindowId, reason: String },

    #[error("Unknown surface {0}")]
    UnknownSurface(WindowId),

    #[error("Video player error: {0}")]
    Player(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Region {index} does not exist ({count} configured)")]
    UnknownRegion { index: usize, count: usize },

    #[error("No hash detected yet")]
    NoCurrentHash,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("Screen capture failed: {0:#}")]
    Screen(anyhow::Error),

    #[error("Region {0} crop lies outside the screenshot")]
    DegenerateCrop(usize),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}
