#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("region {index}: {source}")]
    Region {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("hash color override '{hash}': {source}")]
    ColorOverride {
        hash: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("region {index}: {reason}")]
    InvalidRegion { index: usize, reason: String },

    #[error("cutscene: {0}")]
    InvalidCutscene(String),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
