use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the edges of the viewer (settings I/O, driver plumbing).
///
/// The playback core itself never fails: out-of-range inputs are clamped or
/// ignored instead of being reported.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("No configuration directory available")]
    NoConfigDir,

    #[error("Viewer input channel closed")]
    ChannelClosed,
}

impl StoryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoryError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoryError>;
