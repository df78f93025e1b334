use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the stem-runner crate.
#[derive(Debug, Error)]
pub enum RunnerError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("Cannot read track {path}: {reason}")]
    UnreadableAudio { path: PathBuf, reason: String },

    #[error("Stereo narrowing of {value} collapses the image to mono and cannot be widened back")]
    DegenerateStereoWidth { value: i32 },

    #[error("Device {id} is not available")]
    DeviceUnavailable { id: usize },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for RunnerError {
    fn from(e: std::io::Error) -> Self {
        RunnerError::Anyhow(e.into())
    }
}

impl From<hound::Error> for RunnerError {
    fn from(e: hound::Error) -> Self {
        RunnerError::Anyhow(e.into())
    }
}

impl From<serde_yaml::Error> for RunnerError {
    fn from(e: serde_yaml::Error) -> Self {
        RunnerError::Anyhow(e.into())
    }
}

pub type Result<T> = std::result::Result<T, RunnerError>;
