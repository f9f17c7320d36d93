//! Calibration error types

use std::path::PathBuf;

use thiserror::Error;

/// Calibration loading error
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// File could not be read
    #[error("failed to read calibration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unsupported file extension
    #[error("unsupported calibration format for '{path}'")]
    UnsupportedFormat { path: PathBuf },

    /// Malformed content
    #[error("malformed calibration '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// Content parsed but does not fit the device
    #[error("calibration shape mismatch: {message}")]
    Shape { message: String },
}

impl CalibrationError {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }
}
