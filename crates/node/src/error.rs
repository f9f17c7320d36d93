//! Node error types

use thiserror::Error;

/// Errors raised while constructing a node
///
/// Runtime failures (decode, publish) never surface as errors; they are
/// logged and counted.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("invalid setting '{field}': {message}")]
    InvalidSetting { field: &'static str, message: String },
}

impl NodeError {
    pub fn invalid_setting(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidSetting {
            field,
            message: message.into(),
        }
    }
}
