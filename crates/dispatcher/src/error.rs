//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink worker task ended abnormally
    #[error("sink '{name}' worker failed: {message}")]
    Worker { name: String, message: String },

    /// Contract-level failure (publish, sink write)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    pub fn worker(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Worker {
            name: name.into(),
            message: message.into(),
        }
    }
}
