//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded (parse or validation)
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] contracts::ContractError),

    /// Node could not be built from the resolved settings
    #[error("Failed to build node: {0}")]
    Node(#[from] node::NodeError),

    /// Sink shutdown error
    #[error("Error during shutdown: {0}")]
    Shutdown(#[from] dispatcher::DispatcherError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
