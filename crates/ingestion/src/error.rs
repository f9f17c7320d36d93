//! Ingestion error types

use contracts::{ContractError, InputMode};
use thiserror::Error;

/// Per-packet decode failure
///
/// The offending packet is dropped; batch state is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Structured message does not have the device shape
    #[error("malformed packet: {what} has {actual} entries, expected {expected}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Decompressed or declared payload size is wrong
    #[error("payload size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Decompression primitive failed
    #[error("decompression failed: {message}")]
    Decompress { message: String },

    /// Compression primitive failed
    #[error("compression failed: {message}")]
    Compress { message: String },

    /// Message shape does not match the configured input
    #[error("unexpected {got} message while input is {expected:?}")]
    UnexpectedMessage {
        expected: InputMode,
        got: &'static str,
    },
}

impl DecodeError {
    /// Short label for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Shape { .. } => "shape",
            Self::SizeMismatch { .. } => "size_mismatch",
            Self::Decompress { .. } => "decompress",
            Self::Compress { .. } => "compress",
            Self::UnexpectedMessage { .. } => "unexpected_message",
        }
    }
}

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Transport refused the subscription
    #[error("failed to subscribe to {topic}: {source}")]
    Subscribe {
        topic: String,
        #[source]
        source: ContractError,
    },
}
