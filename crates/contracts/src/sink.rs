//! CloudSink trait - consumer side of the point cloud channel
//!
//! Defines the abstract interface for sinks attached to the output.

use crate::{ContractError, PointCloudMsg};

/// Point cloud consumer trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(CloudSink: Send)]
pub trait LocalCloudSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume one published cloud
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, cloud: &PointCloudMsg) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
