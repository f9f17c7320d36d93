//! CloudOutput trait - downstream point cloud channel
//!
//! Exposes the pollable consumer count the lifecycle controller and the
//! publisher gate on.

use crate::{ContractError, PointCloudMsg};

/// Outbound point cloud channel
pub trait CloudOutput: Send + Sync {
    /// Output topic name
    fn topic(&self) -> &str;

    /// Current number of downstream consumers
    fn subscriber_count(&self) -> usize;

    /// Emit one point cloud
    ///
    /// # Errors
    /// Returns a publish error if the channel cannot accept the message
    fn publish(&self, msg: PointCloudMsg) -> Result<(), ContractError>;
}
