//! Demand-aware output channel

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{CloudOutput, ContractError, PointCloudMsg};
use tokio::sync::broadcast;
use tracing::trace;

/// Shared cloud as seen by consumers
pub type SharedCloud = Arc<PointCloudMsg>;

/// Broadcast output for point clouds
///
/// Every live receiver counts as one consumer. Publishing never blocks; slow
/// consumers lag and lose the oldest clouds.
#[derive(Debug)]
pub struct CloudPublisher {
    topic: String,
    tx: broadcast::Sender<SharedCloud>,
    published: AtomicU64,
}

impl CloudPublisher {
    /// `capacity` clouds are retained for lagging consumers
    pub fn new(topic: impl Into<String>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            topic: topic.into(),
            tx,
            published: AtomicU64::new(0),
        }
    }

    /// Register a consumer
    pub fn subscribe(&self) -> broadcast::Receiver<SharedCloud> {
        self.tx.subscribe()
    }

    /// Clouds handed to at least one consumer
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl CloudOutput for CloudPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn publish(&self, msg: PointCloudMsg) -> Result<(), ContractError> {
        let points = msg.len();
        let receivers = self
            .tx
            .send(Arc::new(msg))
            .map_err(|_| ContractError::publish(&self.topic, "no consumers"))?;
        self.published.fetch_add(1, Ordering::Relaxed);
        trace!(topic = %self.topic, points, receivers, "cloud published");
        Ok(())
    }
}
