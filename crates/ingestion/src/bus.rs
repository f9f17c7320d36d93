//! In-process message bus
//!
//! Topic-addressed fan-out used by the mock source, the CLI and the tests.
//! Every subscriber owns a bounded queue; when it is full the newest message
//! is dropped for that subscriber and counted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_channel::{bounded, Sender, TrySendError};
use contracts::{ContractError, InboundMessage, InboundTransport, Subscription, TransportHints};
use tracing::{debug, trace};

use crate::metrics::IngestionMetrics;

type Topics = HashMap<String, Vec<(u64, Sender<InboundMessage>)>>;

/// In-process [`InboundTransport`]
#[derive(Debug, Default)]
pub struct MemoryBus {
    topics: Arc<Mutex<Topics>>,
    next_id: AtomicU64,
    metrics: Arc<IngestionMetrics>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share drop counters with an existing metrics instance
    pub fn with_metrics(metrics: Arc<IngestionMetrics>) -> Self {
        Self {
            metrics,
            ..Default::default()
        }
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    fn lock(topics: &Mutex<Topics>) -> MutexGuard<'_, Topics> {
        topics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver `msg` to every subscriber of `topic`
    ///
    /// Returns the number of subscribers that accepted it.
    pub fn publish(&self, topic: &str, msg: impl Into<InboundMessage>) -> usize {
        let msg = msg.into();
        let topics = Self::lock(&self.topics);
        let Some(subscribers) = topics.get(topic) else {
            trace!(topic, "no subscribers");
            return 0;
        };

        let mut delivered = 0;
        for (id, tx) in subscribers {
            match tx.try_send(msg.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    self.metrics.record_dropped();
                    trace!(topic, subscriber = id, "queue full, message dropped");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }

    /// Live subscribers of `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        Self::lock(&self.topics)
            .get(topic)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl InboundTransport for MemoryBus {
    fn subscribe(
        &self,
        topic: &str,
        queue_depth: usize,
        hints: TransportHints,
    ) -> Result<Subscription, ContractError> {
        if topic.is_empty() {
            return Err(ContractError::subscribe(topic, "empty topic name"));
        }
        if queue_depth == 0 {
            return Err(ContractError::subscribe(topic, "queue depth must be positive"));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = bounded(queue_depth);
        Self::lock(&self.topics)
            .entry(topic.to_string())
            .or_default()
            .push((id, tx));
        debug!(topic, subscriber = id, queue_depth, ?hints, "bus subscriber added");

        let topics = Arc::clone(&self.topics);
        let key = topic.to_string();
        Ok(Subscription::new(topic, rx, move || {
            let mut topics = Self::lock(&topics);
            if let Some(subscribers) = topics.get_mut(&key) {
                subscribers.retain(|(sid, _)| *sid != id);
                if subscribers.is_empty() {
                    topics.remove(&key);
                }
            }
            debug!(topic = %key, subscriber = id, "bus subscriber removed");
        }))
    }
}
