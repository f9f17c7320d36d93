//! Upstream input link

use std::sync::Arc;

use contracts::{InboundTransport, InputMode, NodeSettings, Subscription, TransportHints};
use tracing::{debug, instrument};

use crate::error::IngestionError;
use crate::lifecycle::UpstreamLink;

/// Subscription to exactly one decoder input
///
/// Holds the live [`Subscription`] while active. Only the configured input is
/// ever subscribed, so the two decode paths cannot interleave.
pub struct InputLink<T: InboundTransport + ?Sized> {
    transport: Arc<T>,
    mode: InputMode,
    topic: String,
    queue_depth: usize,
    hints: TransportHints,
    subscription: Option<Subscription>,
}

impl<T: InboundTransport + ?Sized> InputLink<T> {
    pub fn new(
        transport: Arc<T>,
        mode: InputMode,
        topic: impl Into<String>,
        queue_depth: usize,
        hints: TransportHints,
    ) -> Self {
        Self {
            transport,
            mode,
            topic: topic.into(),
            queue_depth,
            hints,
            subscription: None,
        }
    }

    /// Link for the input selected in `settings`
    pub fn from_settings(transport: Arc<T>, settings: &NodeSettings) -> Self {
        Self::new(
            transport,
            settings.input,
            settings.input_topic(),
            settings.queue_depth,
            settings.hints,
        )
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

impl<T: InboundTransport + ?Sized> UpstreamLink for InputLink<T> {
    #[instrument(
        name = "input_link_activate",
        skip(self),
        fields(topic = %self.topic, mode = ?self.mode)
    )]
    fn activate(&mut self) -> Result<(), IngestionError> {
        if self.subscription.is_some() {
            return Ok(());
        }
        let subscription = self
            .transport
            .subscribe(&self.topic, self.queue_depth, self.hints)
            .map_err(|source| IngestionError::Subscribe {
                topic: self.topic.clone(),
                source,
            })?;
        debug!(queue_depth = self.queue_depth, hints = ?self.hints, "subscribed");
        self.subscription = Some(subscription);
        Ok(())
    }

    #[instrument(name = "input_link_deactivate", skip(self), fields(topic = %self.topic))]
    fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.shutdown();
            debug!("unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryBus;

    #[test]
    fn test_activate_subscribes_configured_topic() {
        let bus = Arc::new(MemoryBus::new());
        let mut link = InputLink::new(
            bus.clone(),
            InputMode::BinarySnappy,
            "/velodyne/binary_snappy",
            10,
            TransportHints::PreferUnreliable,
        );

        link.activate().unwrap();
        assert!(link.is_subscribed());
        assert_eq!(bus.subscriber_count("/velodyne/binary_snappy"), 1);
        assert_eq!(bus.subscriber_count("/velodyne/data_packet"), 0);

        // idempotent
        link.activate().unwrap();
        assert_eq!(bus.subscriber_count("/velodyne/binary_snappy"), 1);

        link.deactivate();
        assert!(!link.is_subscribed());
        assert_eq!(bus.subscriber_count("/velodyne/binary_snappy"), 0);
    }
}
