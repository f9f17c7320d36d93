//! InboundTransport trait - upstream subscription abstraction
//!
//! The node never talks to the message bus directly; it asks an
//! `InboundTransport` for a [`Subscription`] when there is demand and drops it
//! when demand goes away.

use std::fmt;

use async_channel::Receiver;

use crate::{ContractError, InboundMessage, TransportHints};

/// Source of inbound packet messages
pub trait InboundTransport: Send + Sync {
    /// Subscribe to `topic`
    ///
    /// # Arguments
    /// * `topic` - Topic name
    /// * `queue_depth` - Messages buffered before the transport starts dropping
    /// * `hints` - Reliability preference
    fn subscribe(
        &self,
        topic: &str,
        queue_depth: usize,
        hints: TransportHints,
    ) -> Result<Subscription, ContractError>;
}

type ShutdownHook = Box<dyn FnOnce() + Send + Sync>;

/// Live upstream subscription
///
/// Messages arrive in publish order. Calling [`Subscription::shutdown`] or
/// dropping the value releases the upstream resources.
pub struct Subscription {
    topic: String,
    rx: Receiver<InboundMessage>,
    on_shutdown: Option<ShutdownHook>,
}

impl Subscription {
    /// Wrap a receiver; `on_shutdown` runs exactly once
    pub fn new(
        topic: impl Into<String>,
        rx: Receiver<InboundMessage>,
        on_shutdown: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        Self {
            topic: topic.into(),
            rx,
            on_shutdown: Some(Box::new(on_shutdown)),
        }
    }

    /// Subscribed topic
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next message; `None` once the transport closed the topic
    pub async fn recv(&self) -> Option<InboundMessage> {
        self.rx.recv().await.ok()
    }

    /// Take a message if one is queued
    pub fn try_recv(&self) -> Option<InboundMessage> {
        self.rx.try_recv().ok()
    }

    /// Messages currently queued
    pub fn queued(&self) -> usize {
        self.rx.len()
    }

    /// Release the subscription
    pub fn shutdown(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.rx.close();
        if let Some(hook) = self.on_shutdown.take() {
            hook();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("queued", &self.rx.len())
            .finish()
    }
}
