//! Dispatcher - consumer sinks attached to the cloud output

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use contracts::CloudSink;

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::publisher::CloudPublisher;

/// Set of sink workers fed by one [`CloudPublisher`]
///
/// Each attached sink adds one consumer, which is what switches the node's
/// ingestion on.
pub struct Dispatcher {
    publisher: Arc<CloudPublisher>,
    handles: Vec<SinkHandle>,
}

impl Dispatcher {
    pub fn new(publisher: Arc<CloudPublisher>) -> Self {
        Self {
            publisher,
            handles: Vec::new(),
        }
    }

    /// Start feeding `sink`
    #[instrument(name = "dispatcher_attach", skip(self, sink), fields(sink = %sink.name()))]
    pub fn attach<S: CloudSink + Send + 'static>(&mut self, sink: S) {
        let handle = SinkHandle::spawn(sink, self.publisher.subscribe());
        debug!(consumers = self.handles.len() + 1, "sink attached");
        self.handles.push(handle);
    }

    pub fn sink_count(&self) -> usize {
        self.handles.len()
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Detach and close every sink
    ///
    /// All sinks are shut down even if one fails; the first failure is
    /// returned.
    #[instrument(name = "dispatcher_shutdown", skip(self), fields(sinks = self.handles.len()))]
    pub async fn shutdown(self) -> Result<(), DispatcherError> {
        let mut first_error = None;
        for handle in self.handles {
            if let Err(e) = handle.shutdown().await {
                warn!(error = %e, "sink shutdown failed");
                first_error.get_or_insert(e);
            }
        }
        info!("Dispatcher shutdown complete");
        first_error.map_or(Ok(()), Err)
    }
}
