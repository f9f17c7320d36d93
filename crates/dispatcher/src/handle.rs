//! SinkHandle - drives one consumer sink from the cloud broadcast

use std::sync::Arc;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::CloudSink;

use crate::error::DispatcherError;
use crate::metrics::SinkMetrics;
use crate::publisher::SharedCloud;

/// Handle to a running sink worker
///
/// The worker owns a broadcast receiver, so a live handle counts as one
/// consumer. Shutting the handle down drops the receiver.
pub struct SinkHandle {
    name: String,
    metrics: Arc<SinkMetrics>,
    stop_tx: Option<oneshot::Sender<()>>,
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Spawn a worker feeding `sink` from `rx`
    pub fn spawn<S: CloudSink + Send + 'static>(sink: S, rx: broadcast::Receiver<SharedCloud>) -> Self {
        let name = sink.name().to_string();
        let metrics = Arc::new(SinkMetrics::new());
        let (stop_tx, stop_rx) = oneshot::channel();

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();
        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, stop_rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            metrics,
            stop_tx: Some(stop_tx),
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Worker stopped on its own (output closed)
    pub fn is_finished(&self) -> bool {
        self.worker_handle.is_finished()
    }

    /// Stop the worker, flush and close the sink
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(mut self) -> Result<(), DispatcherError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.worker_handle.await.map_err(|e| {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
            DispatcherError::worker(&self.name, e.to_string())
        })?;
        debug!(sink = %self.name, "SinkHandle shutdown complete");
        Ok(())
    }
}

#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, stop_rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: CloudSink>(
    mut sink: S,
    mut rx: broadcast::Receiver<SharedCloud>,
    mut stop_rx: oneshot::Receiver<()>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    loop {
        let cloud = tokio::select! {
            _ = &mut stop_rx => break,
            received = rx.recv() => received,
        };

        match cloud {
            Ok(cloud) => match sink.write(&cloud).await {
                Ok(()) => metrics.record_written(&cloud),
                Err(e) => {
                    metrics.record_failure();
                    error!(
                        sink = %name,
                        stamp = cloud.header.stamp,
                        error = %e,
                        "Write failed"
                    );
                }
            },
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                metrics.record_missed(missed);
                warn!(sink = %name, missed, "Sink lagging, clouds dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    // release demand before the potentially slow flush
    drop(rx);

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
