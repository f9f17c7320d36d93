//! Pipeline orchestrator - wires transport, node, publisher and sinks.
//!
//! The node runs on the current task; the mock source and every sink worker
//! get their own.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use contracts::{DeviceModel, NodeSettings};
use dispatcher::{CloudPublisher, Dispatcher, LogSink};
use ingestion::{IngestionMetrics, MemoryBus, MockPacketSource, MockSourceConfig};
use node::PostNode;
use tracing::{info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// How often the cloud limit is checked
const LIMIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Resolved node settings
    pub settings: NodeSettings,

    /// Publish synthetic packets at this rate (None = external publisher)
    pub mock_rate: Option<f64>,

    /// Attach a logging consumer to the output
    pub log_clouds: bool,

    /// Stop after this many published clouds (None = unlimited)
    pub max_clouds: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until `signal` resolves, the timeout elapses or the cloud limit is hit
    pub async fn run<F>(self, signal: F) -> Result<PipelineStats>
    where
        F: Future<Output = ()>,
    {
        let start_time = Instant::now();
        let settings = self.config.settings.clone();

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Transport and output
        let metrics = Arc::new(IngestionMetrics::new());
        let bus = Arc::new(MemoryBus::with_metrics(metrics.clone()));
        let publisher = Arc::new(CloudPublisher::new(
            settings.point_cloud_topic.clone(),
            settings.queue_depth.max(1),
        ));

        // Consumers
        let mut dispatcher = Dispatcher::new(publisher.clone());
        if self.config.log_clouds {
            dispatcher.attach(LogSink::new("cloud_log"));
        }
        if dispatcher.sink_count() == 0 {
            warn!(
                topic = %settings.point_cloud_topic,
                "No consumers attached, upstream stays unsubscribed until one appears"
            );
        }
        info!(sinks = dispatcher.sink_count(), "Dispatcher configured");

        let node = PostNode::from_settings(settings.clone(), bus.clone(), publisher.clone())
            .map_err(CliError::from)?
            .with_metrics(metrics.clone());

        // Mock upstream (optional)
        let mock = self.config.mock_rate.map(|rate| {
            let source = MockPacketSource::new(MockSourceConfig {
                topic: settings.input_topic().to_string(),
                input: settings.input,
                device: settings.device.unwrap_or(DeviceModel::Hdl32e),
                packet_rate_hz: rate,
                ..Default::default()
            });
            let handle = source.start(bus.clone());
            info!(rate_hz = rate, topic = %settings.input_topic(), "Running with MOCK packet source");
            (source, handle)
        });

        let shutdown = stop_condition(
            signal,
            self.config.timeout,
            self.config.max_clouds,
            publisher.clone(),
        );

        info!(
            input = %settings.input_topic(),
            output = %settings.point_cloud_topic,
            "Pipeline running"
        );
        let node_stats = node.run(shutdown).await;

        // Cleanup
        if let Some((source, handle)) = mock {
            source.stop();
            if let Err(e) = handle.await {
                warn!(error = %e, "Mock source task failed");
            }
            info!(sent = source.sent(), "Mock packet source stopped");
        }

        let sinks = dispatcher.metrics();
        dispatcher.shutdown().await.map_err(CliError::from)?;

        Ok(PipelineStats {
            node: node_stats,
            ingestion: metrics.snapshot(),
            sinks,
            duration: start_time.elapsed(),
        })
    }
}

/// First of: external signal, timeout, cloud limit
async fn stop_condition<F>(
    signal: F,
    timeout: Option<Duration>,
    max_clouds: Option<u64>,
    publisher: Arc<CloudPublisher>,
) where
    F: Future<Output = ()>,
{
    let timeout = async {
        match timeout {
            Some(duration) => {
                tokio::time::sleep(duration).await;
                info!(timeout_secs = duration.as_secs(), "Timeout reached");
            }
            None => std::future::pending().await,
        }
    };

    let limit = async {
        match max_clouds {
            Some(max) => {
                let mut interval = tokio::time::interval(LIMIT_POLL_INTERVAL);
                while publisher.published() < max {
                    interval.tick().await;
                }
                info!(max_clouds = max, "Cloud limit reached");
            }
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = signal => {},
        _ = timeout => {},
        _ = limit => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_loader::resolve;
    use contracts::PostConfig;

    fn config(log_clouds: bool) -> PipelineConfig {
        let mut post = PostConfig::default();
        post.transport.num_data_packets = Some(10);
        post.transport.subscription_updater_rate = 100.0;

        PipelineConfig {
            settings: resolve(&post).settings,
            mock_rate: Some(2000.0),
            log_clouds,
            max_clouds: Some(2),
            timeout: Some(Duration::from_secs(10)),
            metrics_port: None,
        }
    }

    #[tokio::test]
    async fn test_mock_pipeline_publishes_until_limit() {
        let stats = Pipeline::new(config(true))
            .run(std::future::pending())
            .await
            .unwrap();

        assert!(stats.node.clouds_published >= 2);
        assert!(stats.ingestion.packets_received >= 20);
        assert_eq!(stats.node.decode_errors, 0);
        assert_eq!(stats.sinks.len(), 1);
    }

    #[tokio::test]
    async fn test_no_consumers_publishes_nothing() {
        let mut cfg = config(false);
        cfg.timeout = Some(Duration::from_millis(300));

        let stats = Pipeline::new(cfg).run(std::future::pending()).await.unwrap();

        assert_eq!(stats.node.clouds_published, 0);
        assert_eq!(stats.node.activations, 0);
        assert_eq!(stats.node.packets_ingested, 0);
    }
}
