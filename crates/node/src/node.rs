//! The post-processing node
//!
//! One task owns all pipeline state: decoded packets are appended to the
//! accumulator, full revolutions are converted and published when someone is
//! listening, and a periodic tick switches the upstream subscription with
//! demand.

use std::future::Future;
use std::sync::Arc;

use cloud::{load_or_warn, CalibrationModel, CloudConverter, ReturnProjector, VelodyneProjector};
use contracts::{CloudOutput, DataPacket, FrameId, InboundMessage, InboundTransport, NodeSettings, Subscription};
use dispatcher::assemble_message;
use ingestion::{
    BatchAccumulator, DecodedPacket, IngestionMetrics, InputDecoder, InputLink, SubscriptionState,
    SubscriptionUpdater, Transition,
};
use tracing::{debug, info, instrument, trace, warn};

use crate::error::NodeError;
use crate::stats::NodeStats;

/// What happened to a completed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Converted and published
    Published { points: usize },
    /// No consumers; discarded without conversion
    Suppressed,
    /// Converted but the output refused it
    Rejected,
}

/// Velodyne post-processing node
pub struct PostNode<T, O, P = VelodyneProjector>
where
    T: InboundTransport + ?Sized,
    O: CloudOutput + ?Sized,
{
    settings: NodeSettings,
    decoder: InputDecoder,
    converter: CloudConverter<P>,
    calibration: Option<CalibrationModel>,
    accumulator: Option<BatchAccumulator>,
    frame_id: FrameId,
    link: InputLink<T>,
    updater: SubscriptionUpdater,
    output: Arc<O>,
    metrics: Arc<IngestionMetrics>,
    stats: NodeStats,
}

impl<T, O> PostNode<T, O, VelodyneProjector>
where
    T: InboundTransport + ?Sized,
    O: CloudOutput + ?Sized,
{
    /// Build a node, loading the calibration named by `settings`
    ///
    /// A calibration that cannot be loaded is logged and replaced by identity
    /// corrections.
    pub fn from_settings(settings: NodeSettings, transport: Arc<T>, output: Arc<O>) -> Result<Self, NodeError> {
        let calibration = load_or_warn(settings.calibration_file.as_deref(), settings.device);
        Self::new(settings, transport, output, calibration)
    }

    pub fn new(
        settings: NodeSettings,
        transport: Arc<T>,
        output: Arc<O>,
        calibration: Option<CalibrationModel>,
    ) -> Result<Self, NodeError> {
        Self::with_projector(settings, transport, output, calibration, VelodyneProjector)
    }
}

impl<T, O, P> PostNode<T, O, P>
where
    T: InboundTransport + ?Sized,
    O: CloudOutput + ?Sized,
    P: ReturnProjector,
{
    #[instrument(
        name = "node_init",
        skip_all,
        fields(
            input = ?settings.input,
            topic = %settings.input_topic(),
            num_data_packets = ?settings.num_data_packets
        )
    )]
    pub fn with_projector(
        settings: NodeSettings,
        transport: Arc<T>,
        output: Arc<O>,
        calibration: Option<CalibrationModel>,
        projector: P,
    ) -> Result<Self, NodeError> {
        validate_settings(&settings)?;

        let accumulator = match settings.num_data_packets {
            Some(n) => Some(BatchAccumulator::with_capacity(n)),
            None => {
                warn!("number of packets per cloud unresolved, decoded packets will be dropped");
                None
            }
        };

        info!(
            device = ?settings.device,
            min_distance = settings.min_distance,
            max_distance = settings.max_distance,
            calibrated = calibration.is_some(),
            output = %output.topic(),
            "node configured"
        );

        Ok(Self {
            decoder: InputDecoder::for_mode(settings.input),
            converter: CloudConverter::new(projector),
            calibration,
            accumulator,
            frame_id: FrameId::default(),
            link: InputLink::from_settings(transport, &settings),
            updater: SubscriptionUpdater::new(),
            output,
            metrics: Arc::new(IngestionMetrics::new()),
            stats: NodeStats::default(),
            settings,
        })
    }

    /// Share ingestion counters with another component (e.g. the bus)
    pub fn with_metrics(mut self, metrics: Arc<IngestionMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn settings(&self) -> &NodeSettings {
        &self.settings
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Most recently observed sensor frame
    pub fn frame_id(&self) -> &FrameId {
        &self.frame_id
    }

    pub fn subscription_state(&self) -> SubscriptionState {
        self.updater.state()
    }

    /// Packets waiting for the current batch to complete
    pub fn pending_packets(&self) -> usize {
        self.accumulator.as_ref().map_or(0, BatchAccumulator::len)
    }

    /// Decode one inbound message and feed it to the pipeline
    ///
    /// A message that fails to decode is dropped; the pending batch is left
    /// untouched.
    #[instrument(level = "trace", name = "node_on_message", skip_all, fields(kind = msg.kind()))]
    pub fn on_message(&mut self, msg: &InboundMessage) -> Option<BatchOutcome> {
        self.stats.messages_received += 1;
        self.metrics.record_received();

        match self.decoder.decode(msg) {
            Ok(decoded) => {
                observability::record_packet_decoded(msg.kind());
                self.ingest(decoded)
            }
            Err(e) => {
                self.stats.decode_errors += 1;
                self.metrics.record_decode_error();
                observability::record_decode_error(msg.kind(), e.kind());
                warn!(error = %e, stamp = msg.header().stamp, "packet dropped");
                None
            }
        }
    }

    /// Append a decoded packet; runs the batch when it completes
    pub fn ingest(&mut self, decoded: DecodedPacket) -> Option<BatchOutcome> {
        self.frame_id = decoded.frame_id;

        let Some(accumulator) = self.accumulator.as_mut() else {
            self.stats.packets_discarded += 1;
            return None;
        };
        accumulator.push(decoded.packet);
        self.stats.packets_ingested += 1;

        let batch = accumulator.try_complete()?;
        Some(self.process_batch(batch))
    }

    /// Convert and publish a completed batch if anyone is listening
    #[instrument(level = "trace", name = "node_process_batch", skip_all, fields(packets = batch.len()))]
    pub fn process_batch(&mut self, batch: Vec<DataPacket>) -> BatchOutcome {
        self.stats.batches_completed += 1;
        observability::record_batch_completed(batch.len());

        if self.output.subscriber_count() == 0 {
            self.stats.clouds_suppressed += 1;
            self.stats.clouds.record_suppressed();
            observability::record_cloud_suppressed();
            trace!("no consumers, batch discarded");
            return BatchOutcome::Suppressed;
        }

        let cloud = self.converter.convert(
            &batch,
            self.calibration.as_ref(),
            self.settings.min_distance,
            self.settings.max_distance,
        );
        let msg = assemble_message(&batch, &cloud, self.frame_id.clone());
        let points = msg.len();
        let stamp = msg.header.stamp;
        self.stats.clouds.update(&msg);

        match self.output.publish(msg) {
            Ok(()) => {
                self.stats.clouds_published += 1;
                observability::record_cloud_published(points);
                debug!(points, stamp, frame_id = %self.frame_id, "cloud published");
                BatchOutcome::Published { points }
            }
            Err(e) => {
                self.stats.publish_errors += 1;
                warn!(error = %e, "cloud publish failed");
                BatchOutcome::Rejected
            }
        }
    }

    /// One lifecycle step: compare demand with the subscription state
    pub fn tick(&mut self) -> Option<Transition> {
        let consumers = self.output.subscriber_count();
        observability::record_consumers(consumers);

        let transition = self.updater.tick(consumers, &mut self.link);
        self.note_transition(transition);
        transition
    }

    fn note_transition(&mut self, transition: Option<Transition>) {
        match transition {
            Some(Transition::Activated) => {
                self.stats.activations += 1;
                observability::record_subscription_active(true);
            }
            Some(Transition::Deactivated) => {
                self.stats.deactivations += 1;
                observability::record_subscription_active(false);
            }
            None => {}
        }
    }

    /// Event loop; returns the final statistics once `shutdown` resolves
    ///
    /// Lifecycle ticks and inbound messages are serviced one at a time.
    #[instrument(name = "node_run", skip_all, fields(topic = %self.link.topic()))]
    pub async fn run<F>(mut self, shutdown: F) -> NodeStats
    where
        F: Future<Output = ()>,
    {
        let mut interval = tokio::time::interval(self.settings.updater_period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(period_ms = self.settings.updater_period.as_millis() as u64, "node running");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => {
                    self.tick();
                }
                Some(msg) = next_message(self.link.subscription()) => {
                    self.on_message(&msg);
                }
            }
        }

        let transition = self.updater.force_inactive(&mut self.link);
        self.note_transition(transition);
        info!(
            packets = self.stats.packets_ingested,
            clouds = self.stats.clouds_published,
            suppressed = self.stats.clouds_suppressed,
            decode_errors = self.stats.decode_errors,
            "node stopped"
        );
        self.stats
    }
}

async fn next_message(subscription: Option<&Subscription>) -> Option<InboundMessage> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

fn validate_settings(settings: &NodeSettings) -> Result<(), NodeError> {
    if settings.min_distance.is_nan()
        || settings.min_distance < 0.0
        || settings.min_distance > settings.max_distance
    {
        return Err(NodeError::invalid_setting(
            "min_distance",
            format!(
                "{} is not within [0, max_distance = {}]",
                settings.min_distance, settings.max_distance
            ),
        ));
    }
    if settings.num_data_packets == Some(0) {
        return Err(NodeError::invalid_setting("num_data_packets", "must be positive"));
    }
    if settings.updater_period.is_zero() {
        return Err(NodeError::invalid_setting("updater_period", "must be positive"));
    }
    Ok(())
}
