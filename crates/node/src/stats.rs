//! Node counters

use observability::CloudMetricsAggregator;

/// Statistics of a node run
#[derive(Debug, Clone, Default)]
pub struct NodeStats {
    /// Messages taken off the subscription
    pub messages_received: u64,

    /// Packets decoded and appended
    pub packets_ingested: u64,

    /// Messages dropped by the decoder
    pub decode_errors: u64,

    /// Decoded packets dropped because no batch size is known
    pub packets_discarded: u64,

    /// Full revolutions formed
    pub batches_completed: u64,

    /// Clouds handed to the output
    pub clouds_published: u64,

    /// Batches skipped for lack of consumers
    pub clouds_suppressed: u64,

    /// Publishes rejected by the output
    pub publish_errors: u64,

    pub activations: u64,
    pub deactivations: u64,

    /// Per-cloud aggregates
    pub clouds: CloudMetricsAggregator,
}
