//! Pipeline statistics and metrics.

use std::time::Duration;

use node::NodeStats;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Node counters and per-cloud aggregates
    pub node: NodeStats,

    /// Transport-side counters
    pub ingestion: ingestion::MetricsSnapshot,

    /// Per-sink delivery counters
    pub sinks: Vec<(String, dispatcher::MetricsSnapshot)>,

    /// Total duration of the pipeline run
    pub duration: Duration,
}

impl PipelineStats {
    /// Published clouds per second
    pub fn cloud_rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.node.clouds_published as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of completed batches discarded for lack of consumers, in percent
    pub fn suppressed_rate(&self) -> f64 {
        let total = self.node.clouds_published + self.node.clouds_suppressed;
        if total > 0 {
            (self.node.clouds_suppressed as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Clouds published: {}", self.node.clouds_published);
        println!(
            "   ├─ Clouds suppressed: {} ({:.2}%)",
            self.node.clouds_suppressed,
            self.suppressed_rate()
        );
        println!("   ├─ Cloud rate: {:.2} Hz", self.cloud_rate());
        println!(
            "   └─ Subscription switches: {} on / {} off",
            self.node.activations, self.node.deactivations
        );

        println!("\n📥 Ingestion");
        println!("   ├─ Messages received: {}", self.node.messages_received);
        println!("   ├─ Packets ingested: {}", self.node.packets_ingested);
        println!("   ├─ Decode errors: {}", self.node.decode_errors);
        println!("   ├─ Packets discarded (no batch size): {}", self.node.packets_discarded);
        println!("   └─ Dropped by transport: {}", self.ingestion.packets_dropped);

        let summary = self.node.clouds.summary();

        println!("\n📈 Point Clouds");
        println!("   ├─ Batches completed: {}", self.node.batches_completed);
        println!("   ├─ Publish errors: {}", self.node.publish_errors);
        println!("   ├─ Points per cloud: {}", summary.points);
        println!("   └─ Cloud period (ms): {}", summary.period_ms);

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (name, metrics) in &self.sinks {
                println!(
                    "   ├─ {}: {} clouds / {} points written, {} missed, {} failed",
                    name,
                    metrics.clouds_written,
                    metrics.points_written,
                    metrics.clouds_missed,
                    metrics.write_failures
                );
            }
        }

        println!();
    }
}
