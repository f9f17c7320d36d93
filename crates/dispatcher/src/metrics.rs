//! Per-sink delivery counters

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use contracts::PointCloudMsg;

/// Delivery counters of one sink worker, shared with its handle
#[derive(Debug, Default)]
pub struct SinkMetrics {
    clouds_written: AtomicU64,
    points_written: AtomicU64,
    write_failures: AtomicU64,
    /// Clouds the broadcast channel overwrote before the sink got to them
    clouds_missed: AtomicU64,
    last_stamp: AtomicI64,
}

impl SinkMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a cloud the sink accepted
    pub fn record_written(&self, cloud: &PointCloudMsg) {
        self.clouds_written.fetch_add(1, Ordering::Relaxed);
        self.points_written
            .fetch_add(cloud.len() as u64, Ordering::Relaxed);
        self.last_stamp.store(cloud.header.stamp, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_missed(&self, missed: u64) {
        self.clouds_missed.fetch_add(missed, Ordering::Relaxed);
    }

    pub fn clouds_written(&self) -> u64 {
        self.clouds_written.load(Ordering::Relaxed)
    }

    pub fn write_failures(&self) -> u64 {
        self.write_failures.load(Ordering::Relaxed)
    }

    pub fn clouds_missed(&self) -> u64 {
        self.clouds_missed.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            clouds_written: self.clouds_written(),
            points_written: self.points_written.load(Ordering::Relaxed),
            write_failures: self.write_failures(),
            clouds_missed: self.clouds_missed(),
            last_stamp: self.last_stamp.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SinkMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub clouds_written: u64,
    pub points_written: u64,
    pub write_failures: u64,
    pub clouds_missed: u64,
    /// Stamp of the last cloud written, 0 before the first
    pub last_stamp: i64,
}
