//! 点云管线指标收集模块
//!
//! 通过 `metrics` facade 上报 Prometheus 指标，并提供内存聚合器用于退出时的摘要。

use std::fmt;

use contracts::PointCloudMsg;
use metrics::{counter, gauge, histogram};

/// 记录成功解码的数据包
pub fn record_packet_decoded(input: &'static str) {
    counter!("velodyne_post_packets_decoded_total", "input" => input).increment(1);
}

/// 记录解码失败（数据包已丢弃）
pub fn record_decode_error(input: &'static str, kind: &'static str) {
    counter!(
        "velodyne_post_decode_errors_total",
        "input" => input,
        "kind" => kind
    )
    .increment(1);
}

/// 记录完整批次（一圈）
pub fn record_batch_completed(packets: usize) {
    counter!("velodyne_post_batches_completed_total").increment(1);
    gauge!("velodyne_post_batch_packets").set(packets as f64);
}

/// 记录已发布点云
pub fn record_cloud_published(points: usize) {
    counter!("velodyne_post_clouds_published_total").increment(1);
    histogram!("velodyne_post_cloud_points").record(points as f64);
}

/// 记录因无订阅者而跳过的点云
pub fn record_cloud_suppressed() {
    counter!("velodyne_post_clouds_suppressed_total").increment(1);
}

/// 记录上游订阅状态
pub fn record_subscription_active(active: bool) {
    gauge!("velodyne_post_subscription_active").set(if active { 1.0 } else { 0.0 });
}

/// 记录下游订阅者数量
pub fn record_consumers(count: usize) {
    gauge!("velodyne_post_consumers").set(count as f64);
}

/// 点云指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct CloudMetricsAggregator {
    /// 已发布点云数
    pub clouds_published: u64,

    /// 被跳过的批次数
    pub clouds_suppressed: u64,

    /// 每帧点数统计
    pub point_stats: RunningStats,

    /// 相邻点云时间戳间隔 (毫秒)
    pub period_stats: RunningStats,

    last_stamp: Option<i64>,
}

impl CloudMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, cloud: &PointCloudMsg) {
        self.clouds_published += 1;
        self.point_stats.push(cloud.len() as f64);

        let stamp = cloud.header.stamp;
        if let Some(last) = self.last_stamp.replace(stamp) {
            self.period_stats.push((stamp - last) as f64 / 1e6);
        }
    }

    pub fn record_suppressed(&mut self) {
        self.clouds_suppressed += 1;
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let batches = self.clouds_published + self.clouds_suppressed;
        MetricsSummary {
            clouds_published: self.clouds_published,
            clouds_suppressed: self.clouds_suppressed,
            suppressed_rate: if batches > 0 {
                self.clouds_suppressed as f64 / batches as f64 * 100.0
            } else {
                0.0
            },
            points: StatsSummary::from(&self.point_stats),
            period_ms: StatsSummary::from(&self.period_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub clouds_published: u64,
    pub clouds_suppressed: u64,
    pub suppressed_rate: f64,
    pub points: StatsSummary,
    pub period_ms: StatsSummary,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Point Cloud Metrics Summary ===")?;
        writeln!(f, "Clouds published: {}", self.clouds_published)?;
        writeln!(
            f,
            "Clouds suppressed: {} ({:.2}%)",
            self.clouds_suppressed, self.suppressed_rate
        )?;
        writeln!(f, "Points per cloud: {}", self.points)?;
        writeln!(f, "Cloud period (ms): {}", self.period_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Point32;

    fn cloud(stamp: i64, points: usize) -> PointCloudMsg {
        let mut msg = PointCloudMsg::default();
        msg.header.stamp = stamp;
        msg.points = vec![Point32::default(); points];
        msg
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = CloudMetricsAggregator::new();
        aggregator.update(&cloud(0, 100));
        aggregator.update(&cloud(100_000_000, 300));
        aggregator.record_suppressed();

        let summary = aggregator.summary();
        assert_eq!(summary.clouds_published, 2);
        assert_eq!(summary.clouds_suppressed, 1);
        assert!((summary.points.mean - 200.0).abs() < 1e-10);
        assert_eq!(summary.period_ms.count, 1);
        assert!((summary.period_ms.mean - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = CloudMetricsAggregator::new();
        aggregator.update(&cloud(0, 10));
        aggregator.record_suppressed();

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Clouds published: 1"));
        assert!(output.contains("50.00%"));
    }

    #[test]
    fn test_recorders_without_exporter() {
        // no recorder installed: calls are no-ops
        record_packet_decoded("binary_snappy");
        record_decode_error("binary_snappy", "decompress");
        record_batch_completed(174);
        record_cloud_published(1000);
        record_cloud_suppressed();
        record_subscription_active(true);
        record_consumers(2);
    }
}
