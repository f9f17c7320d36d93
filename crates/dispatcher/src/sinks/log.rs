//! LogSink - logs a cloud summary via tracing

use contracts::{CloudSink, ContractError, PointCloudMsg};
use tracing::{info, instrument};

/// Sink that logs one line per cloud
pub struct LogSink {
    name: String,
    clouds: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clouds: 0,
        }
    }

    fn log_cloud_summary(&self, cloud: &PointCloudMsg) {
        let channels: Vec<&str> = cloud.channels.iter().map(|c| c.name.as_str()).collect();

        info!(
            sink = %self.name,
            seq = self.clouds,
            stamp = cloud.header.stamp,
            frame_id = %cloud.header.frame_id,
            points = cloud.len(),
            channels = ?channels,
            "PointCloud received"
        );
    }
}

impl CloudSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, cloud),
        fields(sink = %self.name, stamp = cloud.header.stamp)
    )]
    async fn write(&mut self, cloud: &PointCloudMsg) -> Result<(), ContractError> {
        self.log_cloud_summary(cloud);
        self.clouds += 1;
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, clouds = self.clouds, "LogSink closed");
        Ok(())
    }
}
