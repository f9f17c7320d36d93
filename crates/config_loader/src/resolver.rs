//! Device and transport resolution
//!
//! Turns a validated [`PostConfig`] into [`NodeSettings`]. Unknown device or
//! transport names are reported as [`ConfigIssue`]s and leave the dependent
//! parameters unresolved instead of failing startup.

use std::time::Duration;

use contracts::{
    ConfigIssue, DeviceModel, InputMode, NodeSettings, PostConfig, TransportHints, TransportType,
};
use tracing::{debug, error, warn};

/// Resolved settings plus every issue found along the way
#[derive(Debug, Clone)]
pub struct Resolution {
    pub settings: NodeSettings,
    pub issues: Vec<ConfigIssue>,
}

impl Resolution {
    /// True when every parameter resolved
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Resolve a configuration, logging each issue at error level
pub fn resolve(config: &PostConfig) -> Resolution {
    let mut issues = Vec::new();
    let sensor = &config.sensor;
    let transport = &config.transport;

    let device = match sensor.device_name.parse::<DeviceModel>() {
        Ok(device) => Some(device),
        Err(issue) => {
            error!(device_name = %sensor.device_name, "{issue}");
            issues.push(issue);
            None
        }
    };

    let calibration_file = sensor
        .calibration_file
        .clone()
        .or_else(|| device.map(DeviceModel::default_calibration_file));

    let num_data_packets = transport
        .num_data_packets
        .or_else(|| device.map(DeviceModel::default_num_data_packets));

    let hints = match transport.transport_type.parse::<TransportType>() {
        Ok(kind) => TransportHints::from(kind),
        Err(issue) => {
            error!(transport_type = %transport.transport_type, "{issue}");
            issues.push(issue);
            TransportHints::default()
        }
    };

    let settings = NodeSettings {
        min_distance: sensor.min_distance,
        max_distance: sensor.max_distance,
        device,
        calibration_file,
        num_data_packets,
        input: InputMode::from_use_binary_snappy(transport.use_binary_snappy),
        binary_snappy_topic: transport.binary_snappy_topic.clone(),
        data_packet_topic: transport.data_packet_topic.clone(),
        point_cloud_topic: transport.point_cloud_topic.clone(),
        queue_depth: transport.queue_depth,
        hints,
        updater_period: updater_period(transport.subscription_updater_rate),
    };

    debug!(?settings, issues = issues.len(), "configuration resolved");

    Resolution { settings, issues }
}

/// Period for the subscription updater; unusable rates fall back to one second
fn updater_period(rate: f64) -> Duration {
    match Duration::try_from_secs_f64(1.0 / rate) {
        Ok(period) if !period.is_zero() => period,
        _ => {
            warn!(rate, "unusable subscription_updater_rate, using 1 Hz");
            Duration::from_secs(1)
        }
    }
}
