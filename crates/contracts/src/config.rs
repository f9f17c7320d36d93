//! PostConfig - Config Loader output
//!
//! Sensor model, distance thresholds, topic routing and subscription tuning.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Complete node configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostConfig {
    /// Sensor settings
    #[serde(default)]
    pub sensor: SensorSection,

    /// Topic routing and subscription settings
    #[serde(default)]
    pub transport: TransportSection,
}

/// Sensor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSection {
    /// Returns closer than this are dropped (m)
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// Returns farther than this are dropped (m)
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Device model name, see [`DeviceModel`]
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Calibration file, defaults per device
    #[serde(default)]
    pub calibration_file: Option<PathBuf>,
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            device_name: default_device_name(),
            calibration_file: None,
        }
    }
}

fn default_min_distance() -> f64 {
    0.9
}

fn default_max_distance() -> f64 {
    120.0
}

fn default_device_name() -> String {
    DeviceModel::Hdl32e.name().to_string()
}

/// Topic routing and subscription settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportSection {
    /// Compressed packet input topic
    #[serde(default = "default_binary_snappy_topic")]
    pub binary_snappy_topic: String,

    /// Structured packet input topic
    #[serde(default = "default_data_packet_topic")]
    pub data_packet_topic: String,

    /// Point cloud output topic
    #[serde(default = "default_point_cloud_topic")]
    pub point_cloud_topic: String,

    /// Subscribe to the compressed input instead of the structured one
    #[serde(default = "default_use_binary_snappy")]
    pub use_binary_snappy: bool,

    /// Queue depth for the input subscription and the output channel
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    /// "udp" or "tcp"
    #[serde(default = "default_transport_type")]
    pub transport_type: String,

    /// Packets per published cloud, defaults per device
    #[serde(default)]
    pub num_data_packets: Option<usize>,

    /// Demand polling rate (Hz)
    #[serde(default = "default_subscription_updater_rate")]
    pub subscription_updater_rate: f64,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            binary_snappy_topic: default_binary_snappy_topic(),
            data_packet_topic: default_data_packet_topic(),
            point_cloud_topic: default_point_cloud_topic(),
            use_binary_snappy: default_use_binary_snappy(),
            queue_depth: default_queue_depth(),
            transport_type: default_transport_type(),
            num_data_packets: None,
            subscription_updater_rate: default_subscription_updater_rate(),
        }
    }
}

fn default_binary_snappy_topic() -> String {
    "/velodyne/binary_snappy".to_string()
}

fn default_data_packet_topic() -> String {
    "/velodyne/data_packet".to_string()
}

fn default_point_cloud_topic() -> String {
    "point_cloud".to_string()
}

fn default_use_binary_snappy() -> bool {
    true
}

fn default_queue_depth() -> usize {
    100
}

fn default_transport_type() -> String {
    "udp".to_string()
}

fn default_subscription_updater_rate() -> f64 {
    1.0
}

/// Supported sensor models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceModel {
    /// 64 lasers, two blocks per firing
    Hdl64eS2,
    /// 32 lasers
    Hdl32e,
}

impl DeviceModel {
    /// Configuration name of the model
    pub fn name(self) -> &'static str {
        match self {
            Self::Hdl64eS2 => "Velodyne HDL-64E S2",
            Self::Hdl32e => "Velodyne HDL-32E",
        }
    }

    /// Calibration file used when none is configured
    pub fn default_calibration_file(self) -> PathBuf {
        match self {
            Self::Hdl64eS2 => PathBuf::from("conf/calib-HDL-64E.toml"),
            Self::Hdl32e => PathBuf::from("conf/calib-HDL-32E.toml"),
        }
    }

    /// Packets making up one revolution
    pub fn default_num_data_packets(self) -> usize {
        match self {
            Self::Hdl64eS2 => 348,
            Self::Hdl32e => 174,
        }
    }

    /// Number of lasers the calibration must describe
    pub fn num_lasers(self) -> usize {
        match self {
            Self::Hdl64eS2 => 64,
            Self::Hdl32e => 32,
        }
    }
}

impl FromStr for DeviceModel {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Velodyne HDL-64E S2" => Ok(Self::Hdl64eS2),
            "Velodyne HDL-32E" => Ok(Self::Hdl32e),
            other => Err(ConfigIssue::UnknownDevice {
                name: other.to_string(),
            }),
        }
    }
}

/// Transport preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Udp,
    Tcp,
}

impl FromStr for TransportType {
    type Err = ConfigIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "udp" => Ok(Self::Udp),
            "tcp" => Ok(Self::Tcp),
            other => Err(ConfigIssue::UnknownTransport {
                name: other.to_string(),
            }),
        }
    }
}

/// Hints handed to the transport when subscribing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportHints {
    /// Transport default
    #[default]
    Unspecified,
    /// Unreliable first, reliable as fallback
    PreferUnreliable,
    /// Reliable first, unreliable as fallback
    PreferReliable,
}

impl From<TransportType> for TransportHints {
    fn from(kind: TransportType) -> Self {
        match kind {
            TransportType::Udp => Self::PreferUnreliable,
            TransportType::Tcp => Self::PreferReliable,
        }
    }
}

/// Which decoder input is subscribed when there is demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    BinarySnappy,
    DataPacket,
}

impl InputMode {
    pub fn from_use_binary_snappy(use_binary_snappy: bool) -> Self {
        if use_binary_snappy {
            Self::BinarySnappy
        } else {
            Self::DataPacket
        }
    }
}

/// Typed node settings produced by resolving a [`PostConfig`]
///
/// `None` fields are parameters that could not be resolved; the node keeps
/// running without them.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSettings {
    pub min_distance: f64,
    pub max_distance: f64,
    pub device: Option<DeviceModel>,
    pub calibration_file: Option<PathBuf>,
    pub num_data_packets: Option<usize>,
    pub input: InputMode,
    pub binary_snappy_topic: String,
    pub data_packet_topic: String,
    pub point_cloud_topic: String,
    pub queue_depth: usize,
    pub hints: TransportHints,
    pub updater_period: Duration,
}

impl NodeSettings {
    /// Topic of the configured decoder input
    pub fn input_topic(&self) -> &str {
        match self.input {
            InputMode::BinarySnappy => &self.binary_snappy_topic,
            InputMode::DataPacket => &self.data_packet_topic,
        }
    }
}

/// Non-fatal configuration problem
///
/// Reported at startup; the affected parameter stays unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("unknown device: {name}")]
    UnknownDevice { name: String },

    #[error("unknown transport type: {name}")]
    UnknownTransport { name: String },
}
