//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Velodyne Post - point cloud post-processing for Velodyne packet streams
#[derive(Parser, Debug)]
#[command(
    name = "velodyne-post",
    author,
    version,
    about = "Velodyne packet-to-point-cloud post-processing node",
    long_about = "Subscribes to raw or snappy-compressed Velodyne packets while someone \n\
                  listens for point clouds, accumulates one revolution per cloud, \n\
                  converts it with the device calibration and publishes the result."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "VELODYNE_POST_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "VELODYNE_POST_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the post-processing node
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display resolved node settings
    Info(InfoArgs),
}

/// Parameters shared by every command that reads a configuration
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "VELODYNE_POST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override sensor.device_name
    #[arg(long, env = "VELODYNE_POST_DEVICE_NAME")]
    pub device_name: Option<String>,

    /// Override sensor.calibration_file
    #[arg(long, env = "VELODYNE_POST_CALIBRATION_FILE")]
    pub calibration_file: Option<PathBuf>,

    /// Override transport.num_data_packets
    #[arg(long)]
    pub num_data_packets: Option<usize>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Feed the node from a synthetic packet source
    #[arg(long)]
    pub mock: bool,

    /// Packet rate of the synthetic source (Hz)
    #[arg(long, default_value = "1740", requires = "mock", value_parser = parse_rate)]
    pub mock_rate: f64,

    /// Attach a consumer that logs every cloud (creates demand)
    #[arg(long)]
    pub log_clouds: bool,

    /// Stop after this many published clouds (0 = unlimited)
    #[arg(long, default_value = "0", env = "VELODYNE_POST_MAX_CLOUDS")]
    pub max_clouds: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "VELODYNE_POST_TIMEOUT")]
    pub timeout: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9100", env = "VELODYNE_POST_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

fn parse_rate(s: &str) -> Result<f64, String> {
    let rate: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("rate must be a positive finite number, got {s}"))
    }
}
