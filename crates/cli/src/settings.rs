//! Configuration loading shared by all commands.

use config_loader::{ConfigLoader, PostConfig, Resolution};
use tracing::info;

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};

/// Load the configuration file (or defaults) and apply CLI overrides
pub fn load_config(args: &ConfigArgs) -> Result<PostConfig> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::config_not_found(path.display().to_string()));
            }
            info!(config = %path.display(), "Loading configuration");
            ConfigLoader::load_from_path(path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            PostConfig::default()
        }
    };

    if let Some(ref name) = args.device_name {
        info!(device_name = %name, "Overriding device name from CLI");
        config.sensor.device_name = name.clone();
    }
    if let Some(ref path) = args.calibration_file {
        info!(calibration_file = %path.display(), "Overriding calibration file from CLI");
        config.sensor.calibration_file = Some(path.clone());
    }
    if let Some(n) = args.num_data_packets {
        info!(num_data_packets = n, "Overriding packets per cloud from CLI");
        config.transport.num_data_packets = Some(n);
    }

    Ok(config)
}

/// Load, override and resolve in one step
pub fn load_resolution(args: &ConfigArgs) -> Result<(PostConfig, Resolution)> {
    let config = load_config(args)?;
    let resolution = config_loader::resolve(&config);
    Ok((config, resolution))
}
