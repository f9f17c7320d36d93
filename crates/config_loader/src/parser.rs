//! Configuration parsing
//!
//! TOML (primary) and JSON are supported.

use contracts::{ContractError, PostConfig};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<PostConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<PostConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration in the given format
pub fn parse(content: &str, format: ConfigFormat) -> Result<PostConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_sections() {
        let content = r#"
[sensor]
min_distance = 1.5
device_name = "Velodyne HDL-64E S2"

[transport]
use_binary_snappy = false
num_data_packets = 200
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.sensor.min_distance, 1.5);
        assert_eq!(config.sensor.max_distance, 120.0);
        assert_eq!(config.sensor.device_name, "Velodyne HDL-64E S2");
        assert!(!config.transport.use_binary_snappy);
        assert_eq!(config.transport.num_data_packets, Some(200));
        assert_eq!(config.transport.queue_depth, 100);
    }

    #[test]
    fn test_parse_empty_toml_uses_defaults() {
        let config = parse_toml("").unwrap();
        assert_eq!(config.sensor.device_name, "Velodyne HDL-32E");
        assert_eq!(config.transport.point_cloud_topic, "point_cloud");
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "sensor": { "max_distance": 80.0, "calibration_file": "calib.toml" },
            "transport": { "transport_type": "tcp", "subscription_updater_rate": 2.0 }
        }"#;
        let config = parse_json(content).unwrap();
        assert_eq!(config.sensor.max_distance, 80.0);
        assert_eq!(
            config.sensor.calibration_file.as_deref(),
            Some(std::path::Path::new("calib.toml"))
        );
        assert_eq!(config.transport.transport_type, "tcp");
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let result = parse_toml("invalid toml [[[");
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
