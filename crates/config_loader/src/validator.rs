//! Configuration validation
//!
//! Rules:
//! - 0 <= min_distance <= max_distance
//! - queue_depth > 0
//! - subscription_updater_rate finite and > 0
//! - num_data_packets > 0 when given
//! - topic names not empty
//!
//! Device and transport names are not checked here; unknown values are
//! resolved non-fatally by [`crate::resolve`].

use std::time::Duration;

use contracts::{ContractError, PostConfig};

/// Validate a PostConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PostConfig) -> Result<(), ContractError> {
    validate_distances(config)?;
    validate_queue_depth(config)?;
    validate_updater_rate(config)?;
    validate_num_data_packets(config)?;
    validate_topics(config)?;
    Ok(())
}

fn validate_distances(config: &PostConfig) -> Result<(), ContractError> {
    let sensor = &config.sensor;

    if sensor.min_distance.is_nan() || sensor.min_distance < 0.0 {
        return Err(ContractError::config_validation(
            "sensor.min_distance",
            format!("min_distance must be >= 0, got {}", sensor.min_distance),
        ));
    }

    if sensor.min_distance > sensor.max_distance {
        return Err(ContractError::config_validation(
            "sensor.min_distance / sensor.max_distance",
            format!(
                "min_distance ({}) must be <= max_distance ({})",
                sensor.min_distance, sensor.max_distance
            ),
        ));
    }

    Ok(())
}

fn validate_queue_depth(config: &PostConfig) -> Result<(), ContractError> {
    if config.transport.queue_depth == 0 {
        return Err(ContractError::config_validation(
            "transport.queue_depth",
            "queue_depth must be > 0",
        ));
    }
    Ok(())
}

fn validate_updater_rate(config: &PostConfig) -> Result<(), ContractError> {
    let rate = config.transport.subscription_updater_rate;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(ContractError::config_validation(
            "transport.subscription_updater_rate",
            format!("subscription_updater_rate must be > 0, got {rate}"),
        ));
    }
    match Duration::try_from_secs_f64(1.0 / rate) {
        Ok(period) if !period.is_zero() => Ok(()),
        _ => Err(ContractError::config_validation(
            "transport.subscription_updater_rate",
            format!("subscription_updater_rate {rate} does not give a usable period"),
        )),
    }
}

fn validate_num_data_packets(config: &PostConfig) -> Result<(), ContractError> {
    if config.transport.num_data_packets == Some(0) {
        return Err(ContractError::config_validation(
            "transport.num_data_packets",
            "num_data_packets must be > 0",
        ));
    }
    Ok(())
}

fn validate_topics(config: &PostConfig) -> Result<(), ContractError> {
    let transport = &config.transport;
    let topics = [
        ("transport.binary_snappy_topic", &transport.binary_snappy_topic),
        ("transport.data_packet_topic", &transport.data_packet_topic),
        ("transport.point_cloud_topic", &transport.point_cloud_topic),
    ];

    for (field, topic) in topics {
        if topic.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "topic name cannot be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        assert!(validate(&PostConfig::default()).is_ok());
    }

    #[test]
    fn test_inverted_distances() {
        let mut config = PostConfig::default();
        config.sensor.min_distance = 50.0;
        config.sensor.max_distance = 10.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("must be <= max_distance"), "got: {err}");
    }

    #[test]
    fn test_negative_min_distance() {
        let mut config = PostConfig::default();
        config.sensor.min_distance = -1.0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("min_distance must be >= 0"), "got: {err}");
    }

    #[test]
    fn test_zero_queue_depth() {
        let mut config = PostConfig::default();
        config.transport.queue_depth = 0;
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("queue_depth"), "got: {err}");
    }

    #[test]
    fn test_invalid_updater_rate() {
        let mut config = PostConfig::default();
        config.transport.subscription_updater_rate = 0.0;
        assert!(validate(&config).is_err());

        config.transport.subscription_updater_rate = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_updater_rate_outside_duration_range() {
        let mut config = PostConfig::default();
        config.transport.subscription_updater_rate = 1e-300;
        assert!(validate(&config).is_err());

        config.transport.subscription_updater_rate = 1e300;
        assert!(validate(&config).is_err());

        config.transport.subscription_updater_rate = 0.01;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_packets_per_revolution() {
        let mut config = PostConfig::default();
        config.transport.num_data_packets = Some(0);
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("num_data_packets"), "got: {err}");
    }

    #[test]
    fn test_empty_topic() {
        let mut config = PostConfig::default();
        config.transport.point_cloud_topic = " ".into();
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_unknown_device_is_not_a_validation_error() {
        let mut config = PostConfig::default();
        config.sensor.device_name = "Velodyne VLP-16".into();
        assert!(validate(&config).is_ok());
    }
}
