//! Shipped configuration files

use std::path::PathBuf;

use cloud::{load_or_warn, CalibrationModel};
use config_loader::{resolve, ConfigLoader};
use contracts::{DeviceModel, InputMode, TransportHints};

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

#[test]
fn test_sample_config_resolves_cleanly() {
    let config = ConfigLoader::load_from_path(&repo_path("conf/velodyne_post.toml")).unwrap();
    let resolution = resolve(&config);
    assert!(resolution.is_clean(), "issues: {:?}", resolution.issues);

    let settings = resolution.settings;
    assert_eq!(settings.device, Some(DeviceModel::Hdl32e));
    assert_eq!(settings.num_data_packets, Some(174));
    assert_eq!(settings.input, InputMode::BinarySnappy);
    assert_eq!(settings.hints, TransportHints::PreferUnreliable);
    assert_eq!(settings.point_cloud_topic, "point_cloud");
}

#[test]
fn test_sample_calibration_matches_device() {
    let path = repo_path("conf/calib-HDL-32E.toml");
    let model = CalibrationModel::load_for_device(&path, Some(DeviceModel::Hdl32e)).unwrap();
    assert_eq!(model.num_lasers(), 32);

    let angles: Vec<f64> = model.lasers.iter().map(|l| l.vert_correction).collect();
    let lowest = angles.iter().cloned().fold(f64::INFINITY, f64::min);
    let highest = angles.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!((lowest + 30.67).abs() < 1e-9);
    assert!((highest - 10.67).abs() < 1e-9);

    // wrong device is reported, not fatal
    assert!(load_or_warn(Some(&path), Some(DeviceModel::Hdl64eS2)).is_none());
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = ConfigLoader::load_from_path(&repo_path("conf/velodyne_post.toml")).unwrap();
    let text = ConfigLoader::to_toml(&config).unwrap();
    let reparsed = ConfigLoader::load_from_str(&text, config_loader::ConfigFormat::Toml).unwrap();
    assert_eq!(resolve(&reparsed).settings, resolve(&config).settings);
}
