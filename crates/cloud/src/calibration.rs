//! Per-laser calibration model
//!
//! Loaded once at startup from a TOML or JSON file holding one `[[lasers]]`
//! entry per laser. A failed load is logged and the node continues with
//! uncorrected geometry.

use std::path::Path;

use contracts::DeviceModel;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::CalibrationError;

/// Correction parameters of one laser
///
/// Angles in degrees, offsets and distances in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaserCorrection {
    #[serde(default)]
    pub rot_correction: f64,
    #[serde(default)]
    pub vert_correction: f64,
    #[serde(default)]
    pub dist_correction: f64,
    #[serde(default)]
    pub vert_offset_correction: f64,
    #[serde(default)]
    pub horiz_offset_correction: f64,
    #[serde(default)]
    pub focal_distance: f64,
    #[serde(default)]
    pub focal_slope: f64,
    #[serde(default)]
    pub min_intensity: u8,
    #[serde(default = "default_max_intensity")]
    pub max_intensity: u8,
}

fn default_max_intensity() -> u8 {
    u8::MAX
}

impl LaserCorrection {
    /// No correction at all
    pub const IDENTITY: Self = Self {
        rot_correction: 0.0,
        vert_correction: 0.0,
        dist_correction: 0.0,
        vert_offset_correction: 0.0,
        horiz_offset_correction: 0.0,
        focal_distance: 0.0,
        focal_slope: 0.0,
        min_intensity: 0,
        max_intensity: u8::MAX,
    };
}

impl Default for LaserCorrection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Calibration table, indexed by laser number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationModel {
    pub lasers: Vec<LaserCorrection>,
}

impl CalibrationModel {
    /// Identity calibration for `num_lasers` lasers
    pub fn identity(num_lasers: usize) -> Self {
        Self {
            lasers: vec![LaserCorrection::IDENTITY; num_lasers],
        }
    }

    /// Correction for `laser`, if the table covers it
    #[inline]
    pub fn laser(&self, laser: usize) -> Option<&LaserCorrection> {
        self.lasers.get(laser)
    }

    #[inline]
    pub fn num_lasers(&self) -> usize {
        self.lasers.len()
    }

    /// Load from a `.toml` or `.json` file
    ///
    /// # Errors
    /// - Read failure
    /// - Unsupported extension
    /// - Malformed content
    /// - Table shape not 32 or 64 lasers, or inverted intensity bounds
    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        let content = std::fs::read_to_string(path).map_err(|source| CalibrationError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let model: Self = match ext.as_deref() {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| CalibrationError::parse(path, e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| CalibrationError::parse(path, e.to_string()))?,
            _ => {
                return Err(CalibrationError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        model.check_shape()?;
        Ok(model)
    }

    /// Load and check the table against the device's laser count
    pub fn load_for_device(
        path: &Path,
        device: Option<DeviceModel>,
    ) -> Result<Self, CalibrationError> {
        let model = Self::load(path)?;
        if let Some(device) = device {
            if model.num_lasers() != device.num_lasers() {
                return Err(CalibrationError::shape(format!(
                    "{} expects {} lasers, calibration has {}",
                    device.name(),
                    device.num_lasers(),
                    model.num_lasers()
                )));
            }
        }
        Ok(model)
    }

    fn check_shape(&self) -> Result<(), CalibrationError> {
        if !matches!(self.lasers.len(), 32 | 64) {
            return Err(CalibrationError::shape(format!(
                "expected 32 or 64 lasers, got {}",
                self.lasers.len()
            )));
        }

        for (idx, laser) in self.lasers.iter().enumerate() {
            if laser.min_intensity > laser.max_intensity {
                return Err(CalibrationError::shape(format!(
                    "laser {idx}: min_intensity ({}) > max_intensity ({})",
                    laser.min_intensity, laser.max_intensity
                )));
            }
        }
        Ok(())
    }
}

/// Load the calibration, logging instead of failing
///
/// Returns `None` when no path is configured or the file cannot be used; the
/// converter then applies identity corrections.
#[instrument(name = "calibration_load", skip(path), fields(path = ?path))]
pub fn load_or_warn(path: Option<&Path>, device: Option<DeviceModel>) -> Option<CalibrationModel> {
    let Some(path) = path else {
        warn!("no calibration file configured, using uncorrected geometry");
        return None;
    };

    match CalibrationModel::load_for_device(path, device) {
        Ok(model) => {
            info!(
                path = %path.display(),
                lasers = model.num_lasers(),
                "calibration loaded"
            );
            Some(model)
        }
        Err(e) => {
            warn!(error = %e, "calibration unavailable, using uncorrected geometry");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn lasers_toml(count: usize) -> String {
        let mut out = String::new();
        for i in 0..count {
            out.push_str(&format!(
                "[[lasers]]\nrot_correction = {:.1}\nvert_correction = -7.5\ndist_correction = 1.2\n\n",
                i as f64 * 0.1
            ));
        }
        out
    }

    #[test]
    fn test_load_toml() {
        let file = write_temp(".toml", &lasers_toml(32));
        let model = CalibrationModel::load(file.path()).unwrap();

        assert_eq!(model.num_lasers(), 32);
        let laser = model.laser(3).unwrap();
        assert!((laser.rot_correction - 0.3).abs() < 1e-9);
        assert_eq!(laser.max_intensity, 255);
    }

    #[test]
    fn test_load_json() {
        let lasers = vec![LaserCorrection::IDENTITY; 64];
        let json = serde_json::to_string(&CalibrationModel { lasers }).unwrap();
        let file = write_temp(".json", &json);

        let model = CalibrationModel::load(file.path()).unwrap();
        assert_eq!(model.num_lasers(), 64);
    }

    #[test]
    fn test_malformed_content() {
        let file = write_temp(".toml", "[[lasers]\nbroken");
        let err = CalibrationModel::load(file.path()).unwrap_err();
        assert!(matches!(err, CalibrationError::Parse { .. }));
    }

    #[test]
    fn test_wrong_laser_count() {
        let file = write_temp(".toml", &lasers_toml(16));
        let err = CalibrationModel::load(file.path()).unwrap_err();
        assert!(matches!(err, CalibrationError::Shape { .. }));
    }

    #[test]
    fn test_device_mismatch() {
        let file = write_temp(".toml", &lasers_toml(32));
        let err =
            CalibrationModel::load_for_device(file.path(), Some(DeviceModel::Hdl64eS2)).unwrap_err();
        assert!(err.to_string().contains("expects 64 lasers"));
    }

    #[test]
    fn test_load_or_warn_is_non_fatal() {
        assert!(load_or_warn(None, Some(DeviceModel::Hdl32e)).is_none());
        assert!(load_or_warn(Some(Path::new("/nonexistent/calib.toml")), None).is_none());

        let file = write_temp(".toml", &lasers_toml(32));
        assert!(load_or_warn(Some(file.path()), Some(DeviceModel::Hdl32e)).is_some());
    }
}
