//! Single-return projection
//!
//! Maps one raw return to a Cartesian point using the laser's calibration.
//! The calibrated range reported alongside the point is what the converter
//! filters on.

use contracts::RawLaserReturn;

use crate::calibration::{CalibrationModel, LaserCorrection};
use crate::point::Point;

/// Metres per raw distance tick
pub const DISTANCE_RESOLUTION: f64 = 0.002;

/// Projected return
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedReturn {
    /// Corrected distance (m)
    pub range: f64,
    pub point: Point,
}

/// Calibration-aware projection of one laser return
pub trait ReturnProjector {
    /// Project `ret` fired by `laser` at `rotational_info` (hundredths of a degree)
    ///
    /// Returns `None` when the laser saw nothing.
    fn project(
        &self,
        laser: usize,
        rotational_info: u16,
        ret: RawLaserReturn,
        calibration: Option<&CalibrationModel>,
    ) -> Option<CalibratedReturn>;
}

/// HDL-32E / HDL-64E geometry
///
/// x points forward, y left, z up. Lasers the calibration does not cover use
/// [`LaserCorrection::IDENTITY`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VelodyneProjector;

impl ReturnProjector for VelodyneProjector {
    #[inline]
    fn project(
        &self,
        laser: usize,
        rotational_info: u16,
        ret: RawLaserReturn,
        calibration: Option<&CalibrationModel>,
    ) -> Option<CalibratedReturn> {
        if ret.distance == 0 {
            return None;
        }

        let corr = calibration
            .and_then(|c| c.laser(laser))
            .unwrap_or(&LaserCorrection::IDENTITY);

        let range = ret.distance as f64 * DISTANCE_RESOLUTION + corr.dist_correction;

        let azimuth = (rotational_info as f64 / 100.0 - corr.rot_correction).to_radians();
        let (sin_rot, cos_rot) = azimuth.sin_cos();
        let (sin_vert, cos_vert) = corr.vert_correction.to_radians().sin_cos();

        let xy_distance = range * cos_vert - corr.vert_offset_correction * sin_vert;
        let x = xy_distance * cos_rot + corr.horiz_offset_correction * sin_rot;
        let y = -(xy_distance * sin_rot - corr.horiz_offset_correction * cos_rot);
        let z = range * sin_vert + corr.vert_offset_correction * cos_vert;

        Some(CalibratedReturn {
            range,
            point: Point {
                x: x as f32,
                y: y as f32,
                z: z as f32,
                intensity: corrected_intensity(ret, corr),
            },
        })
    }
}

/// Focal-distance intensity correction, clamped to the laser's bounds
fn corrected_intensity(ret: RawLaserReturn, corr: &LaserCorrection) -> f32 {
    let mut intensity = ret.intensity as f64;

    if corr.focal_slope != 0.0 {
        let focal_offset = 256.0 * (1.0 - corr.focal_distance / 131.0).powi(2);
        let scaled = 256.0 * (1.0 - ret.distance as f64 / 65535.0).powi(2);
        intensity += corr.focal_slope * (focal_offset - scaled).abs();
    }

    intensity.clamp(corr.min_intensity as f64, corr.max_intensity as f64) as f32
}
