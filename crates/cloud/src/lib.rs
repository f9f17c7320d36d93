//! # Cloud
//!
//! Point cloud conversion for accumulated sensor revolutions.
//!
//! Responsibilities:
//! - Load the per-laser calibration model (non-fatal on failure)
//! - Project single laser returns into Cartesian points
//! - Convert a batch of packets into a range-filtered point cloud
//!
//! ## Example
//!
//! ```ignore
//! use cloud::{load_or_warn, CloudConverter};
//!
//! let calibration = load_or_warn(settings.calibration_file.as_deref(), settings.device);
//! let converter = CloudConverter::default();
//! let cloud = converter.convert(&batch, calibration.as_ref(), 0.9, 120.0);
//! ```

mod calibration;
mod converter;
mod error;
mod point;
mod projector;

pub use calibration::{load_or_warn, CalibrationModel, LaserCorrection};
pub use converter::CloudConverter;
pub use error::CalibrationError;
pub use point::{Point, PointCloud};
pub use projector::{CalibratedReturn, ReturnProjector, VelodyneProjector, DISTANCE_RESOLUTION};
