//! Batch to point cloud conversion

use contracts::{DataPacket, CHUNKS_PER_PACKET, LASERS_PER_CHUNK};
use tracing::instrument;

use crate::calibration::CalibrationModel;
use crate::point::PointCloud;
use crate::projector::{ReturnProjector, VelodyneProjector};

/// Converts accumulated packets into a range-filtered cloud
///
/// Pure with respect to its inputs: the same batch, calibration and
/// thresholds always yield the same point sequence.
#[derive(Debug, Clone, Default)]
pub struct CloudConverter<P = VelodyneProjector> {
    projector: P,
}

impl<P: ReturnProjector> CloudConverter<P> {
    pub fn new(projector: P) -> Self {
        Self { projector }
    }

    /// Convert `batch`, keeping returns with `min_distance <= range <= max_distance`
    ///
    /// Output order is packet, then chunk, then laser.
    #[instrument(
        level = "trace",
        name = "cloud_convert",
        skip(self, batch, calibration),
        fields(packets = batch.len(), calibrated = calibration.is_some())
    )]
    pub fn convert(
        &self,
        batch: &[DataPacket],
        calibration: Option<&CalibrationModel>,
        min_distance: f64,
        max_distance: f64,
    ) -> PointCloud {
        let mut cloud = PointCloud::with_capacity(batch.len() * CHUNKS_PER_PACKET * LASERS_PER_CHUNK);

        for packet in batch {
            for (chunk, j, ret) in packet.returns() {
                let laser = chunk.laser_offset() + j;
                let Some(projected) =
                    self.projector
                        .project(laser, chunk.rotational_info, *ret, calibration)
                else {
                    continue;
                };

                if projected.range < min_distance || projected.range > max_distance {
                    continue;
                }
                cloud.push(projected.point);
            }
        }

        cloud
    }
}
