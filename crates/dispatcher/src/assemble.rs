//! Outbound message assembly

use cloud::PointCloud;
use contracts::{ChannelFloat32, DataPacket, FrameId, Header, Point32, PointCloudMsg, INTENSITY_CHANNEL};

/// Timestamp representing a whole batch: halfway between first and last packet
///
/// An empty batch yields 0.
pub fn midpoint_stamp(batch: &[DataPacket]) -> i64 {
    match (batch.first(), batch.last()) {
        (Some(first), Some(last)) => {
            let half = ((last.timestamp - first.timestamp) as f64 * 0.5).round() as i64;
            first.timestamp + half
        }
        _ => 0,
    }
}

/// Build the outbound cloud for `batch`
///
/// Geometry and the intensity channel are index-aligned.
pub fn assemble_message(batch: &[DataPacket], cloud: &PointCloud, frame_id: FrameId) -> PointCloudMsg {
    let mut points = Vec::with_capacity(cloud.len());
    let mut intensity = Vec::with_capacity(cloud.len());
    for p in &cloud.points {
        points.push(Point32 {
            x: p.x,
            y: p.y,
            z: p.z,
        });
        intensity.push(p.intensity);
    }

    PointCloudMsg {
        header: Header {
            stamp: midpoint_stamp(batch),
            frame_id,
        },
        points,
        channels: vec![ChannelFloat32 {
            name: INTENSITY_CHANNEL.to_string(),
            values: intensity,
        }],
    }
}
