//! Wire messages
//!
//! Inbound shapes delivered by the transport and the outbound point cloud.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::FrameId;

/// Message header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Capture time (ns)
    pub stamp: i64,

    /// Coordinate frame the payload refers to
    pub frame_id: FrameId,
}

/// One laser return as carried by a structured packet message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaserDataMsg {
    pub distance: u16,
    pub intensity: u8,
}

/// One data chunk as carried by a structured packet message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChunkMsg {
    pub header_info: u16,
    pub rotational_info: u16,
    pub laser_data: Vec<LaserDataMsg>,
}

/// Structured packet message
///
/// Already shaped like a [`crate::DataPacket`], but the shape is only
/// guaranteed by the producer's schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacketMsg {
    pub header: Header,
    pub data_chunks: Vec<DataChunkMsg>,
    pub spin_count: u16,
    pub reserved: u32,
}

/// Snappy-compressed binary packet message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySnappyMsg {
    pub header: Header,

    /// Raw snappy block holding one binary-encoded packet
    pub data: Bytes,
}

/// Any message an inbound subscription can deliver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    DataPacket(DataPacketMsg),
    BinarySnappy(BinarySnappyMsg),
}

impl InboundMessage {
    /// Header of the wrapped message
    pub fn header(&self) -> &Header {
        match self {
            Self::DataPacket(msg) => &msg.header,
            Self::BinarySnappy(msg) => &msg.header,
        }
    }

    /// Short name of the message shape (for logs/metrics)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataPacket(_) => "data_packet",
            Self::BinarySnappy(_) => "binary_snappy",
        }
    }
}

impl From<DataPacketMsg> for InboundMessage {
    fn from(msg: DataPacketMsg) -> Self {
        Self::DataPacket(msg)
    }
}

impl From<BinarySnappyMsg> for InboundMessage {
    fn from(msg: BinarySnappyMsg) -> Self {
        Self::BinarySnappy(msg)
    }
}

/// Output point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point32 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Named per-point channel, index-aligned with the cloud's points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelFloat32 {
    pub name: String,
    pub values: Vec<f32>,
}

/// Name of the reflectivity channel
pub const INTENSITY_CHANNEL: &str = "intensity";

/// Published point cloud, one per completed revolution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloudMsg {
    pub header: Header,
    pub points: Vec<Point32>,
    pub channels: Vec<ChannelFloat32>,
}

impl PointCloudMsg {
    /// Number of points
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Intensity values, if the channel is present
    pub fn intensity(&self) -> Option<&[f32]> {
        self.channels
            .iter()
            .find(|c| c.name == INTENSITY_CHANNEL)
            .map(|c| c.values.as_slice())
    }
}
