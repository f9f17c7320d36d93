//! Packet decoders
//!
//! Both input shapes end up as a [`DataPacket`] stamped with the message
//! header time. A failure affects only the offending message.

use contracts::{
    BinarySnappyMsg, DataChunkMsg, DataPacket, DataPacketMsg, FrameId, InboundMessage, InputMode,
    LaserDataMsg, CHUNKS_PER_PACKET, LASERS_PER_CHUNK,
};

use crate::binary::{decode_packet, BINARY_SIZE};
use crate::compression::{Decompressor, SnappyDecompressor};
use crate::error::DecodeError;

/// Decoded packet together with the frame it was captured in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    pub frame_id: FrameId,
    pub packet: DataPacket,
}

/// Turns one inbound message into a [`DecodedPacket`]
pub trait PacketDecoder {
    type Message;

    fn decode(&self, msg: &Self::Message) -> Result<DecodedPacket, DecodeError>;
}

/// Decoder for structured packet messages
#[derive(Debug, Clone, Copy, Default)]
pub struct RawPacketDecoder;

impl PacketDecoder for RawPacketDecoder {
    type Message = DataPacketMsg;

    fn decode(&self, msg: &DataPacketMsg) -> Result<DecodedPacket, DecodeError> {
        DecodedPacket::try_from(msg)
    }
}

impl TryFrom<&DataPacketMsg> for DecodedPacket {
    type Error = DecodeError;

    fn try_from(msg: &DataPacketMsg) -> Result<Self, Self::Error> {
        if msg.data_chunks.len() != CHUNKS_PER_PACKET {
            return Err(DecodeError::Shape {
                what: "data_chunks",
                expected: CHUNKS_PER_PACKET,
                actual: msg.data_chunks.len(),
            });
        }

        let mut packet = DataPacket {
            timestamp: msg.header.stamp,
            spin_count: msg.spin_count,
            reserved: msg.reserved,
            ..Default::default()
        };
        for (chunk, src) in packet.chunks.iter_mut().zip(&msg.data_chunks) {
            if src.laser_data.len() != LASERS_PER_CHUNK {
                return Err(DecodeError::Shape {
                    what: "laser_data",
                    expected: LASERS_PER_CHUNK,
                    actual: src.laser_data.len(),
                });
            }
            chunk.header_info = src.header_info;
            chunk.rotational_info = src.rotational_info;
            for (ret, laser) in chunk.lasers.iter_mut().zip(&src.laser_data) {
                ret.distance = laser.distance;
                ret.intensity = laser.intensity;
            }
        }

        Ok(DecodedPacket {
            frame_id: msg.header.frame_id.clone(),
            packet,
        })
    }
}

/// Decoder for snappy-compressed binary packets
#[derive(Debug, Clone, Default)]
pub struct SnappyPacketDecoder<D = SnappyDecompressor> {
    decompressor: D,
}

impl<D: Decompressor> SnappyPacketDecoder<D> {
    pub fn new(decompressor: D) -> Self {
        Self { decompressor }
    }
}

impl<D: Decompressor> PacketDecoder for SnappyPacketDecoder<D> {
    type Message = BinarySnappyMsg;

    fn decode(&self, msg: &BinarySnappyMsg) -> Result<DecodedPacket, DecodeError> {
        let raw = self.decompressor.decompress(&msg.data, BINARY_SIZE)?;
        let mut packet = decode_packet(&raw)?;
        // header time wins over the embedded one
        packet.timestamp = msg.header.stamp;

        Ok(DecodedPacket {
            frame_id: msg.header.frame_id.clone(),
            packet,
        })
    }
}

/// Build the structured message for a packet
pub fn packet_to_msg(packet: &DataPacket, frame_id: FrameId) -> DataPacketMsg {
    DataPacketMsg {
        header: contracts::Header {
            stamp: packet.timestamp,
            frame_id,
        },
        data_chunks: packet
            .chunks
            .iter()
            .map(|chunk| DataChunkMsg {
                header_info: chunk.header_info,
                rotational_info: chunk.rotational_info,
                laser_data: chunk
                    .lasers
                    .iter()
                    .map(|ret| LaserDataMsg {
                        distance: ret.distance,
                        intensity: ret.intensity,
                    })
                    .collect(),
            })
            .collect(),
        spin_count: packet.spin_count,
        reserved: packet.reserved,
    }
}

/// Decoder for whichever input shape is configured
///
/// Messages of the other shape are rejected.
#[derive(Debug, Clone)]
pub struct InputDecoder {
    mode: InputMode,
    raw: RawPacketDecoder,
    snappy: SnappyPacketDecoder,
}

impl InputDecoder {
    pub fn for_mode(mode: InputMode) -> Self {
        Self {
            mode,
            raw: RawPacketDecoder,
            snappy: SnappyPacketDecoder::default(),
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn decode(&self, msg: &InboundMessage) -> Result<DecodedPacket, DecodeError> {
        match (self.mode, msg) {
            (InputMode::BinarySnappy, InboundMessage::BinarySnappy(m)) => self.snappy.decode(m),
            (InputMode::DataPacket, InboundMessage::DataPacket(m)) => self.raw.decode(m),
            (expected, other) => Err(DecodeError::UnexpectedMessage {
                expected,
                got: other.kind(),
            }),
        }
    }
}
