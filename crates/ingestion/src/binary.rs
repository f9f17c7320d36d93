//! Binary packet codec
//!
//! Little-endian layout of one packet:
//!
//! | field                     | size            |
//! |---------------------------|-----------------|
//! | timestamp (i64, ns)       | 8               |
//! | 12 × chunk                | 12 × 100        |
//! | ├ header_info (u16)       | 2               |
//! | ├ rotational_info (u16)   | 2               |
//! | └ 32 × (u16 dist, u8 int) | 96              |
//! | spin_count (u16)          | 2               |
//! | reserved (u32)            | 4               |

use bytes::{Buf, BufMut, Bytes, BytesMut};
use contracts::{DataPacket, CHUNKS_PER_PACKET, LASERS_PER_CHUNK};

use crate::error::DecodeError;

const CHUNK_SIZE: usize = 4 + LASERS_PER_CHUNK * 3;

/// Encoded size of one packet
pub const BINARY_SIZE: usize = 8 + CHUNKS_PER_PACKET * CHUNK_SIZE + 2 + 4;

/// Encode a packet
pub fn encode_packet(packet: &DataPacket) -> Bytes {
    let mut buf = BytesMut::with_capacity(BINARY_SIZE);
    buf.put_i64_le(packet.timestamp);
    for chunk in &packet.chunks {
        buf.put_u16_le(chunk.header_info);
        buf.put_u16_le(chunk.rotational_info);
        for ret in &chunk.lasers {
            buf.put_u16_le(ret.distance);
            buf.put_u8(ret.intensity);
        }
    }
    buf.put_u16_le(packet.spin_count);
    buf.put_u32_le(packet.reserved);
    buf.freeze()
}

/// Decode a packet; the buffer must hold exactly [`BINARY_SIZE`] bytes
pub fn decode_packet(mut data: &[u8]) -> Result<DataPacket, DecodeError> {
    if data.len() != BINARY_SIZE {
        return Err(DecodeError::SizeMismatch {
            expected: BINARY_SIZE,
            actual: data.len(),
        });
    }

    let mut packet = DataPacket {
        timestamp: data.get_i64_le(),
        ..Default::default()
    };
    for chunk in packet.chunks.iter_mut() {
        chunk.header_info = data.get_u16_le();
        chunk.rotational_info = data.get_u16_le();
        for ret in chunk.lasers.iter_mut() {
            ret.distance = data.get_u16_le();
            ret.intensity = data.get_u8();
        }
    }
    packet.spin_count = data.get_u16_le();
    packet.reserved = data.get_u32_le();

    Ok(packet)
}
