//! DataPacket - the canonical in-memory packet record
//!
//! Every decode path produces this structure. Chunk and laser counts are
//! fixed by the array types, so a constructed packet always has the device
//! shape.

use serde::{Deserialize, Serialize};

/// Data chunks per packet
pub const CHUNKS_PER_PACKET: usize = 12;

/// Laser returns per data chunk
pub const LASERS_PER_CHUNK: usize = 32;

/// Header marking the upper laser block (lasers 0..32)
pub const UPPER_BLOCK: u16 = 0xEEFF;

/// Header marking the lower laser block (lasers 32..64)
pub const LOWER_BLOCK: u16 = 0xDDFF;

/// One laser's measurement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLaserReturn {
    /// Distance in 2 mm ticks, 0 = no return
    pub distance: u16,

    /// Reflectivity
    pub intensity: u8,
}

/// Returns sharing one block header and one azimuth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChunk {
    /// Block identifier ([`UPPER_BLOCK`] or [`LOWER_BLOCK`])
    pub header_info: u16,

    /// Azimuth at capture time (hundredths of a degree)
    pub rotational_info: u16,

    /// Laser returns in firing order
    pub lasers: [RawLaserReturn; LASERS_PER_CHUNK],
}

impl DataChunk {
    /// Index of the first laser covered by this chunk
    #[inline]
    pub fn laser_offset(&self) -> usize {
        if self.header_info == LOWER_BLOCK {
            LASERS_PER_CHUNK
        } else {
            0
        }
    }
}

impl Default for DataChunk {
    fn default() -> Self {
        Self {
            header_info: UPPER_BLOCK,
            rotational_info: 0,
            lasers: [RawLaserReturn::default(); LASERS_PER_CHUNK],
        }
    }
}

/// One sensor packet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPacket {
    /// Data chunks in wire order
    pub chunks: [DataChunk; CHUNKS_PER_PACKET],

    /// Capture time (ns)
    pub timestamp: i64,

    /// Revolution counter, 0 when unavailable
    pub spin_count: u16,

    /// Opaque pass-through bytes
    pub reserved: u32,
}

impl DataPacket {
    /// Iterate over every `(chunk, return)` pair in packet order
    pub fn returns(&self) -> impl Iterator<Item = (&DataChunk, usize, &RawLaserReturn)> {
        self.chunks.iter().flat_map(|chunk| {
            chunk
                .lasers
                .iter()
                .enumerate()
                .map(move |(j, ret)| (chunk, j, ret))
        })
    }
}

impl Default for DataPacket {
    fn default() -> Self {
        Self {
            chunks: [DataChunk::default(); CHUNKS_PER_PACKET],
            timestamp: 0,
            spin_count: 0,
            reserved: 0,
        }
    }
}
