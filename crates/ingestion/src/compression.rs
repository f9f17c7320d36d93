//! Snappy block decompression

use bytes::Bytes;
use contracts::DataPacket;

use crate::binary::{encode_packet, BINARY_SIZE};
use crate::error::DecodeError;

/// Whole-buffer decompression primitive
pub trait Decompressor: Send + Sync {
    /// Inflate `data`; fails unless the output is exactly `expected_size` bytes
    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, DecodeError>;
}

/// Raw (unframed) snappy
#[derive(Debug, Clone, Copy, Default)]
pub struct SnappyDecompressor;

impl Decompressor for SnappyDecompressor {
    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, DecodeError> {
        let declared = snap::raw::decompress_len(data).map_err(|e| DecodeError::Decompress {
            message: e.to_string(),
        })?;
        if declared != expected_size {
            return Err(DecodeError::SizeMismatch {
                expected: expected_size,
                actual: declared,
            });
        }

        snap::raw::Decoder::new()
            .decompress_vec(data)
            .map_err(|e| DecodeError::Decompress {
                message: e.to_string(),
            })
    }
}

/// Encode and snappy-compress a packet, the producer side of the snappy input
pub fn compress_packet(packet: &DataPacket) -> Result<Bytes, DecodeError> {
    let raw = encode_packet(packet);
    debug_assert_eq!(raw.len(), BINARY_SIZE);
    snap::raw::Encoder::new()
        .compress_vec(&raw)
        .map(Bytes::from)
        .map_err(compress_error)
}

fn compress_error(e: snap::Error) -> DecodeError {
    DecodeError::Compress {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompress_packet() {
        let mut packet = DataPacket::default();
        packet.chunks[3].lasers[5].distance = 4242;

        let compressed = compress_packet(&packet).unwrap();
        assert!(compressed.len() < BINARY_SIZE);

        let raw = SnappyDecompressor
            .decompress(&compressed, BINARY_SIZE)
            .unwrap();
        assert_eq!(raw.len(), BINARY_SIZE);
        assert_eq!(crate::binary::decode_packet(&raw).unwrap(), packet);
    }

    #[test]
    fn test_encoder_failure_is_a_compress_error() {
        let err = compress_error(snap::Error::TooBig { given: 10, max: 5 });

        assert!(matches!(err, DecodeError::Compress { .. }));
        assert_eq!(err.kind(), "compress");
        assert!(err.to_string().starts_with("compression failed: "));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let result = SnappyDecompressor.decompress(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF], BINARY_SIZE);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        let short = snap::raw::Encoder::new().compress_vec(&[0u8; 100]).unwrap();
        let err = SnappyDecompressor
            .decompress(&short, BINARY_SIZE)
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::SizeMismatch {
                expected: BINARY_SIZE,
                actual: 100
            }
        );
    }
}
