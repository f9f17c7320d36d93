//! # Ingestion
//!
//! Packet intake for the post-processing node.
//!
//! Responsibilities:
//! - Decode structured and snappy-compressed packets into `DataPacket`
//! - Accumulate decoded packets into revolution batches
//! - Switch the upstream subscription on and off with downstream demand
//! - In-process bus and mock packet source for running without hardware
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{BatchAccumulator, InputDecoder};
//!
//! let decoder = InputDecoder::for_mode(InputMode::BinarySnappy);
//! let mut batch = BatchAccumulator::with_capacity(174);
//!
//! while let Some(msg) = subscription.recv().await {
//!     let decoded = decoder.decode(&msg)?;
//!     if let Some(revolution) = batch.push_and_take(decoded.packet) {
//!         // convert and publish
//!     }
//! }
//! ```

mod batch;
pub mod binary;
mod bus;
mod compression;
mod decoder;
mod error;
mod input;
mod lifecycle;
mod metrics;
mod mock;

// Re-exports
pub use batch::BatchAccumulator;
pub use binary::{decode_packet, encode_packet, BINARY_SIZE};
pub use bus::MemoryBus;
pub use compression::{compress_packet, Decompressor, SnappyDecompressor};
pub use decoder::{
    packet_to_msg, DecodedPacket, InputDecoder, PacketDecoder, RawPacketDecoder,
    SnappyPacketDecoder,
};
pub use error::{DecodeError, IngestionError};
pub use input::InputLink;
pub use lifecycle::{SubscriptionState, SubscriptionUpdater, Transition, UpstreamLink};
pub use metrics::{IngestionMetrics, MetricsSnapshot};
pub use mock::{packet as mock_packet, to_message as mock_message, MockPacketSource, MockSourceConfig};
