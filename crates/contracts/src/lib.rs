//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the post-processing node.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Packet and message timestamps are capture times in nanoseconds (`i64`)
//! - A published cloud carries the midpoint of its batch as its stamp
//!
//! ## Packet Shape
//! A [`DataPacket`] always holds [`CHUNKS_PER_PACKET`] chunks of
//! [`LASERS_PER_CHUNK`] returns; wire messages of any other shape are rejected
//! before they reach the accumulator.

mod config;
mod error;
mod frame_id;
mod message;
mod output;
mod packet;
mod sink;
mod transport;

pub use config::*;
pub use error::*;
pub use frame_id::FrameId;
pub use message::*;
pub use output::CloudOutput;
pub use packet::*;
pub use sink::*;
pub use transport::{InboundTransport, Subscription};
