//! # Dispatcher
//!
//! Point cloud output.
//!
//! Responsibilities:
//! - Assemble the outbound cloud message for a completed batch
//! - Broadcast clouds and expose the live consumer count as demand
//! - Drive consumer sinks, isolating slow ones from the node

pub mod assemble;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod publisher;
pub mod sinks;

pub use assemble::{assemble_message, midpoint_stamp};
pub use contracts::{CloudOutput, CloudSink, PointCloudMsg};
pub use dispatcher::Dispatcher;
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use publisher::{CloudPublisher, SharedCloud};
pub use sinks::{CollectSink, LogSink};
