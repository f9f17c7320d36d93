//! # Node
//!
//! Velodyne post-processing node: decoder, batch accumulator, cloud converter
//! and demand-gated publisher driven by one event loop.
//!
//! ```ignore
//! let bus = Arc::new(MemoryBus::new());
//! let publisher = Arc::new(CloudPublisher::new("point_cloud", 100));
//! let node = PostNode::from_settings(settings, bus, publisher)?;
//! let stats = node.run(tokio::signal::ctrl_c().map(|_| ())).await;
//! ```

mod error;
mod node;
mod stats;

pub use error::NodeError;
pub use node::{BatchOutcome, PostNode};
pub use stats::NodeStats;
