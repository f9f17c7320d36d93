//! Sink implementations

mod collect;
mod log;

pub use self::collect::CollectSink;
pub use self::log::LogSink;
