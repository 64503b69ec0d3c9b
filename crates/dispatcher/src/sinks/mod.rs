//! Sink implementations
//!
//! Contains LogSink, DatasetFileSink, and NetworkSink.

mod file;
mod log;
mod network;

pub use self::file::{DatasetFileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::network::{EpisodeSummary, NetworkFormat, NetworkSink, NetworkSinkConfig};
