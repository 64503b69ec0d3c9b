//! # Ingestion Pipeline
//!
//! Capture ingestion module.
//!
//! Responsibilities:
//! - Register per-topic sample sources (supports Mock and Replay)
//! - Decode recorded samples into `BagSample`
//! - Backpressure management (a full channel blocks the source thread)
//! - Send to downstream via async-channel
//! - Collect and order both streams for synchronization
//!
//! ## Usage Example (Unified Interface)
//!
//! ```ignore
//! use ingestion::{collect, IngestionPipeline};
//! use contracts::BagSource;
//!
//! let mut pipeline = IngestionPipeline::new(1024);
//!
//! let source: Box<dyn BagSource> = open_capture_topic();
//! pipeline.register_source(source, None);
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! let samples = collect(rx).await?;
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockCaptureSource;
//!
//! let source = MockCaptureSource::joint_states("/joint_states", 500.0, 5000);
//! ```

mod adapter;
mod collector;
mod config;
mod error;
mod generic_adapter;
mod mock;
mod pipeline;
mod replay;

// Re-exports
pub use adapter::TopicAdapter;
pub use collector::{collect, SampleSet};
pub use config::{BackpressureConfig, IngestionMetrics, MetricsSnapshot};
pub use contracts::BagSample;
pub use error::{IngestionError, Result};
pub use generic_adapter::GenericTopicAdapter;
pub use mock::{MockCaptureSource, MockSourceConfig};
pub use pipeline::IngestionPipeline;
pub use replay::{ReplayConfig, ReplaySource};
