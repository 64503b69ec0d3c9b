//! BagSource trait - Capture data source abstraction
//!
//! Defines a unified interface for sample producers, decoupling the ingestion
//! pipeline from where the samples come from. A real rosbag/mcap decoder, the
//! JSONL replay reader and the mock generator all sit behind the same seam.

use std::sync::Arc;

use crate::{BagSample, TopicId, TopicKind};

/// Sample callback type
///
/// When a source produces a sample, it hands a `BagSample` to this callback.
/// Uses `Arc` so the callback can be shared across contexts.
pub type SampleCallback = Arc<dyn Fn(BagSample) + Send + Sync>;

/// Capture data source trait
///
/// Abstracts one topic's worth of a recording. All sample producers implement
/// this trait for use by the ingestion pipeline.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn BagSource> = open_capture_topic();
/// source.listen(Arc::new(|sample| {
///     println!("sample at {} ns", sample.timestamp_ns());
/// }));
/// // ... drain the pipeline ...
/// source.stop();
/// ```
pub trait BagSource: Send + Sync {
    /// Topic this source produces samples for
    fn topic(&self) -> &TopicId;

    /// Kind of samples the topic carries
    fn kind(&self) -> TopicKind;

    /// Register the sample callback and start producing
    ///
    /// Repeated calls while already listening must be idempotent (no second
    /// callback is registered).
    fn listen(&self, callback: SampleCallback);

    /// Stop producing samples
    fn stop(&self);

    /// Check whether the source is currently producing
    fn is_listening(&self) -> bool;
}
