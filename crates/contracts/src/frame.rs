//! SyncedFrame - Synchronizer output
//!
//! Fixed-rate merged frame data structures.

use serde::{Deserialize, Serialize};

use crate::{ImageSample, JointSample};

/// One synchronized output frame
///
/// Carries the joint and image samples nearest to a grid tick, together with
/// how far (in milliseconds) each selected sample sits from the tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedFrame {
    /// Frame sequence number among retained ticks (0-based)
    pub frame_index: u64,

    /// Grid tick timestamp (nanoseconds, recording clock)
    pub tick_ns: i64,

    /// Nearest joint sample to the tick
    pub joint: JointSample,

    /// Nearest image sample to the tick
    pub image: ImageSample,

    /// |tick - joint.timestamp| in milliseconds
    pub joint_offset_ms: f64,

    /// |tick - image.timestamp| in milliseconds
    pub image_offset_ms: f64,
}

/// Result of aligning one joint stream and one image stream onto a frame grid
///
/// Empty (`frame_count() == 0`) when the two streams' time ranges do not
/// overlap — that is a valid result, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynchronizationResult {
    /// Retained frames in tick order
    pub frames: Vec<SyncedFrame>,

    /// Span between first and last retained tick, seconds
    pub duration_s: f64,

    /// Worst joint-selection offset across retained frames, milliseconds
    pub max_joint_offset_ms: f64,

    /// Worst image-selection offset across retained frames, milliseconds
    pub max_image_offset_ms: f64,

    /// Grid ticks discarded because no sample was within the offset ceiling
    pub ticks_dropped: u64,
}

impl SynchronizationResult {
    /// Number of aligned output frames.
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// True when the streams did not overlap or every tick was dropped.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
