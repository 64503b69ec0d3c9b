//! # Sync Core
//!
//! Batch alignment core for rosbag→dataset conversion.
//!
//! Responsible for:
//! - Nearest-neighbor temporal alignment of a joint stream and an image
//!   stream onto a fixed `1/fps` grid ([`synchronize`])
//! - Gap-based episode boundary detection ([`detect_episodes`])
//! - Per-episode re-partitioning of the image stream ([`split_by_episodes`])
//! - Frame-to-frame action-delta computation ([`compute_action_deltas`])
//!
//! Every operation is a pure function over in-memory sequences: no I/O, no
//! shared state, identical outputs for identical inputs. Callers parallelize
//! across independent recordings or episodes without any coordination here.
//!
//! ## Usage
//!
//! ```ignore
//! let bounds = sync_core::detect_episodes(&joints, 2.0)?;
//! for episode in sync_core::split_by_episodes(&joints, images, &bounds)? {
//!     let result = sync_core::synchronize(
//!         &episode.joints,
//!         &episode.images,
//!         30.0,
//!         sync_core::DEFAULT_MAX_OFFSET_MS,
//!     )?;
//!     // hand result.frames plus compute_action_deltas output to the writer
//! }
//! ```

mod action;
mod episode;
mod sync;

pub use action::{compute_action_deltas, joint_positions};
pub use episode::{detect_episodes, split_by_episodes};
pub use sync::{synchronize, DEFAULT_MAX_OFFSET_MS};

// Re-export contracts types that appear in this crate's signatures
pub use contracts::{
    EpisodeBounds, EpisodeStreams, ImageSample, JointSample, SyncedFrame, SynchronizationResult,
};
