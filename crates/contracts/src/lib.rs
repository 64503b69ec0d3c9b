//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses the recording's monotonic clock in integer nanoseconds (`timestamp_ns`, i64)
//!   as primary clock for every sample
//! - Output frame ticks live on a `1/fps` grid inside the streams' overlap window

mod blueprint;
mod episode;
mod error;
mod frame;
mod sample;
mod sink;
mod source;
mod topic_id;

pub use blueprint::*;
pub use episode::*;
pub use error::*;
pub use frame::*;
pub use sample::*;
pub use sink::*;
pub use source::{BagSource, SampleCallback};
pub use topic_id::TopicId;
