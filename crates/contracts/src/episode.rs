//! Episode structures - detector, splitter and dataset-writer contracts

use serde::{Deserialize, Serialize};

use crate::{ImageSample, JointSample};

/// One contiguous recording segment over the joint-sample sequence
///
/// Indices are inclusive on both ends. Boundaries returned by the detector
/// partition `0..joint_samples.len()` exactly: ascending, non-overlapping,
/// gap-free in index coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeBounds {
    /// First joint-sample index of the episode
    pub start_idx: usize,

    /// Last joint-sample index of the episode (inclusive)
    pub end_idx: usize,
}

impl EpisodeBounds {
    /// Number of joint samples covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.end_idx - self.start_idx + 1
    }

    /// Always false: bounds cover at least one sample.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Per-episode joint and image sub-streams, ready for synchronization
#[derive(Debug, Clone)]
pub struct EpisodeStreams {
    /// Bounds this entry was cut from
    pub bounds: EpisodeBounds,

    /// Joint samples of the episode, time order preserved
    pub joints: Vec<JointSample>,

    /// Image samples whose timestamps fall inside the episode's time range
    pub images: Vec<ImageSample>,
}

/// One dataset row: the writer contract downstream consumers rely on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRow {
    /// Frame index within the episode (0-based)
    pub frame_index: u64,

    /// Seconds since episode start, on the `1/fps` grid
    pub timestamp_s: f64,

    /// Absolute joint positions at this frame
    pub state: Vec<f64>,

    /// Frame-to-frame position delta (zero vector on the terminal frame)
    pub action: Vec<f64>,

    /// Camera frame chosen for this tick
    pub image: ImageSample,
}

/// One training episode handed to the dataset sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode index within the conversion run (0-based)
    pub episode_index: u64,

    /// Output frame rate the rows were aligned to
    pub fps: f64,

    /// Per-frame rows in tick order
    pub frames: Vec<FrameRow>,
}

impl EpisodeRecord {
    /// Episode length in seconds on the output grid.
    pub fn duration_s(&self) -> f64 {
        if self.fps > 0.0 {
            self.frames.len() as f64 / self.fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_len() {
        let bounds = EpisodeBounds {
            start_idx: 3,
            end_idx: 3,
        };
        assert_eq!(bounds.len(), 1);

        let bounds = EpisodeBounds {
            start_idx: 0,
            end_idx: 9,
        };
        assert_eq!(bounds.len(), 10);
    }

    #[test]
    fn test_record_duration() {
        let record = EpisodeRecord {
            episode_index: 0,
            fps: 30.0,
            frames: Vec::new(),
        };
        assert_eq!(record.duration_s(), 0.0);
    }
}
