//! Gap-based episode detection and per-episode stream splitting.

use contracts::{ContractError, EpisodeBounds, EpisodeStreams, ImageSample, JointSample};
use tracing::{debug, instrument};

const NANOS_PER_SEC: f64 = 1e9;

/// Partition a continuous joint recording into contiguous episodes.
///
/// Walks the time-ordered sequence and ends the current episode wherever the
/// distance to the next sample is strictly greater than `gap_threshold_s` —
/// a gap exactly at the threshold does not split. The returned inclusive
/// index ranges cover every input index exactly once, in ascending order.
///
/// # Errors
/// - `ContractError::EmptyInput` for an empty sample sequence
/// - `ContractError::InvalidArgument` for a non-positive threshold
#[instrument(
    name = "detect_episodes",
    level = "debug",
    skip(joints),
    fields(samples = joints.len(), gap_threshold_s)
)]
pub fn detect_episodes(
    joints: &[JointSample],
    gap_threshold_s: f64,
) -> Result<Vec<EpisodeBounds>, ContractError> {
    if joints.is_empty() {
        return Err(ContractError::empty_input("detect_episodes"));
    }
    if !(gap_threshold_s.is_finite() && gap_threshold_s > 0.0) {
        return Err(ContractError::invalid_argument(
            "gap_threshold_s",
            format!("must be a positive finite threshold, got {gap_threshold_s}"),
        ));
    }

    // Round once to whole nanoseconds so the comparison itself stays in
    // integers; comparing in f64 makes an exact-threshold gap split for
    // thresholds like 2.3 that are not representable
    let threshold_ns = (gap_threshold_s * NANOS_PER_SEC).round() as i64;

    let mut bounds = Vec::new();
    let mut start_idx = 0;
    for i in 0..joints.len() - 1 {
        let gap_ns = joints[i + 1].timestamp_ns - joints[i].timestamp_ns;
        // Strict comparison: an exact-threshold gap stays in one episode
        if gap_ns > threshold_ns {
            bounds.push(EpisodeBounds {
                start_idx,
                end_idx: i,
            });
            start_idx = i + 1;
        }
    }
    bounds.push(EpisodeBounds {
        start_idx,
        end_idx: joints.len() - 1,
    });

    metrics::counter!("bagsync_episodes_detected_total").increment(bounds.len() as u64);
    debug!(episodes = bounds.len(), "episode boundaries detected");

    Ok(bounds)
}

/// Assign image samples to the episodes whose joint time ranges contain them.
///
/// For each boundary pair the joint sub-sequence is copied out and paired
/// with exactly those images whose timestamps fall inside the episode's
/// `[start, end]` wall-clock range (inclusive). Images recorded during a gap
/// belong to no episode and are discarded, never reassigned to a neighbor.
/// Output order matches boundary order.
///
/// `images` must be in ascending timestamp order; the image stream is moved,
/// not copied, so large pixel buffers change owner exactly once.
///
/// # Errors
/// `ContractError::InvalidArgument` when a boundary pair does not describe a
/// valid ascending range inside `joints`.
#[instrument(
    name = "split_by_episodes",
    level = "debug",
    skip(joints, images, bounds),
    fields(joints = joints.len(), images = images.len(), episodes = bounds.len())
)]
pub fn split_by_episodes(
    joints: &[JointSample],
    images: Vec<ImageSample>,
    bounds: &[EpisodeBounds],
) -> Result<Vec<EpisodeStreams>, ContractError> {
    for (i, b) in bounds.iter().enumerate() {
        if b.end_idx < b.start_idx || b.end_idx >= joints.len() {
            return Err(ContractError::invalid_argument(
                "bounds",
                format!(
                    "boundary {i} ({}..={}) out of range for {} joint samples",
                    b.start_idx,
                    b.end_idx,
                    joints.len()
                ),
            ));
        }
        if i > 0 && b.start_idx <= bounds[i - 1].end_idx {
            return Err(ContractError::invalid_argument(
                "bounds",
                format!("boundary {i} overlaps its predecessor"),
            ));
        }
    }

    let mut episodes = Vec::with_capacity(bounds.len());
    let mut image_iter = images.into_iter().peekable();
    let mut gap_images = 0u64;

    for b in bounds {
        let range_start = joints[b.start_idx].timestamp_ns;
        let range_end = joints[b.end_idx].timestamp_ns;

        // Images before this episode's window fell into a gap
        while image_iter
            .peek()
            .is_some_and(|img| img.timestamp_ns < range_start)
        {
            image_iter.next();
            gap_images += 1;
        }

        let mut episode_images = Vec::new();
        while image_iter
            .peek()
            .is_some_and(|img| img.timestamp_ns <= range_end)
        {
            // peek above guarantees the item
            if let Some(img) = image_iter.next() {
                episode_images.push(img);
            }
        }

        episodes.push(EpisodeStreams {
            bounds: *b,
            joints: joints[b.start_idx..=b.end_idx].to_vec(),
            images: episode_images,
        });
    }

    gap_images += image_iter.count() as u64;
    if gap_images > 0 {
        metrics::counter!("bagsync_images_outside_episodes_total").increment(gap_images);
        debug!(gap_images, "images outside every episode window discarded");
    }

    Ok(episodes)
}
