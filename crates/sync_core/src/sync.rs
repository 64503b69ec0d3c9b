//! Fixed-rate nearest-neighbor stream alignment.

use contracts::{ContractError, ImageSample, JointSample, SyncedFrame, SynchronizationResult};
use tracing::{debug, instrument};

/// Default offset ceiling in milliseconds.
///
/// One 30 fps frame interval: joint-rate mismatches of a few milliseconds
/// never cause drops, while a sample from the wrong camera frame does.
pub const DEFAULT_MAX_OFFSET_MS: f64 = 34.0;

const NANOS_PER_SEC: f64 = 1e9;
const NANOS_PER_MS: f64 = 1e6;

/// Align a joint stream and an image stream onto a `1/fps` grid.
///
/// Both inputs must be in ascending `timestamp_ns` order. The grid spans the
/// overlap of the two streams' time ranges; for each tick the temporally
/// nearest joint sample and nearest image sample are selected independently
/// (ties broken toward the earlier sample). A tick is retained only if both
/// selections sit within `max_offset_ms` of the tick (inclusive); otherwise
/// the tick is dropped and counted.
///
/// Streams that do not overlap produce an empty result — that is valid
/// output, not an error.
///
/// # Errors
/// `ContractError::InvalidArgument` when `fps` or `max_offset_ms` is not a
/// positive finite number.
#[instrument(
    name = "synchronize",
    level = "debug",
    skip(joints, images),
    fields(joints = joints.len(), images = images.len(), fps, max_offset_ms)
)]
pub fn synchronize(
    joints: &[JointSample],
    images: &[ImageSample],
    fps: f64,
    max_offset_ms: f64,
) -> Result<SynchronizationResult, ContractError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(ContractError::invalid_argument(
            "fps",
            format!("must be a positive finite rate, got {fps}"),
        ));
    }
    if !(max_offset_ms.is_finite() && max_offset_ms > 0.0) {
        return Err(ContractError::invalid_argument(
            "max_offset_ms",
            format!("must be a positive finite ceiling, got {max_offset_ms}"),
        ));
    }

    let (Some(first_joint), Some(last_joint)) = (joints.first(), joints.last()) else {
        return Ok(SynchronizationResult::default());
    };
    let (Some(first_image), Some(last_image)) = (images.first(), images.last()) else {
        return Ok(SynchronizationResult::default());
    };

    let grid_start = first_joint.timestamp_ns.max(first_image.timestamp_ns);
    let grid_end = last_joint.timestamp_ns.min(last_image.timestamp_ns);
    if grid_start > grid_end {
        // One stream ends before the other begins
        return Ok(SynchronizationResult::default());
    }

    let step_ns = ((NANOS_PER_SEC / fps).round() as i64).max(1);

    let joint_ts: Vec<i64> = joints.iter().map(|s| s.timestamp_ns).collect();
    let image_ts: Vec<i64> = images.iter().map(|s| s.timestamp_ns).collect();

    let mut frames: Vec<SyncedFrame> = Vec::new();
    let mut max_joint_offset_ms = 0.0f64;
    let mut max_image_offset_ms = 0.0f64;
    let mut ticks_dropped = 0u64;

    let mut tick = grid_start;
    while tick <= grid_end {
        let (joint_idx, joint_delta_ns) = nearest(&joint_ts, tick);
        let (image_idx, image_delta_ns) = nearest(&image_ts, tick);

        let joint_offset_ms = joint_delta_ns as f64 / NANOS_PER_MS;
        let image_offset_ms = image_delta_ns as f64 / NANOS_PER_MS;

        // Inclusive ceiling: an offset exactly at the limit is accepted
        if joint_offset_ms <= max_offset_ms && image_offset_ms <= max_offset_ms {
            max_joint_offset_ms = max_joint_offset_ms.max(joint_offset_ms);
            max_image_offset_ms = max_image_offset_ms.max(image_offset_ms);

            metrics::histogram!("bagsync_sync_joint_offset_ms").record(joint_offset_ms);
            metrics::histogram!("bagsync_sync_image_offset_ms").record(image_offset_ms);

            frames.push(SyncedFrame {
                frame_index: frames.len() as u64,
                tick_ns: tick,
                joint: joints[joint_idx].clone(),
                image: images[image_idx].clone(),
                joint_offset_ms,
                image_offset_ms,
            });
        } else {
            ticks_dropped += 1;
        }

        tick += step_ns;
    }

    metrics::counter!("bagsync_sync_frames_total").increment(frames.len() as u64);
    if ticks_dropped > 0 {
        metrics::counter!("bagsync_sync_ticks_dropped_total").increment(ticks_dropped);
    }

    let duration_s = match (frames.first(), frames.last()) {
        (Some(first), Some(last)) if frames.len() > 1 => {
            (last.tick_ns - first.tick_ns) as f64 / NANOS_PER_SEC
        }
        _ => 0.0,
    };

    debug!(
        frames = frames.len(),
        ticks_dropped,
        duration_s,
        max_joint_offset_ms,
        max_image_offset_ms,
        "stream alignment finished"
    );

    Ok(SynchronizationResult {
        frames,
        duration_s,
        max_joint_offset_ms,
        max_image_offset_ms,
        ticks_dropped,
    })
}

/// Index of the timestamp closest to `t`, with its absolute distance in ns.
///
/// `ts` must be sorted ascending and non-empty. Ties break toward the
/// earlier sample.
fn nearest(ts: &[i64], t: i64) -> (usize, i64) {
    let idx = ts.partition_point(|&x| x < t);
    if idx == 0 {
        return (0, ts[0] - t);
    }
    if idx == ts.len() {
        return (ts.len() - 1, t - ts[ts.len() - 1]);
    }

    let left_delta = t - ts[idx - 1];
    let right_delta = ts[idx] - t;
    if right_delta < left_delta {
        (idx, right_delta)
    } else {
        (idx - 1, left_delta)
    }
}
