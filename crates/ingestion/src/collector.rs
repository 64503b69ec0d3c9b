//! Sample collection
//!
//! Drains the pipeline channel into per-topic buffers ready for
//! synchronization. Capture order is not trusted: rosbag writers interleave
//! topics by arrival, so both streams are re-sorted by timestamp here.

use async_channel::Receiver;
use contracts::{BagSample, ContractError, ImageSample, JointSample};
use metrics::counter;
use tracing::{debug, instrument, warn};

/// Collected per-topic sample buffers
#[derive(Debug, Default)]
pub struct SampleSet {
    /// Joint-state samples, ascending by timestamp
    pub joints: Vec<JointSample>,

    /// Image samples, ascending by timestamp
    pub images: Vec<ImageSample>,

    /// Samples that arrived out of timestamp order
    pub out_of_order: u64,
}

impl SampleSet {
    /// Total sample count across both streams
    pub fn len(&self) -> usize {
        self.joints.len() + self.images.len()
    }

    /// True when neither stream holds a sample
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.images.is_empty()
    }
}

/// Drain the channel until all senders hang up
///
/// Every sample is validated before it enters a buffer; a malformed sample
/// aborts the run rather than silently producing a corrupt dataset.
///
/// # Errors
/// `ContractError::Invariant` from the first sample that fails validation.
#[instrument(name = "ingestion_collect", skip(rx))]
pub async fn collect(rx: Receiver<BagSample>) -> Result<SampleSet, ContractError> {
    let mut set = SampleSet::default();
    let mut last_joint_ns = i64::MIN;
    let mut last_image_ns = i64::MIN;

    while let Ok(sample) = rx.recv().await {
        sample.validate()?;
        counter!("bagsync_samples_collected_total").increment(1);

        match sample {
            BagSample::Joint(joint) => {
                if joint.timestamp_ns < last_joint_ns {
                    set.out_of_order += 1;
                } else {
                    last_joint_ns = joint.timestamp_ns;
                }
                set.joints.push(joint);
            }
            BagSample::Image(image) => {
                if image.timestamp_ns < last_image_ns {
                    set.out_of_order += 1;
                } else {
                    last_image_ns = image.timestamp_ns;
                }
                set.images.push(image);
            }
        }
    }

    if set.out_of_order > 0 {
        counter!("bagsync_samples_out_of_order_total").increment(set.out_of_order);
        warn!(
            out_of_order = set.out_of_order,
            "samples arrived out of timestamp order, re-sorting"
        );
    }

    set.joints.sort_by_key(|s| s.timestamp_ns);
    set.images.sort_by_key(|s| s.timestamp_ns);

    debug!(
        joints = set.joints.len(),
        images = set.images.len(),
        "sample collection finished"
    );

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn joint(timestamp_ns: i64) -> BagSample {
        BagSample::Joint(JointSample {
            timestamp_ns,
            names: vec!["j0".into()],
            position: vec![0.0],
            velocity: None,
        })
    }

    fn image(timestamp_ns: i64) -> BagSample {
        BagSample::Image(ImageSample {
            timestamp_ns,
            width: 2,
            height: 2,
            data: Bytes::from(vec![0u8; 12]),
        })
    }

    #[tokio::test]
    async fn test_collect_partitions_by_kind() {
        let (tx, rx) = async_channel::bounded(16);
        for sample in [joint(0), image(5), joint(10), joint(20), image(15)] {
            tx.send(sample).await.unwrap();
        }
        drop(tx);

        let set = collect(rx).await.unwrap();
        assert_eq!(set.joints.len(), 3);
        assert_eq!(set.images.len(), 2);
        assert_eq!(set.out_of_order, 0);
    }

    #[tokio::test]
    async fn test_collect_sorts_out_of_order_samples() {
        let (tx, rx) = async_channel::bounded(16);
        for sample in [joint(20), joint(0), joint(10)] {
            tx.send(sample).await.unwrap();
        }
        drop(tx);

        let set = collect(rx).await.unwrap();
        assert_eq!(set.out_of_order, 2);
        let ts: Vec<i64> = set.joints.iter().map(|s| s.timestamp_ns).collect();
        assert_eq!(ts, vec![0, 10, 20]);
    }

    #[tokio::test]
    async fn test_collect_rejects_invalid_sample() {
        let (tx, rx) = async_channel::bounded(16);
        tx.send(BagSample::Image(ImageSample {
            timestamp_ns: 0,
            width: 2,
            height: 2,
            data: Bytes::from(vec![0u8; 5]),
        }))
        .await
        .unwrap();
        drop(tx);

        let err = collect(rx).await.unwrap_err();
        assert!(matches!(err, ContractError::Invariant { .. }));
    }

    #[tokio::test]
    async fn test_collect_empty_channel() {
        let (tx, rx) = async_channel::bounded::<BagSample>(1);
        drop(tx);

        let set = collect(rx).await.unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
