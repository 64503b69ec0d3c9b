//! Pipeline orchestrator - coordinates all components.
//!
//! Wires ingestion, episode detection, synchronization and dispatch into a
//! single conversion run: drain the recording, cut it into episodes, align
//! each episode onto the output grid and fan the records out to the sinks.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{ConversionBlueprint, EpisodeRecord, FrameRow, TopicKind};
use ingestion::{IngestionPipeline, MockCaptureSource, ReplayConfig, ReplaySource};
use observability::record_conversion_metrics;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::PipelineStats;

/// Where the conversion run reads its samples from
#[derive(Debug, Clone)]
pub enum SourceMode {
    /// Deterministic synthetic sources, no recording required
    Mock,

    /// Recorded samples from a directory holding `samples.jsonl`
    Replay(PathBuf),
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The conversion blueprint configuration
    pub blueprint: ConversionBlueprint,

    /// Sample source mode
    pub source_mode: SourceMode,

    /// Maximum number of episodes to convert (None = unlimited)
    pub max_episodes: Option<u64>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the conversion to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Ingestion Pipeline
        info!("Setting up ingestion pipeline...");
        let mut ingestion = IngestionPipeline::new(self.config.buffer_size);
        self.register_sources(&mut ingestion)?;

        info!(topics = ingestion.topic_count(), "Ingestion pipeline configured");

        // Drain the recording
        info!("Starting sample ingestion...");
        let rx = ingestion
            .take_receiver()
            .context("Failed to get ingestion receiver")?;
        ingestion.start_all();
        // The pipeline's own sender must go away or collect() never returns
        ingestion.close_input();

        let samples = ingestion::collect(rx)
            .await
            .context("Sample collection failed")?;

        let ingest_metrics = ingestion.metrics().snapshot();
        ingestion.stop_all();

        info!(
            joints = samples.joints.len(),
            images = samples.images.len(),
            out_of_order = samples.out_of_order,
            "Sample collection finished"
        );

        if ingest_metrics.samples_dropped > 0 {
            anyhow::bail!(
                "{} samples were lost before collection - refusing to write a truncated dataset",
                ingest_metrics.samples_dropped
            );
        }

        if samples.joints.is_empty() {
            anyhow::bail!("No joint samples collected - nothing to convert");
        }

        // Episode Detection & Splitting
        let bounds = sync_core::detect_episodes(&samples.joints, blueprint.sync.gap_threshold_s)
            .context("Episode detection failed")?;

        info!(episodes = bounds.len(), "Episode boundaries detected");

        let episodes = sync_core::split_by_episodes(&samples.joints, samples.images, &bounds)
            .context("Episode splitting failed")?;

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (episode_tx, episode_rx) = mpsc::channel::<EpisodeRecord>(self.config.buffer_size);

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - converted episodes will be dropped");
        }

        let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), episode_rx)
            .await
            .context("Failed to create dispatcher")?;

        let active_sinks = blueprint.sinks.len();
        let dispatcher_handle = dispatcher.spawn();

        info!(active_sinks, "Dispatcher started");

        // Synchronize & Dispatch
        let mut stats = PipelineStats {
            samples_received: ingest_metrics.samples_received,
            out_of_order: samples.out_of_order,
            active_sinks,
            ..Default::default()
        };

        for streams in &episodes {
            if let Some(max) = self.config.max_episodes {
                if stats.episodes_written >= max {
                    info!(episodes = stats.episodes_written, "Reached max episodes limit");
                    break;
                }
            }

            let episode_index = stats.episodes_written;
            let result = sync_core::synchronize(
                &streams.joints,
                &streams.images,
                blueprint.sync.fps,
                blueprint.sync.max_offset_ms,
            )
            .context("Synchronization failed")?;

            record_conversion_metrics(&result, episode_index);
            stats.conversion.update(&result);
            stats.ticks_dropped += result.ticks_dropped;

            if result.is_empty() {
                warn!(
                    episode_index,
                    joints = streams.joints.len(),
                    images = streams.images.len(),
                    "Episode produced no aligned frames, skipping"
                );
                continue;
            }

            info!(
                episode_index,
                frames = result.frame_count(),
                duration_s = format!("{:.2}", result.duration_s),
                ticks_dropped = result.ticks_dropped,
                max_joint_offset_ms = format!("{:.2}", result.max_joint_offset_ms),
                max_image_offset_ms = format!("{:.2}", result.max_image_offset_ms),
                "Episode synchronized"
            );

            stats.frames_synced += result.frame_count() as u64;

            let record = build_episode_record(episode_index, blueprint.sync.fps, &result)?;

            if episode_tx.send(record).await.is_err() {
                warn!("Dispatcher channel closed");
                break;
            }

            stats.episodes_written += 1;
        }

        // Shutdown
        info!("Shutting down pipeline...");
        drop(episode_tx);

        // Wait for dispatcher to flush
        let _ = tokio::time::timeout(Duration::from_secs(30), dispatcher_handle).await;

        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            episodes = stats.episodes_written,
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }

    /// Register one source per configured topic
    fn register_sources(&self, ingestion: &mut IngestionPipeline) -> Result<()> {
        let topics = &self.config.blueprint.topics;

        match &self.config.source_mode {
            SourceMode::Mock => {
                info!("Running in MOCK mode (no recording required)");

                // Two contiguous 10 s segments separated by a 5 s silence,
                // enough to exercise episode detection end to end. The camera
                // gap is padded so its first post-gap frame does not land in
                // the joint stream's silence and get cut away.
                let joints = MockCaptureSource::joint_states(&topics.joint_states, 100.0, 2000)
                    .with_gap(1000, 5_000_000_000);
                let camera = MockCaptureSource::camera(&topics.camera, 30.0, 600, 64, 48)
                    .with_gap(300, 5_000_000_100);

                ingestion.register_source(Box::new(joints), None);
                ingestion.register_source(Box::new(camera), None);
            }
            SourceMode::Replay(path) => {
                info!(path = %path.display(), "Running in REPLAY mode");

                let replay_config = ReplayConfig {
                    unthrottled: true,
                    ..Default::default()
                };

                let joints = ReplaySource::load(
                    path,
                    &topics.joint_states,
                    TopicKind::JointState,
                    replay_config.clone(),
                )
                .with_context(|| {
                    format!("Failed to open recording at {}", path.display())
                })?;

                let camera =
                    ReplaySource::load(path, &topics.camera, TopicKind::Image, replay_config)
                        .with_context(|| {
                            format!("Failed to open recording at {}", path.display())
                        })?;

                ingestion.register_source(Box::new(joints), None);
                ingestion.register_source(Box::new(camera), None);
            }
        }

        Ok(())
    }
}

/// Assemble the dataset rows for one synchronized episode
///
/// State is the absolute joint position per frame; action is the delta to
/// the next frame, zero on the terminal frame. Row timestamps sit on the
/// output grid relative to episode start.
fn build_episode_record(
    episode_index: u64,
    fps: f64,
    result: &contracts::SynchronizationResult,
) -> Result<EpisodeRecord> {
    let states: Vec<_> = result
        .frames
        .iter()
        .map(|frame| sync_core::joint_positions(&frame.joint))
        .collect();

    let actions =
        sync_core::compute_action_deltas(&states).context("Action delta computation failed")?;

    let frames = result
        .frames
        .iter()
        .zip(actions)
        .map(|(frame, action)| FrameRow {
            frame_index: frame.frame_index,
            timestamp_s: frame.frame_index as f64 / fps,
            state: frame.joint.position.clone(),
            action: action.iter().copied().collect(),
            image: frame.image.clone(),
        })
        .collect();

    Ok(EpisodeRecord {
        episode_index,
        fps,
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{ImageSample, JointSample, SyncedFrame, SynchronizationResult};

    fn synced_frame(frame_index: u64, tick_ns: i64, marker: f64) -> SyncedFrame {
        SyncedFrame {
            frame_index,
            tick_ns,
            joint: JointSample {
                timestamp_ns: tick_ns,
                names: vec!["j0".into(), "j1".into()],
                position: vec![marker, marker * 2.0],
                velocity: None,
            },
            image: ImageSample {
                timestamp_ns: tick_ns,
                width: 2,
                height: 2,
                data: Bytes::from(vec![0u8; 12]),
            },
            joint_offset_ms: 0.0,
            image_offset_ms: 0.0,
        }
    }

    #[test]
    fn test_build_episode_record_actions() {
        let result = SynchronizationResult {
            frames: vec![
                synced_frame(0, 0, 1.0),
                synced_frame(1, 33_333_333, 1.5),
                synced_frame(2, 66_666_666, 2.5),
            ],
            duration_s: 0.066,
            max_joint_offset_ms: 0.0,
            max_image_offset_ms: 0.0,
            ticks_dropped: 0,
        };

        let record = build_episode_record(3, 30.0, &result).unwrap();

        assert_eq!(record.episode_index, 3);
        assert_eq!(record.frames.len(), 3);

        // Delta to the next frame
        assert!((record.frames[0].action[0] - 0.5).abs() < 1e-10);
        assert!((record.frames[1].action[0] - 1.0).abs() < 1e-10);
        // Terminal frame gets the zero vector
        assert_eq!(record.frames[2].action, vec![0.0, 0.0]);

        // Rows sit on the output grid
        assert!((record.frames[1].timestamp_s - 1.0 / 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_build_episode_record_state_is_absolute() {
        let result = SynchronizationResult {
            frames: vec![synced_frame(0, 0, 4.0), synced_frame(1, 33_333_333, 5.0)],
            duration_s: 0.033,
            max_joint_offset_ms: 0.0,
            max_image_offset_ms: 0.0,
            ticks_dropped: 0,
        };

        let record = build_episode_record(0, 30.0, &result).unwrap();
        assert_eq!(record.frames[0].state, vec![4.0, 8.0]);
        assert_eq!(record.frames[1].state, vec![5.0, 10.0]);
    }
}
