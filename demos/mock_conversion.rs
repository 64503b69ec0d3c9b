//! Mock Conversion Demo
//!
//! Demonstrates the full conversion flow with synthetic capture sources.
//! This demo runs without requiring a recorded rosbag export.
//!
//! Run with: cargo run --bin mock_conversion

use config_loader::ConfigLoader;
use contracts::{
    ConversionBlueprint, DatasetConfig, EpisodeRecord, FrameRow, SinkConfig, SinkType, SyncConfig,
    TopicsConfig,
};
use ingestion::{IngestionPipeline, MockCaptureSource};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Conversion Demo");

    // ==== Stage 1: Use default config or load from file ====
    let blueprint = if let Some(path) = std::env::args().nth(1) {
        tracing::info!(path = %path, "Loading conversion config");
        ConfigLoader::load_from_path(std::path::Path::new(&path))?
    } else {
        // Create a minimal test blueprint
        create_test_blueprint()
    };

    // ==== Stage 2: Register Mock Capture Sources ====
    tracing::info!("Registering mock capture sources...");

    let mut pipeline = IngestionPipeline::new(4096);

    // Two 10 s recording segments separated by a 5 s silence
    pipeline.register_source(
        Box::new(
            MockCaptureSource::joint_states(&blueprint.topics.joint_states, 100.0, 2000)
                .with_gap(1000, 5_000_000_000),
        ),
        None,
    );
    pipeline.register_source(
        Box::new(
            MockCaptureSource::camera(&blueprint.topics.camera, 30.0, 600, 64, 48)
                .with_gap(300, 5_000_000_100),
        ),
        None,
    );

    // ==== Stage 3: Collect Samples ====
    let rx = pipeline.take_receiver().expect("receiver already taken");
    pipeline.start_all();
    pipeline.close_input();

    let samples = ingestion::collect(rx).await?;
    tracing::info!(
        joints = samples.joints.len(),
        images = samples.images.len(),
        "Samples collected"
    );

    // ==== Stage 4: Detect Episodes & Synchronize ====
    let bounds = sync_core::detect_episodes(&samples.joints, blueprint.sync.gap_threshold_s)?;
    tracing::info!(episodes = bounds.len(), "Episode boundaries detected");

    let episodes = sync_core::split_by_episodes(&samples.joints, samples.images, &bounds)?;

    // ==== Stage 5: Dispatch to Sinks ====
    let (tx, dispatch_rx) = mpsc::channel::<EpisodeRecord>(16);
    let dispatcher = dispatcher::create_dispatcher(blueprint.sinks.clone(), dispatch_rx).await?;
    let dispatcher_handle = dispatcher.spawn();

    for (index, streams) in episodes.iter().enumerate() {
        let result = sync_core::synchronize(
            &streams.joints,
            &streams.images,
            blueprint.sync.fps,
            blueprint.sync.max_offset_ms,
        )?;

        tracing::info!(
            episode = index,
            frames = result.frame_count(),
            ticks_dropped = result.ticks_dropped,
            max_joint_offset_ms = format!("{:.2}", result.max_joint_offset_ms),
            max_image_offset_ms = format!("{:.2}", result.max_image_offset_ms),
            "Episode synchronized"
        );

        if result.is_empty() {
            continue;
        }

        // Assemble dataset rows: absolute state + delta action per frame
        let states: Vec<_> = result
            .frames
            .iter()
            .map(|f| sync_core::joint_positions(&f.joint))
            .collect();
        let actions = sync_core::compute_action_deltas(&states)?;

        let frames = result
            .frames
            .iter()
            .zip(actions)
            .map(|(frame, action)| FrameRow {
                frame_index: frame.frame_index,
                timestamp_s: frame.frame_index as f64 / blueprint.sync.fps,
                state: frame.joint.position.clone(),
                action: action.iter().copied().collect(),
                image: frame.image.clone(),
            })
            .collect();

        tx.send(EpisodeRecord {
            episode_index: index as u64,
            fps: blueprint.sync.fps,
            frames,
        })
        .await?;
    }

    drop(tx);
    dispatcher_handle.await?;

    tracing::info!("Mock conversion demo finished");
    Ok(())
}

/// Create a minimal test blueprint with a single log sink
fn create_test_blueprint() -> ConversionBlueprint {
    ConversionBlueprint {
        version: Default::default(),
        dataset: DatasetConfig {
            name: "mock_demo".to_string(),
            robot_type: "so100".to_string(),
        },
        topics: TopicsConfig {
            joint_states: "/joint_states".to_string(),
            camera: "/camera/color/image_raw".to_string(),
        },
        sync: SyncConfig::default(),
        sinks: vec![SinkConfig {
            name: "demo_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 16,
            params: Default::default(),
        }],
    }
}
