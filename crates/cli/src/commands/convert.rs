//! `convert` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ConvertArgs;
use crate::pipeline::{Pipeline, PipelineConfig, SourceMode};

/// Execute the `convert` command
pub async fn run_convert(args: &ConvertArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref output) = args.output {
        info!(output = %output.display(), "Overriding file-sink output directory from CLI");
        for sink in blueprint
            .sinks
            .iter_mut()
            .filter(|s| s.sink_type == contracts::SinkType::File)
        {
            sink.params
                .insert("base_path".to_string(), output.display().to_string());
        }
    }

    info!(
        dataset = %blueprint.dataset.name,
        joint_topic = %blueprint.topics.joint_states,
        camera_topic = %blueprint.topics.camera,
        fps = blueprint.sync.fps,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let source_mode = if let Some(ref replay) = args.replay {
        if !replay.exists() {
            anyhow::bail!("Recording directory not found: {}", replay.display());
        }
        SourceMode::Replay(replay.clone())
    } else {
        if !args.mock {
            warn!("No --replay directory given, falling back to --mock sources");
        }
        SourceMode::Mock
    };

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        source_mode,
        max_episodes: if args.max_episodes == 0 {
            None
        } else {
            Some(args.max_episodes)
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting conversion pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        episodes_written = stats.episodes_written,
                        frames_synced = stats.frames_synced,
                        ticks_dropped = stats.ticks_dropped,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Conversion completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("bagsync finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::ConversionBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Dataset:");
    println!("  Name: {}", blueprint.dataset.name);
    println!("  Robot: {}", blueprint.dataset.robot_type);

    println!("\nTopics:");
    println!("  Joint states: {}", blueprint.topics.joint_states);
    println!("  Camera: {}", blueprint.topics.camera);

    println!("\nSync Settings:");
    println!("  Output FPS: {}", blueprint.sync.fps);
    println!("  Max offset: {} ms", blueprint.sync.max_offset_ms);
    println!("  Gap threshold: {} s", blueprint.sync.gap_threshold_s);

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
