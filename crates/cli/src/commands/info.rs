//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    dataset: DatasetInfo,
    topics: TopicsInfo,
    sync_settings: SyncInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct DatasetInfo {
    name: String,
    robot_type: String,
}

#[derive(Serialize)]
struct TopicsInfo {
    joint_states: String,
    camera: String,
}

#[derive(Serialize)]
struct SyncInfo {
    fps: f64,
    max_offset_ms: f64,
    gap_threshold_s: f64,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::ConversionBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        dataset: DatasetInfo {
            name: blueprint.dataset.name.clone(),
            robot_type: blueprint.dataset.robot_type.clone(),
        },
        topics: TopicsInfo {
            joint_states: blueprint.topics.joint_states.clone(),
            camera: blueprint.topics.camera.clone(),
        },
        sync_settings: SyncInfo {
            fps: blueprint.sync.fps,
            max_offset_ms: blueprint.sync.max_offset_ms,
            gap_threshold_s: blueprint.sync.gap_threshold_s,
        },
        sinks,
    }
}

fn print_config_info(blueprint: &contracts::ConversionBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Bagsync Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Dataset info
    println!("📦 Dataset");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Name: {}", blueprint.dataset.name);
    println!("   └─ Robot: {}", blueprint.dataset.robot_type);

    // Topics
    println!("\n🤖 Topics");
    println!("   ├─ Joint states: {}", blueprint.topics.joint_states);
    println!("   └─ Camera: {}", blueprint.topics.camera);

    // Sync Settings
    let sync = &blueprint.sync;
    println!("\n⚙️  Sync Settings");
    println!("   ├─ Output FPS: {}", sync.fps);
    println!("   ├─ Max offset: {} ms", sync.max_offset_ms);
    println!("   └─ Gap threshold: {} s", sync.gap_threshold_s);

    // Sinks
    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!(
                    "   {} {} ({:?}, queue {})",
                    prefix, sink.name, sink.sink_type, sink.queue_capacity
                );
            } else {
                println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            }
        }
    }

    println!();
}
