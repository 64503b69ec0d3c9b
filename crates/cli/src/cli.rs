//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bagsync - rosbag to robot-learning dataset conversion pipeline
#[derive(Parser, Debug)]
#[command(
    name = "bagsync",
    author,
    version,
    about = "Rosbag to robot-learning dataset conversion pipeline",
    long_about = "Converts teleoperation recordings into training-ready datasets.\n\n\
                  Reads joint-state and camera streams from a recording, detects \n\
                  episode boundaries, aligns both streams onto a fixed frame grid, \n\
                  computes action deltas, and dispatches episodes to configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BAGSYNC_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "BAGSYNC_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the conversion pipeline
    Convert(ConvertArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `convert` command
#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "convert.toml", env = "BAGSYNC_CONFIG")]
    pub config: PathBuf,

    /// Replay an exported recording directory instead of live capture
    #[arg(long, env = "BAGSYNC_REPLAY")]
    pub replay: Option<PathBuf>,

    /// Run with synthetic capture sources (no recording required)
    #[arg(long, conflicts_with = "replay")]
    pub mock: bool,

    /// Maximum number of episodes to convert (0 = unlimited)
    #[arg(long, default_value = "0", env = "BAGSYNC_MAX_EPISODES")]
    pub max_episodes: u64,

    /// Validate configuration and exit without running pipeline
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size for internal queues
    #[arg(long, default_value = "1024", env = "BAGSYNC_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "9000", env = "BAGSYNC_METRICS_PORT")]
    pub metrics_port: u16,

    /// Override file-sink output directory from configuration
    #[arg(short, long, env = "BAGSYNC_OUTPUT")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "convert.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "convert.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
