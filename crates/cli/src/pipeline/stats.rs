//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::ConversionAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total episodes handed to the dispatcher
    pub episodes_written: u64,

    /// Total frames successfully synchronized across all episodes
    pub frames_synced: u64,

    /// Total grid ticks dropped for missing nearby samples
    pub ticks_dropped: u64,

    /// Total samples received from the recording sources
    pub samples_received: u64,

    /// Samples that arrived out of timestamp order
    pub out_of_order: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sinks that received episodes
    pub active_sinks: usize,

    /// Per-episode conversion metrics aggregator
    pub conversion: ConversionAggregator,
}

impl PipelineStats {
    /// Calculate frames per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_synced as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Calculate tick drop rate as percentage
    #[allow(dead_code)]
    pub fn drop_rate(&self) -> f64 {
        let total = self.frames_synced + self.ticks_dropped;
        if total > 0 {
            (self.ticks_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Conversion Statistics                     ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Episodes written: {}", self.episodes_written);
        println!("   ├─ Frames synced: {}", self.frames_synced);
        println!("   ├─ Samples received: {}", self.samples_received);
        println!("   ├─ Throughput: {:.2} frames/s", self.fps());
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.conversion.summary();

        println!("\n📈 Synchronization Metrics");
        println!(
            "   ├─ Ticks dropped: {} ({:.2}%)",
            self.ticks_dropped,
            self.drop_rate()
        );
        println!("   ├─ Out-of-order samples: {}", self.out_of_order);
        println!("   ├─ Episode duration (s): {}", summary.duration_s);
        println!("   ├─ Max joint offset (ms): {}", summary.joint_offset_ms);
        println!("   └─ Max image offset (ms): {}", summary.image_offset_ms);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_calculation() {
        let stats = PipelineStats {
            frames_synced: 300,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((stats.fps() - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_fps_zero_duration() {
        let stats = PipelineStats::default();
        assert_eq!(stats.fps(), 0.0);
    }

    #[test]
    fn test_drop_rate() {
        let stats = PipelineStats {
            frames_synced: 90,
            ticks_dropped: 10,
            ..Default::default()
        };
        assert!((stats.drop_rate() - 10.0).abs() < 1e-10);
    }
}
