//! LogSink - logs episode summary via tracing

use contracts::{ContractError, DatasetSink, EpisodeRecord};
use tracing::{info, instrument};

/// Sink that logs episode summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_episode_summary(&self, episode: &EpisodeRecord) {
        info!(
            sink = %self.name,
            episode_index = episode.episode_index,
            frames = episode.frames.len(),
            fps = episode.fps,
            duration_s = episode.duration_s(),
            "EpisodeRecord received"
        );
    }
}

impl DatasetSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, episode),
        fields(sink = %self.name, episode_index = episode.episode_index)
    )]
    async fn write(&mut self, episode: &EpisodeRecord) -> Result<(), ContractError> {
        self.log_episode_summary(episode);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let episode = EpisodeRecord {
            episode_index: 0,
            fps: 30.0,
            frames: Vec::new(),
        };

        let result = sink.write(&episode).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
