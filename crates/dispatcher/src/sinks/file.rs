//! DatasetFileSink - writes episodes to disk with folder structure

use contracts::{ContractError, DatasetSink, EpisodeRecord, ImageSample};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;
use tracing::{debug, error, instrument};

/// Configuration for DatasetFileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self { base_path }
    }
}

/// One row of episode.json: pixels live next door as PNG files
#[derive(Debug, Serialize)]
struct FrameRowEntry<'a> {
    frame_index: u64,
    timestamp_s: f64,
    state: &'a [f64],
    action: &'a [f64],
    image_file: String,
}

/// Episode-level metadata written alongside the rows
#[derive(Debug, Serialize)]
struct EpisodeManifest {
    episode_index: u64,
    fps: f64,
    frame_count: usize,
    duration_s: f64,
}

/// Run-level manifest written on close
#[derive(Debug, Serialize)]
struct RunManifest {
    created_at: String,
    episode_count: u64,
    total_frames: u64,
}

/// Sink that writes episodes to disk as per-episode directories
///
/// Layout:
/// ```text
/// base_path/
///   manifest.json
///   episode_000000/
///     episode.json
///     frames/frame_000000.png
/// ```
pub struct DatasetFileSink {
    name: String,
    config: FileSinkConfig,
    episodes_written: u64,
    frames_written: u64,
}

impl DatasetFileSink {
    /// Create a new DatasetFileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        // Create base directory if it doesn't exist
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            episodes_written: 0,
            frames_written: 0,
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        let config = FileSinkConfig::from_params(params);
        Self::new(name, config)
    }

    fn write_episode_to_disk(&mut self, episode: &EpisodeRecord) -> std::io::Result<()> {
        let episode_dir = self
            .config
            .base_path
            .join(format!("episode_{:06}", episode.episode_index));
        let frames_dir = episode_dir.join("frames");
        fs::create_dir_all(&frames_dir)?;

        // 1. Write camera frames
        let mut rows = Vec::with_capacity(episode.frames.len());
        for row in &episode.frames {
            let image_file = format!("frames/frame_{:06}.png", row.frame_index);
            self.save_image(frames_dir.join(format!("frame_{:06}.png", row.frame_index)), &row.image)?;

            rows.push(FrameRowEntry {
                frame_index: row.frame_index,
                timestamp_s: row.timestamp_s,
                state: &row.state,
                action: &row.action,
                image_file,
            });
        }

        // 2. Write episode rows
        let rows_file = File::create(episode_dir.join("episode.json"))?;
        serde_json::to_writer(rows_file, &rows)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        // 3. Write episode metadata
        let meta = EpisodeManifest {
            episode_index: episode.episode_index,
            fps: episode.fps,
            frame_count: episode.frames.len(),
            duration_s: episode.duration_s(),
        };
        let meta_file = File::create(episode_dir.join("meta.json"))?;
        serde_json::to_writer_pretty(meta_file, &meta)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        self.episodes_written += 1;
        self.frames_written += episode.frames.len() as u64;

        Ok(())
    }

    fn save_image(&self, path: PathBuf, sample: &ImageSample) -> std::io::Result<()> {
        image::save_buffer(
            path,
            &sample.data,
            sample.width,
            sample.height,
            image::ColorType::Rgb8,
        )
        .map_err(std::io::Error::other)
    }

    fn write_run_manifest(&self) -> std::io::Result<()> {
        let manifest = RunManifest {
            created_at: chrono::Utc::now().to_rfc3339(),
            episode_count: self.episodes_written,
            total_frames: self.frames_written,
        };
        let file = File::create(self.config.base_path.join("manifest.json"))?;
        serde_json::to_writer_pretty(file, &manifest)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    fn persist_episode(&mut self, episode: &EpisodeRecord) -> Result<(), ContractError> {
        self.write_episode_to_disk(episode).map_err(|e| {
            error!(
                sink = %self.name,
                episode_index = episode.episode_index,
                error = %e,
                "Write failed"
            );
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

impl DatasetSink for DatasetFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, episode),
        fields(sink = %self.name, episode_index = episode.episode_index)
    )]
    async fn write(&mut self, episode: &EpisodeRecord) -> Result<(), ContractError> {
        self.persist_episode(episode)?;
        Ok(())
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.write_run_manifest()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
        debug!(
            sink = %self.name,
            episodes = self.episodes_written,
            "DatasetFileSink closed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::FrameRow;
    use tempfile::tempdir;

    fn episode_with_frames(index: u64, count: u64) -> EpisodeRecord {
        let frames = (0..count)
            .map(|i| FrameRow {
                frame_index: i,
                timestamp_s: i as f64 / 30.0,
                state: vec![0.1, 0.2],
                action: vec![0.0, 0.0],
                image: ImageSample {
                    timestamp_ns: i as i64 * 33_333_333,
                    width: 4,
                    height: 2,
                    data: Bytes::from(vec![200u8; 24]),
                },
            })
            .collect();

        EpisodeRecord {
            episode_index: index,
            fps: 30.0,
            frames,
        }
    }

    #[tokio::test]
    async fn test_file_sink_writes_episode_layout() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        let mut sink = DatasetFileSink::new("test_file", config).unwrap();
        sink.write(&episode_with_frames(0, 3)).await.unwrap();
        sink.flush().await.unwrap();
        sink.close().await.unwrap();

        let episode_dir = dir.path().join("episode_000000");
        assert!(episode_dir.join("episode.json").exists());
        assert!(episode_dir.join("meta.json").exists());
        assert!(episode_dir.join("frames/frame_000002.png").exists());
        assert!(dir.path().join("manifest.json").exists());
    }

    #[tokio::test]
    async fn test_file_sink_rows_reference_images() {
        let dir = tempdir().unwrap();
        let config = FileSinkConfig {
            base_path: dir.path().to_path_buf(),
        };

        let mut sink = DatasetFileSink::new("test_file", config).unwrap();
        sink.write(&episode_with_frames(1, 2)).await.unwrap();

        let rows_path = dir.path().join("episode_000001/episode.json");
        let rows: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(rows_path).unwrap()).unwrap();

        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["image_file"], "frames/frame_000000.png");
        assert_eq!(rows[1]["frame_index"], 1);
    }
}
