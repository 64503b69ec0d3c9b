//! Replay Source - 从导出的 JSONL 录制回放样本
//!
//! 读取离线工具导出的 samples.jsonl + 二进制像素文件，
//! 按原始时间戳回放样本流。

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{
    BagSample, BagSource, ImageSample, JointSample, SampleCallback, TopicId, TopicKind,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Replay 配置
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// 回放速度倍率 (1.0 = 原速)
    pub speed_multiplier: f64,

    /// 是否跳过延时，全速回放
    pub unthrottled: bool,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            speed_multiplier: 1.0,
            unthrottled: false,
        }
    }
}

/// JSONL 中的样本记录
#[derive(Debug, Clone, Deserialize)]
struct SampleRecord {
    topic: String,
    kind: TopicKind,
    timestamp_ns: i64,

    // JointState 字段
    #[serde(default)]
    names: Option<Vec<String>>,
    #[serde(default)]
    position: Option<Vec<f64>>,
    #[serde(default)]
    velocity: Option<Vec<f64>>,

    // Image 字段
    #[serde(default)]
    data_file: Option<String>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Replay Source - 从录制目录回放一个话题
pub struct ReplaySource {
    topic: TopicId,
    kind: TopicKind,
    replay_path: PathBuf,
    records: Vec<SampleRecord>,
    config: ReplayConfig,
    listening: Arc<AtomicBool>,
    thread_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ReplaySource {
    /// 从录制目录加载一个话题的记录
    ///
    /// 只保留 `topic` 的记录并按时间戳排序。
    pub fn load(
        replay_path: &Path,
        topic: &str,
        kind: TopicKind,
        config: ReplayConfig,
    ) -> std::io::Result<Self> {
        let jsonl_path = replay_path.join("samples.jsonl");
        let file = File::open(&jsonl_path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let record: SampleRecord = serde_json::from_str(&line)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

            if record.topic == topic && record.kind == kind {
                records.push(record);
            }
        }

        records.sort_by_key(|r| r.timestamp_ns);

        info!(
            topic = %topic,
            records = records.len(),
            "loaded replay source"
        );

        Ok(Self {
            topic: TopicId::from(topic),
            kind,
            replay_path: replay_path.to_path_buf(),
            records,
            config,
            listening: Arc::new(AtomicBool::new(false)),
            thread_handle: std::sync::Mutex::new(None),
        })
    }

    /// 记录条数
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// 从记录构建样本，读取图像的二进制文件
    fn build_sample(replay_path: &Path, record: &SampleRecord) -> Option<BagSample> {
        match record.kind {
            TopicKind::JointState => {
                let names = record.names.clone()?;
                let position = record.position.clone()?;
                Some(BagSample::Joint(JointSample {
                    timestamp_ns: record.timestamp_ns,
                    names,
                    position,
                    velocity: record.velocity.clone(),
                }))
            }
            TopicKind::Image => {
                let data_file = record.data_file.as_ref()?;
                let data = Self::read_pixel_file(replay_path, data_file)?;
                Some(BagSample::Image(ImageSample {
                    timestamp_ns: record.timestamp_ns,
                    width: record.width.unwrap_or(0),
                    height: record.height.unwrap_or(0),
                    data,
                }))
            }
        }
    }

    fn read_pixel_file(replay_path: &Path, relative_path: &str) -> Option<Bytes> {
        let path = replay_path.join(relative_path);
        match std::fs::read(&path) {
            Ok(data) => Some(Bytes::from(data)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read pixel file");
                None
            }
        }
    }
}

impl BagSource for ReplaySource {
    fn topic(&self) -> &TopicId {
        &self.topic
    }

    fn kind(&self) -> TopicKind {
        self.kind
    }

    fn listen(&self, callback: SampleCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = self.listening.clone();
        let topic = self.topic.to_string();
        let records = self.records.clone();
        let replay_path = self.replay_path.clone();
        let speed = self.config.speed_multiplier.max(0.1);
        let unthrottled = self.config.unthrottled;

        let handle = thread::spawn(move || {
            debug!(topic = %topic, "replay thread started");

            if records.is_empty() {
                warn!(topic = %topic, "no records to replay");
                listening.store(false, Ordering::SeqCst);
                return;
            }

            let start_time = Instant::now();
            let first_timestamp_ns = records[0].timestamp_ns;

            for record in &records {
                if !listening.load(Ordering::Relaxed) {
                    debug!(topic = %topic, "replay stopped");
                    return;
                }

                if !unthrottled {
                    let offset_ns = (record.timestamp_ns - first_timestamp_ns).max(0);
                    let target_elapsed =
                        Duration::from_secs_f64(offset_ns as f64 / 1e9 / speed);
                    let actual_elapsed = start_time.elapsed();

                    if target_elapsed > actual_elapsed {
                        thread::sleep(target_elapsed - actual_elapsed);
                    }
                }

                if let Some(sample) = Self::build_sample(&replay_path, record) {
                    callback(sample);
                }
            }

            info!(topic = %topic, "replay completed");
            listening.store(false, Ordering::SeqCst);
        });

        *self.thread_handle.lock().unwrap() = Some(handle);
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);

        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    fn write_recording(dir: &Path) {
        let mut jsonl = File::create(dir.join("samples.jsonl")).unwrap();
        writeln!(
            jsonl,
            r#"{{"topic":"/joint_states","kind":"joint_state","timestamp_ns":2000000,"names":["j0"],"position":[0.2]}}"#
        )
        .unwrap();
        writeln!(
            jsonl,
            r#"{{"topic":"/joint_states","kind":"joint_state","timestamp_ns":1000000,"names":["j0"],"position":[0.1]}}"#
        )
        .unwrap();
        writeln!(
            jsonl,
            r#"{{"topic":"/camera","kind":"image","timestamp_ns":1500000,"data_file":"frame_0.rgb","width":2,"height":1}}"#
        )
        .unwrap();

        std::fs::write(dir.join("frame_0.rgb"), vec![0u8; 6]).unwrap();
    }

    #[test]
    fn test_load_filters_topic_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        write_recording(dir.path());

        let source = ReplaySource::load(
            dir.path(),
            "/joint_states",
            TopicKind::JointState,
            ReplayConfig::default(),
        )
        .unwrap();

        assert_eq!(source.record_count(), 2);
        assert_eq!(source.records[0].timestamp_ns, 1_000_000);
        assert_eq!(source.records[1].timestamp_ns, 2_000_000);
    }

    #[test]
    fn test_replay_emits_samples() {
        let dir = tempfile::tempdir().unwrap();
        write_recording(dir.path());

        let source = ReplaySource::load(
            dir.path(),
            "/camera",
            TopicKind::Image,
            ReplayConfig {
                unthrottled: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(source.record_count(), 1);

        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink = collected.clone();
        source.listen(Arc::new(move |sample| {
            sink.lock().unwrap().push(sample);
        }));
        // The thread clears the flag once all records are emitted.
        while source.is_listening() {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        source.stop();

        let samples = collected.lock().unwrap();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].validate().is_ok());
        match &samples[0] {
            BagSample::Image(img) => assert_eq!(img.width, 2),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_recording_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ReplaySource::load(
            dir.path(),
            "/joint_states",
            TopicKind::JointState,
            ReplayConfig::default(),
        );
        assert!(result.is_err());
    }
}
