//! Mock 采集数据源
//!
//! 用于无真实录制文件的测试，生成确定性的合成样本。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use contracts::{BagSample, BagSource, ImageSample, JointSample, SampleCallback, TopicId, TopicKind};
use tracing::debug;

/// Mock 数据源配置
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// 话题名
    pub topic: String,

    /// 样本类别
    pub kind: TopicKind,

    /// 采样频率 (Hz)
    pub frequency_hz: f64,

    /// 生成的样本总数
    pub sample_count: u64,

    /// 起始时间戳（纳秒）
    pub start_ns: i64,

    /// 在此索引后插入的静默间隙（纳秒），0 表示无间隙
    pub gap_after: Option<(u64, i64)>,

    /// 图像宽度（仅 Image）
    pub image_width: u32,

    /// 图像高度（仅 Image）
    pub image_height: u32,

    /// 自由度（仅 JointState）
    pub dof: usize,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            topic: "/joint_states".to_string(),
            kind: TopicKind::JointState,
            frequency_hz: 100.0,
            sample_count: 100,
            start_ns: 0,
            gap_after: None,
            image_width: 64,
            image_height: 48,
            dof: 6,
        }
    }
}

/// Mock 采集数据源
///
/// 按固定频率生成一批样本后自行停止。样本内容是时间戳的确定性函数，
/// 便于断言同步结果。
pub struct MockCaptureSource {
    topic: TopicId,
    config: MockSourceConfig,
    running: Arc<AtomicBool>,
}

impl MockCaptureSource {
    /// 创建新的 Mock 源
    pub fn new(config: MockSourceConfig) -> Self {
        Self {
            topic: TopicId::from(config.topic.as_str()),
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 创建关节状态源
    pub fn joint_states(topic: &str, frequency_hz: f64, sample_count: u64) -> Self {
        Self::new(MockSourceConfig {
            topic: topic.to_string(),
            kind: TopicKind::JointState,
            frequency_hz,
            sample_count,
            ..Default::default()
        })
    }

    /// 创建相机源
    pub fn camera(
        topic: &str,
        frequency_hz: f64,
        sample_count: u64,
        width: u32,
        height: u32,
    ) -> Self {
        Self::new(MockSourceConfig {
            topic: topic.to_string(),
            kind: TopicKind::Image,
            frequency_hz,
            sample_count,
            image_width: width,
            image_height: height,
            ..Default::default()
        })
    }

    /// 在第 `after` 个样本后插入 `gap_ns` 纳秒的静默间隙
    ///
    /// 用于构造多段录制，测试分段检测。
    pub fn with_gap(mut self, after: u64, gap_ns: i64) -> Self {
        self.config.gap_after = Some((after, gap_ns));
        self
    }

    fn sample_at(config: &MockSourceConfig, index: u64) -> BagSample {
        let step_ns = (1e9 / config.frequency_hz).round() as i64;
        let mut timestamp_ns = config.start_ns + index as i64 * step_ns;

        if let Some((after, gap_ns)) = config.gap_after {
            if index >= after {
                timestamp_ns += gap_ns;
            }
        }

        match config.kind {
            TopicKind::JointState => {
                let t = timestamp_ns as f64 / 1e9;
                BagSample::Joint(JointSample {
                    timestamp_ns,
                    names: (0..config.dof).map(|i| format!("joint_{i}")).collect(),
                    position: (0..config.dof)
                        .map(|i| (t + i as f64 * 0.1).sin())
                        .collect(),
                    velocity: None,
                })
            }
            TopicKind::Image => {
                let size = config.image_width as usize * config.image_height as usize * 3;
                BagSample::Image(ImageSample {
                    timestamp_ns,
                    width: config.image_width,
                    height: config.image_height,
                    data: Bytes::from(vec![(index % 256) as u8; size]),
                })
            }
        }
    }
}

impl BagSource for MockCaptureSource {
    fn topic(&self) -> &TopicId {
        &self.topic
    }

    fn kind(&self) -> TopicKind {
        self.config.kind
    }

    fn listen(&self, callback: SampleCallback) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let running = self.running.clone();

        std::thread::spawn(move || {
            debug!(
                topic = %config.topic,
                kind = ?config.kind,
                frequency_hz = config.frequency_hz,
                count = config.sample_count,
                "mock capture source started"
            );

            for index in 0..config.sample_count {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                callback(Self::sample_at(&config, index));
            }

            running.store(false, Ordering::SeqCst);
            debug!(topic = %config.topic, "mock capture source finished");
        });
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    fn drain(source: &MockCaptureSource) -> Vec<BagSample> {
        let collected = Arc::new(Mutex::new(Vec::new()));
        let sink = collected.clone();

        source.listen(Arc::new(move |sample| {
            sink.lock().unwrap().push(sample);
        }));

        // Generation is not rate limited, a short wait suffices.
        for _ in 0..50 {
            if !source.is_listening() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        std::thread::sleep(Duration::from_millis(20));
        let samples = collected.lock().unwrap().clone();
        samples
    }

    #[test]
    fn test_joint_source_emits_exact_count() {
        let source = MockCaptureSource::joint_states("/joint_states", 100.0, 50);
        let samples = drain(&source);

        assert_eq!(samples.len(), 50);
        assert_eq!(samples[0].kind(), TopicKind::JointState);
        // 100 Hz grid, 10 ms apart
        assert_eq!(samples[1].timestamp_ns() - samples[0].timestamp_ns(), 10_000_000);
    }

    #[test]
    fn test_camera_source_shape_is_valid() {
        let source = MockCaptureSource::camera("/camera", 30.0, 5, 32, 24);
        let samples = drain(&source);

        assert_eq!(samples.len(), 5);
        for sample in &samples {
            assert!(sample.validate().is_ok());
        }
    }

    #[test]
    fn test_gap_shifts_tail_timestamps() {
        let source =
            MockCaptureSource::joint_states("/joint_states", 100.0, 10).with_gap(5, 3_000_000_000);
        let samples = drain(&source);

        let gap = samples[5].timestamp_ns() - samples[4].timestamp_ns();
        assert_eq!(gap, 3_000_000_000 + 10_000_000);
    }
}
