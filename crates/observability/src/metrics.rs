//! 转换运行指标收集模块
//!
//! 基于 SynchronizationResult 收集和统计转换过程的运行指标。

use contracts::SynchronizationResult;
use metrics::{counter, gauge, histogram};

/// 从同步结果记录指标
///
/// 每完成一个分段的同步后调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_conversion_metrics;
///
/// let result = synchronize(&joints, &images, fps, max_offset_ms)?;
/// record_conversion_metrics(&result, episode_index);
/// ```
pub fn record_conversion_metrics(result: &SynchronizationResult, episode_index: u64) {
    // 分段计数器
    counter!("bagsync_episodes_synced_total").increment(1);

    // 分段序号 (用于检测遗漏)
    gauge!("bagsync_last_episode_index").set(episode_index as f64);

    // 保留帧数与丢弃刻数
    counter!("bagsync_frames_total").increment(result.frame_count() as u64);
    if result.ticks_dropped > 0 {
        counter!("bagsync_ticks_dropped_total").increment(result.ticks_dropped);
    }
    gauge!("bagsync_ticks_dropped_current").set(result.ticks_dropped as f64);

    // 分段时长
    histogram!("bagsync_episode_duration_s").record(result.duration_s);

    // 最大时间偏移
    histogram!("bagsync_max_joint_offset_ms").record(result.max_joint_offset_ms);
    histogram!("bagsync_max_image_offset_ms").record(result.max_image_offset_ms);
}

/// 记录样本接收
pub fn record_sample_received(topic: &str, kind: &str) {
    counter!(
        "bagsync_samples_received_total",
        "topic" => topic.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// 记录分段分发
pub fn record_episode_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "bagsync_episodes_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 转换指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct ConversionAggregator {
    /// 已同步分段数
    pub total_episodes: u64,

    /// 保留帧总数
    pub total_frames: u64,

    /// 丢弃刻总数
    pub total_ticks_dropped: u64,

    /// 分段时长统计 (秒)
    pub duration_stats: RunningStats,

    /// 每分段最大关节偏移统计 (毫秒)
    pub joint_offset_stats: RunningStats,

    /// 每分段最大图像偏移统计 (毫秒)
    pub image_offset_stats: RunningStats,
}

impl ConversionAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, result: &SynchronizationResult) {
        self.total_episodes += 1;
        self.total_frames += result.frame_count() as u64;
        self.total_ticks_dropped += result.ticks_dropped;

        self.duration_stats.push(result.duration_s);

        if !result.is_empty() {
            self.joint_offset_stats.push(result.max_joint_offset_ms);
            self.image_offset_stats.push(result.max_image_offset_ms);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> ConversionSummary {
        let attempted = self.total_frames + self.total_ticks_dropped;
        ConversionSummary {
            total_episodes: self.total_episodes,
            total_frames: self.total_frames,
            total_ticks_dropped: self.total_ticks_dropped,
            drop_rate: if attempted > 0 {
                self.total_ticks_dropped as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            duration_s: StatsSummary::from(&self.duration_stats),
            joint_offset_ms: StatsSummary::from(&self.joint_offset_stats),
            image_offset_ms: StatsSummary::from(&self.image_offset_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct ConversionSummary {
    pub total_episodes: u64,
    pub total_frames: u64,
    pub total_ticks_dropped: u64,
    pub drop_rate: f64,
    pub duration_s: StatsSummary,
    pub joint_offset_ms: StatsSummary,
    pub image_offset_ms: StatsSummary,
}

impl std::fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Conversion Summary ===")?;
        writeln!(f, "Episodes: {}", self.total_episodes)?;
        writeln!(f, "Frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Ticks dropped: {} ({:.2}%)",
            self.total_ticks_dropped, self.drop_rate
        )?;
        writeln!(f, "Episode duration (s): {}", self.duration_s)?;
        writeln!(f, "Max joint offset (ms): {}", self.joint_offset_ms)?;
        writeln!(f, "Max image offset (ms): {}", self.image_offset_ms)?;

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
