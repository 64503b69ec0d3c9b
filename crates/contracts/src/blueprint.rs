//! ConversionBlueprint - Config Loader 输出
//!
//! 描述完整的转换配置：数据集元信息、话题映射、同步参数、输出路由。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// 完整的转换配置蓝图
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConversionBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// 数据集元信息
    #[validate(nested)]
    pub dataset: DatasetConfig,

    /// 输入话题映射
    #[validate(nested)]
    pub topics: TopicsConfig,

    /// 同步与分段参数
    #[serde(default)]
    #[validate(nested)]
    pub sync: SyncConfig,

    /// 输出路由配置
    #[serde(default)]
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

/// 数据集元信息
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatasetConfig {
    /// 数据集名称 (e.g., "pick_place_demo")
    #[validate(length(min = 1))]
    pub name: String,

    /// 机器人类型标签，写入 manifest
    #[serde(default = "default_robot_type")]
    pub robot_type: String,
}

fn default_robot_type() -> String {
    "unknown".to_string()
}

/// 输入话题映射
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TopicsConfig {
    /// 关节状态话题 (e.g., "/joint_states")
    #[validate(length(min = 1))]
    pub joint_states: String,

    /// 相机图像话题 (e.g., "/camera/color/image_raw")
    #[validate(length(min = 1))]
    pub camera: String,
}

/// 同步与分段参数
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SyncConfig {
    /// 输出帧率 (Hz)，必须 > 0
    #[serde(default = "default_fps")]
    #[validate(range(exclusive_min = 0.0))]
    pub fps: f64,

    /// 最近样本可接受的最大偏移 (毫秒，含边界)
    #[serde(default = "default_max_offset_ms")]
    #[validate(range(exclusive_min = 0.0))]
    pub max_offset_ms: f64,

    /// 切分 episode 的样本间隔阈值 (秒，严格大于才切分)
    #[serde(default = "default_gap_threshold_s")]
    #[validate(range(exclusive_min = 0.0))]
    pub gap_threshold_s: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            max_offset_ms: default_max_offset_ms(),
            gap_threshold_s: default_gap_threshold_s(),
        }
    }
}

fn default_fps() -> f64 {
    30.0
}

/// 约一个 30 fps 帧间隔：关节流几毫秒的节拍误差不会触发丢帧
fn default_max_offset_ms() -> f64 {
    34.0
}

fn default_gap_threshold_s() -> f64 {
    2.0
}

/// Sink 输出配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink 名称
    #[validate(length(min = 1))]
    pub name: String,

    /// Sink 类型
    pub sink_type: SinkType,

    /// 队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 类型特定参数
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    32
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// 仅记录日志
    Log,
    /// 写数据集目录 (PNG 帧 + episode.json + manifest)
    File,
    /// UDP 遥测摘要
    Network,
}
