//! BagSample - Ingestion 输出
//!
//! 从 rosbag 录制解码出的原始样本结构。

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// 样本类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicKind {
    /// 关节状态 (高频遥测)
    JointState,
    /// 相机帧 (低频图像)
    Image,
}

/// 一条关节状态读数
///
/// 构造后不可变；长度不变量由 `validate` 检查。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointSample {
    /// 录制单调时钟时间戳 (纳秒)
    pub timestamp_ns: i64,

    /// 关节名称，有序，长度 = 自由度
    pub names: Vec<String>,

    /// 关节角度 (弧度)，与 `names` 同序同长
    pub position: Vec<f64>,

    /// 关节速度，可缺省；存在时与 `names` 同长
    pub velocity: Option<Vec<f64>>,
}

impl JointSample {
    /// Degrees of freedom of this reading.
    #[inline]
    pub fn dof(&self) -> usize {
        self.names.len()
    }

    /// Timestamp in seconds.
    #[inline]
    pub fn time_s(&self) -> f64 {
        self.timestamp_ns as f64 / 1e9
    }

    /// Check the length invariants.
    ///
    /// # Errors
    /// `ContractError::Invariant` naming the violated field.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.position.len() != self.names.len() {
            return Err(ContractError::invariant(
                "JointSample.position",
                format!(
                    "position has {} entries but names has {}",
                    self.position.len(),
                    self.names.len()
                ),
            ));
        }
        if let Some(velocity) = &self.velocity {
            if velocity.len() != self.names.len() {
                return Err(ContractError::invariant(
                    "JointSample.velocity",
                    format!(
                        "velocity has {} entries but names has {}",
                        velocity.len(),
                        self.names.len()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// 一帧解码后的相机图像
///
/// 像素为行优先 RGB8；`data` 使用 `Bytes`，克隆为引用计数，不复制像素。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// 录制单调时钟时间戳 (纳秒)
    pub timestamp_ns: i64,

    /// 图像宽度
    pub width: u32,

    /// 图像高度
    pub height: u32,

    /// 像素数据，长度 = width * height * 3
    pub data: Bytes,
}

impl ImageSample {
    /// Timestamp in seconds.
    #[inline]
    pub fn time_s(&self) -> f64 {
        self.timestamp_ns as f64 / 1e9
    }

    /// Check the shape invariant.
    ///
    /// # Errors
    /// `ContractError::Invariant` when `data.len() != width * height * 3`.
    pub fn validate(&self) -> Result<(), ContractError> {
        let expected = self.width as usize * self.height as usize * 3;
        if self.data.len() != expected {
            return Err(ContractError::invariant(
                "ImageSample.data",
                format!(
                    "{}x{} rgb8 frame needs {} bytes, got {}",
                    self.width,
                    self.height,
                    expected,
                    self.data.len()
                ),
            ));
        }
        Ok(())
    }
}

/// 样本载荷：来自任一话题的一条记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BagSample {
    /// 关节状态样本
    Joint(JointSample),

    /// 图像样本
    Image(ImageSample),
}

impl BagSample {
    /// Timestamp of the contained sample (nanoseconds).
    #[inline]
    pub fn timestamp_ns(&self) -> i64 {
        match self {
            BagSample::Joint(s) => s.timestamp_ns,
            BagSample::Image(s) => s.timestamp_ns,
        }
    }

    /// Kind of the contained sample.
    #[inline]
    pub fn kind(&self) -> TopicKind {
        match self {
            BagSample::Joint(_) => TopicKind::JointState,
            BagSample::Image(_) => TopicKind::Image,
        }
    }

    /// Validate the contained sample's invariants.
    pub fn validate(&self) -> Result<(), ContractError> {
        match self {
            BagSample::Joint(s) => s.validate(),
            BagSample::Image(s) => s.validate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(names: usize, positions: usize) -> JointSample {
        JointSample {
            timestamp_ns: 0,
            names: (0..names).map(|i| format!("joint_{i}")).collect(),
            position: vec![0.0; positions],
            velocity: None,
        }
    }

    #[test]
    fn test_joint_sample_valid() {
        assert!(joint(6, 6).validate().is_ok());
    }

    #[test]
    fn test_joint_sample_position_mismatch() {
        let err = joint(6, 5).validate().unwrap_err();
        assert!(matches!(err, ContractError::Invariant { .. }));
        assert!(err.to_string().contains("position"));
    }

    #[test]
    fn test_joint_sample_velocity_mismatch() {
        let mut sample = joint(6, 6);
        sample.velocity = Some(vec![0.0; 4]);
        let err = sample.validate().unwrap_err();
        assert!(err.to_string().contains("velocity"));
    }

    #[test]
    fn test_image_sample_shape() {
        let ok = ImageSample {
            timestamp_ns: 0,
            width: 4,
            height: 2,
            data: Bytes::from(vec![0u8; 24]),
        };
        assert!(ok.validate().is_ok());

        let bad = ImageSample {
            timestamp_ns: 0,
            width: 4,
            height: 2,
            data: Bytes::from(vec![0u8; 20]),
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_bag_sample_accessors() {
        let sample = BagSample::Joint(JointSample {
            timestamp_ns: 42,
            names: vec!["a".into()],
            position: vec![1.0],
            velocity: None,
        });
        assert_eq!(sample.timestamp_ns(), 42);
        assert_eq!(sample.kind(), TopicKind::JointState);
    }
}
