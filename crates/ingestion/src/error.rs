//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 样本解码失败
    #[error("failed to decode sample on {topic}: {message}")]
    DecodeFailed {
        /// 话题名
        topic: String,
        /// 错误消息
        message: String,
    },

    /// 通道已关闭
    #[error("channel closed for topic {topic}")]
    ChannelClosed {
        /// 话题名
        topic: String,
    },

    /// 数据源已在监听
    #[error("source for {topic} is already listening")]
    AlreadyListening {
        /// 话题名
        topic: String,
    },

    /// 数据源未在监听
    #[error("source for {topic} is not listening")]
    NotListening {
        /// 话题名
        topic: String,
    },
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
