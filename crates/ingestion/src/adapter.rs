//! 话题适配器 trait

use std::sync::Arc;

use async_channel::{SendError, Sender};
use contracts::{BagSample, TopicId, TopicKind};
use tracing::trace;

use crate::config::IngestionMetrics;

/// 话题适配器 trait
///
/// 为每个录制话题实现此 trait，负责：
/// 1. 注册数据源回调
/// 2. 封装为 `BagSample`
/// 3. 发送到通道（处理背压）
pub trait TopicAdapter: Send + Sync {
    /// 获取话题 ID
    fn topic(&self) -> &TopicId;

    /// 获取样本类别
    fn kind(&self) -> TopicKind;

    /// 启动样本采集
    ///
    /// # Arguments
    /// * `tx` - 样本发送通道
    /// * `metrics` - 共享的 ingestion 指标
    fn start(&self, tx: Sender<BagSample>, metrics: Arc<IngestionMetrics>);

    /// 停止样本采集
    fn stop(&self);

    /// 检查适配器是否正在监听
    fn is_listening(&self) -> bool;
}

/// Send sample, blocking the source thread while the channel is full
///
/// Sources replay a finite recording from dedicated threads, so a full
/// channel applies backpressure to the producer instead of losing samples.
/// Returns false when the channel is closed (the drain has gone away).
#[inline]
pub fn send_sample(
    tx: &Sender<BagSample>,
    sample: BagSample,
    metrics: &Arc<IngestionMetrics>,
    topic: &str,
) -> bool {
    match tx.send_blocking(sample) {
        Ok(()) => {
            trace!(topic = %topic, "sample sent");
            true
        }
        Err(SendError(_)) => {
            metrics.record_dropped();
            tracing::warn!(topic = %topic, "channel closed, sample lost");
            false
        }
    }
}
