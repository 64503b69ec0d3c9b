//! 通用话题适配器
//!
//! 基于 `BagSource` trait 的统一适配器实现。
//! 允许 IngestionPipeline 以统一方式处理 Mock 和 Replay 数据源。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use contracts::{BagSample, BagSource, SampleCallback, TopicId, TopicKind};
use tracing::{debug, trace};

use crate::adapter::{send_sample, TopicAdapter};
use crate::config::{BackpressureConfig, IngestionMetrics};

/// 通用话题适配器
///
/// 将 `BagSource` trait 适配为 `TopicAdapter`。
/// 这是连接数据源与 ingestion 的桥梁。
pub struct GenericTopicAdapter {
    source: Box<dyn BagSource>,
    config: BackpressureConfig,
    listening: Arc<AtomicBool>,
}

impl GenericTopicAdapter {
    /// 创建新的通用适配器
    pub fn new(source: Box<dyn BagSource>, config: BackpressureConfig) -> Self {
        Self {
            source,
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl TopicAdapter for GenericTopicAdapter {
    fn topic(&self) -> &TopicId {
        self.source.topic()
    }

    fn kind(&self) -> TopicKind {
        self.source.kind()
    }

    fn start(&self, tx: Sender<BagSample>, metrics: Arc<IngestionMetrics>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let topic = self.source.topic().to_string();
        let listening = self.listening.clone();

        debug!(topic = %topic, "starting generic adapter");

        let callback: SampleCallback = Arc::new(move |sample| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_received();
            trace!(topic = %topic, "generic adapter received sample");
            if !send_sample(&tx, sample, &metrics, &topic) {
                // Drain is gone, no point forwarding the rest
                listening.store(false, Ordering::SeqCst);
            }
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(topic = %self.source.topic(), "stopping generic adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
