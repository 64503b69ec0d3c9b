//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{BagSample, BagSource, TopicId};
use tracing::{debug, info, instrument};

use crate::adapter::TopicAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::generic_adapter::GenericTopicAdapter;

/// Ingestion Pipeline
///
/// Manages one adapter per recorded topic, provides a unified sample stream.
/// Mock, replay and real decoders register through the same interface.
pub struct IngestionPipeline {
    /// Registered adapters
    adapters: HashMap<TopicId, Box<dyn TopicAdapter>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Sample sender (cloned into adapters on start, dropped by `close_input`)
    tx: Option<Sender<BagSample>>,

    /// Sample receiver
    rx: Option<Receiver<BagSample>>,

    /// Default backpressure configuration
    default_config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - Channel capacity
    pub fn new(channel_capacity: usize) -> Self {
        let (tx, rx) = bounded(channel_capacity);

        Self {
            adapters: HashMap::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx: Some(tx),
            rx: Some(rx),
            default_config: BackpressureConfig { channel_capacity },
        }
    }

    /// Create with custom backpressure configuration
    pub fn with_config(config: BackpressureConfig) -> Self {
        let (tx, rx) = bounded(config.channel_capacity);

        Self {
            adapters: HashMap::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx: Some(tx),
            rx: Some(rx),
            default_config: config,
        }
    }

    /// Register a sample source for one topic
    ///
    /// # Arguments
    /// * `source` - Data source implementing `BagSource`
    /// * `config` - Optional backpressure configuration
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source, config),
        fields(topic = %source.topic())
    )]
    pub fn register_source(
        &mut self,
        source: Box<dyn BagSource>,
        config: Option<BackpressureConfig>,
    ) {
        let topic = source.topic().clone();
        let adapter = GenericTopicAdapter::new(
            source,
            config.unwrap_or_else(|| self.default_config.clone()),
        );
        debug!(topic = %topic, "registered sample source");
        self.adapters.insert(topic, Box::new(adapter));
    }

    /// Start all registered sources
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all topic adapters");
        for (topic, adapter) in &self.adapters {
            self.start_adapter(topic, adapter.as_ref());
        }
    }

    /// Stop all sources
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all topic adapters");
        for (topic, adapter) in &self.adapters {
            self.stop_adapter(topic, adapter.as_ref());
        }
    }

    fn start_adapter(&self, topic: &TopicId, adapter: &dyn TopicAdapter) {
        let Some(tx) = &self.tx else {
            debug!(topic = %topic, "input already closed, not starting adapter");
            return;
        };
        if !adapter.is_listening() {
            debug!(topic = %topic, "starting adapter");
            adapter.start(tx.clone(), self.metrics.clone());
        }
    }

    fn stop_adapter(&self, topic: &TopicId, adapter: &dyn TopicAdapter) {
        if adapter.is_listening() {
            debug!(topic = %topic, "stopping adapter");
            adapter.stop();
        }
    }

    /// Get sample stream receiver
    ///
    /// Note: Can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<BagSample>> {
        self.rx.take()
    }

    /// Drop the pipeline's own sender
    ///
    /// Call after `start_all`. The channel then closes once every adapter
    /// finishes, which lets a draining receiver terminate instead of waiting
    /// forever. No further adapters can be started afterwards.
    pub fn close_input(&mut self) {
        self.tx = None;
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered topic count
    pub fn topic_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check if specified topic is listening
    pub fn is_topic_listening(&self, topic: &str) -> bool {
        self.adapters
            .get(topic)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
