//! DatasetSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for episode consumers.

use crate::{ContractError, EpisodeRecord};

/// Dataset output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(DatasetSink: Send)]
pub trait LocalDatasetSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one converted episode
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, episode: &EpisodeRecord) -> Result<(), ContractError>;

    /// Flush buffered output (if any)
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), ContractError>;
}
