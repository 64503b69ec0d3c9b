//! Layered error definitions
//!
//! Categorized by source: config / sample invariants / bag reading / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Caller Errors =====
    /// Sample or state-sequence invariant violated by the caller
    #[error("invariant violation in {subject}: {message}")]
    Invariant { subject: String, message: String },

    /// Operation received an empty input that it cannot interpret
    #[error("{operation} requires a non-empty input")]
    EmptyInput { operation: String },

    /// Invalid argument value (non-positive rate, threshold, ...)
    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    // ===== Bag Reading Errors =====
    /// Capture record decode error
    #[error("bag read error on topic '{topic}': {message}")]
    BagRead { topic: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invariant violation error
    pub fn invariant(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invariant {
            subject: subject.into(),
            message: message.into(),
        }
    }

    /// Create empty input error
    pub fn empty_input(operation: impl Into<String>) -> Self {
        Self::EmptyInput {
            operation: operation.into(),
        }
    }

    /// Create invalid argument error
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create bag read error
    pub fn bag_read(topic: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BagRead {
            topic: topic.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
