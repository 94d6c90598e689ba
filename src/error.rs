//! Error taxonomy shared by every stage of a render pass.

use crate::data_types::Key;

/// Failure reported by a caller-supplied accessor.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AccessorError {
    pub message: String,
}

impl AccessorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One handler failure collected while delivering an event.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerFailure {
    pub subscription: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChartError {
    /// Missing accessor, canvas or lifecycle step. Nothing is rendered.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Two records of one dataset resolve to the same key. The previous
    /// render stays on screen.
    #[error("duplicate key {key} at positions {first} and {second}")]
    DuplicateKey { key: Key, first: usize, second: usize },

    /// Empty categories or zero-length data. Charts recover by showing a
    /// placeholder.
    #[error("degenerate domain: {0}")]
    DegenerateDomain(String),

    /// A caller accessor failed for one element; that element is skipped.
    #[error("accessor `{role}` failed for record {index}: {source}")]
    Accessor {
        role: &'static str,
        index: usize,
        #[source]
        source: AccessorError,
    },

    /// One or more handlers failed while a topic was being published.
    #[error("{} handler(s) failed on topic `{topic}`", failures.len())]
    Relay {
        topic: String,
        failures: Vec<HandlerFailure>,
    },
}

impl ChartError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateDomain(message.into())
    }

    /// Errors that a chart absorbs instead of aborting the pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::DegenerateDomain(_) | Self::Accessor { .. })
    }
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;
