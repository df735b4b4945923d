//! Error type shared by every part of the pipeline.

use thiserror::Error;

/// Errors raised while configuring or wiring a pipeline.
///
/// All of these are configuration errors: they surface at construction or
/// design time and are never retried. The processing itself is infallible
/// once a block has been built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A parameter is out of its valid range (sample rate, duration,
    /// cutoff versus Nyquist, band edges, filter order, deviation).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A predecessor or block does not fit the receiving block's timeline.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// A block index lookup fell outside the pipeline.
    #[error("no block at index {index} (pipeline has {len} blocks)")]
    NoSuchBlock { index: usize, len: usize },

    /// A declarative pipeline description could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Error::TypeMismatch(message.into())
    }
}
