//! # Reward Error Types
//!
//! Errors here only occur at configuration time. Once a pipeline is
//! built, nothing in the grant path returns an error - bad input degrades
//! to a skipped reward.

use thiserror::Error;

use coinward_core::CoreError;

/// Errors raised while loading or validating reward configuration.
#[derive(Error, Debug)]
pub enum RewardsError {
    /// A config value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A tier or pattern failed core validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for reward configuration operations.
pub type RewardsResult<T> = Result<T, RewardsError>;
