//! # Core Error Types
//!
//! All errors that can occur while building core primitives.

use thiserror::Error;

/// Errors raised by core type construction and validation.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// A tier definition violates a payout invariant.
    #[error("invalid tier '{tier}': {reason}")]
    InvalidTier {
        /// Name of the offending tier.
        tier: String,
        /// Which invariant was violated.
        reason: String,
    },

    /// A wildcard pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The raw pattern text.
        pattern: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// A denomination name that matches no known coin.
    #[error("unknown denomination: {0}")]
    UnknownDenomination(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
