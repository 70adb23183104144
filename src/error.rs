//! Error types.
//!
//! The optimizer has exactly one fatal runtime condition
//! ([`AcoError::NoServerAvailable`]). Everything else surfaced here is
//! rejected input: invalid configuration or malformed records.

use thiserror::Error;

/// Result alias for optimizer operations.
pub type Result<T> = std::result::Result<T, AcoError>;

/// Errors raised by the optimizer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AcoError {
    /// No `Running` server could take the city and no `Down` server exists
    /// to bring up. The run aborts immediately.
    #[error("no server available to activate while assigning city {city}")]
    NoServerAvailable {
        /// Index of the city being assigned when the condition was hit.
        city: usize,
    },

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An input record failed validation.
    #[error("invalid record: {0}")]
    Model(#[from] ModelError),
}

/// Validation errors for city and server records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("latitude must be in [-90, 90], got {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude must be in [-180, 180], got {0}")]
    LongitudeOutOfRange(f64),

    #[error("demand must be positive, got {0}")]
    NonPositiveDemand(f64),

    #[error("capacity must be positive, got {0}")]
    NonPositiveCapacity(f64),

    #[error("unknown server status {0:?}")]
    UnknownStatus(String),
}
