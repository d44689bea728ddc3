//! Error types for bazaari-core.
//!
//! Only genuine failures are represented here. The recovered conditions of
//! the recommendation pipeline (unseen demographic categories, cold-start
//! users/products, malformed numeric fields, an empty eligible set) degrade
//! in place with a log line instead of surfacing as errors.

use thiserror::Error;

/// Recommendation engine error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model fitting failed at startup (degenerate or empty training data).
    /// The process must not serve requests with a partially fitted model.
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// A content profile was requested for a user with no interaction
    /// history. Callers must branch on interaction count before building a
    /// profile; reaching this is a contract violation, not a data problem.
    #[error("Cannot build a content profile from an empty interaction history")]
    EmptyProfile,

    /// A product id was referenced that is not present in the catalog.
    #[error("Unknown product id: {0}")]
    UnknownProduct(u64),
}

/// Result type alias for recommendation operations.
pub type Result<T> = std::result::Result<T, Error>;
