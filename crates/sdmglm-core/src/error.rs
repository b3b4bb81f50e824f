// =============================================================================
// Error Types
// =============================================================================
//
// All fallible operations in the core library return `Result<T>` with the
// single `SdmGlmCoreError` enum below. Fitting code never panics on bad
// numerical input: singular systems, dimension mismatches, and invalid
// values all surface as typed errors so callers (in particular the model
// search engine, which fits hundreds of candidate models) can catch and
// record them instead of crashing.
//
// =============================================================================

use thiserror::Error;

/// Errors produced by the core statistics library.
#[derive(Error, Debug)]
pub enum SdmGlmCoreError {
    /// Array shapes do not line up (e.g., X rows vs. y length).
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// An input array was empty where data is required.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A value was outside its valid domain (negative weight, factor where
    /// a numeric column is required, and so on).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A linear-algebra operation failed, typically a singular or
    /// near-singular system. Often indicates multicollinearity among
    /// predictors.
    #[error("linear algebra error: {0}")]
    LinearAlgebraError(String),
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, SdmGlmCoreError>;
