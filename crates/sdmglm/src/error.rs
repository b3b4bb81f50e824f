// =============================================================================
// Error Types
// =============================================================================
//
// Engine-level errors. The important taxonomy distinction (spelled out in
// the training docs): a DEGENERATE candidate fit is NOT an error - the fit
// worker records it and the search filters it. `NoUsableModel` is the one
// fitting-related error the engine raises, and only when every candidate in
// a phase was degenerate and the caller asked for a hard failure.
//
// =============================================================================

use thiserror::Error;

/// Errors produced by the model-search engine.
#[derive(Error, Debug)]
pub enum SdmGlmError {
    /// Forwarded from the statistics core.
    #[error(transparent)]
    Core(#[from] sdmglm_core::SdmGlmCoreError),

    /// A named column does not exist in the data table.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A column with this name already exists.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Column lengths or vector lengths do not line up.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A value or option was outside its valid domain.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Every candidate model in a search phase failed to converge or hit a
    /// boundary estimate, and `fail_if_no_valid` was set.
    #[error("no usable model: every candidate in the {0} phase was degenerate")]
    NoUsableModel(&'static str),
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, SdmGlmError>;
