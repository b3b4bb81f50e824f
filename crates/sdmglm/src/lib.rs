// =============================================================================
// sdmglm
// =============================================================================
//
// Automated GLM construction and AICc-based model selection for species
// distribution and ecological niche modeling.
//
// Given occurrence data (a response column and environmental predictor
// columns), `train_glm` runs a two-phase search:
//
//   1. CONSTRUCTION: every candidate term group (main effect, quadratic
//      pair, interaction triple) is fitted as its own small model and
//      ranked by AICc; the best-ranked groups are greedily accumulated
//      into a "full" model under a term cap and a data-per-term budget.
//   2. SELECTION: every marginality-respecting subset of the full model
//      is fitted (optionally in parallel) and the lowest-AICc valid fit
//      wins.
//
// Structure:
//
//   - data:     the column table the engine consumes
//   - terms:    typed model terms and the candidate-term generator
//   - design:   term set + table → design matrix
//   - weights:  uniform / class-balanced / user weights
//   - scaling:  predictor standardization, captured for prediction
//   - executor: sequential or bounded-worker-pool fitting strategy
//   - fit:      the single-candidate fit worker (AICc, validity flags)
//   - search:   ranking, full-model assembly, subset enumeration
//   - train:    the orchestrator and the trained-model type
//
// The underlying GLM machinery (families, links, IRLS, information
// criteria) lives in the `sdmglm-core` crate.
//
// =============================================================================

pub mod data;
pub mod design;
pub mod error;
pub mod executor;
pub mod fit;
pub mod scaling;
pub mod search;
pub mod terms;
pub mod train;
pub mod weights;

// The surface most callers need, re-exported at the crate root.
pub use data::{Column, DataTable};
pub use error::{Result, SdmGlmError};
pub use executor::Executor;
pub use fit::{FamilyKind, FitSummary, LinkKind};
pub use scaling::{ScaleOption, ScaleParams};
pub use search::{TuningRow, TuningTable};
pub use terms::{generate_term_groups, Term, TermSet};
pub use train::{train_glm, OutputRequest, TrainGlmConfig, TrainGlmOutput, TrainedGlm};
pub use weights::WeightSpec;
