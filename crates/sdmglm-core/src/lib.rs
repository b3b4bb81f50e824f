// =============================================================================
// sdmglm-core
// =============================================================================
//
// Pure Rust GLM fitting substrate for the sdmglm model-search engine.
// No ecology in here - just statistics:
//
//   - families:      distribution families (gaussian, binomial, poisson, gamma)
//   - links:         link functions (identity, log, logit, cloglog)
//   - solvers:       IRLS fitting
//   - design_matrix: categorical encoding and interaction columns
//   - diagnostics:   information criteria (AIC/AICc/BIC) and dispersion
//   - inference:     Wald z-tests and confidence intervals
//   - convert:       ndarray ↔ nalgebra plumbing
//   - error:         the error type shared by all of the above
//
// The sdmglm crate layers the species-distribution-specific machinery
// (typed model terms, the AICc-driven construction/selection search) on top
// of these primitives.
//
// =============================================================================

pub mod convert;
pub mod design_matrix;
pub mod diagnostics;
pub mod error;
pub mod families;
pub mod inference;
pub mod links;
pub mod solvers;

// Re-export the items nearly every consumer needs, so users can write
// `use sdmglm_core::fit_glm` instead of spelling out the module path.
pub use diagnostics::{aic, aicc, bic, null_deviance};
pub use error::{Result, SdmGlmCoreError};
pub use families::{BinomialFamily, Family, GammaFamily, GaussianFamily, PoissonFamily};
pub use inference::{confidence_interval_z, pvalue_z, significance_stars};
pub use links::{CloglogLink, IdentityLink, Link, LogLink, LogitLink};
pub use solvers::{fit_glm, fit_glm_weighted, FitMethod, GlmFit, IrlsConfig};
