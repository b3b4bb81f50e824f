// =============================================================================
// GLM Solvers
// =============================================================================
//
// Fitting a GLM means finding coefficients β with g(E[Y]) = Xβ. The link
// makes the problem non-linear and the variance function makes it
// heteroscedastic, so there is no closed form; IRLS linearizes around the
// current estimate and solves a weighted least-squares problem per
// iteration until the deviance stabilizes.
//
// This crate exposes a single solver. The model-search engine layered on
// top fits many small candidate models through it concurrently, so the
// solver takes only shared references and owns no mutable state.
//
// =============================================================================

mod irls;

pub use irls::{fit_glm, fit_glm_weighted, FitMethod, GlmFit, IrlsConfig};
