// =============================================================================
// Model Diagnostics
// =============================================================================
//
// Model-comparison and dispersion tools layered on a fitted GLM:
//
// - MODEL FIT:  log-likelihood-based information criteria (AIC, AICc, BIC)
//               and the null deviance
// - DISPERSION: estimates of the scale parameter φ
//
// AICc is the criterion the model search ranks on. Presence/background
// datasets routinely have few presences relative to the number of candidate
// terms, and in that regime plain AIC under-penalizes complexity; the
// small-sample correction is what keeps the search from over-fitting.
//
// =============================================================================

mod dispersion;
mod model_fit;

pub use dispersion::{estimate_dispersion_deviance, estimate_dispersion_pearson};
pub use model_fit::{aic, aicc, bic, null_deviance};
