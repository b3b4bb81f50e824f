// =============================================================================
// Information Criteria
// =============================================================================

use ndarray::Array1;

use crate::families::Family;

/// Akaike Information Criterion: AIC = -2ℓ + 2k.
///
/// Lower is better.
pub fn aic(log_likelihood: f64, n_params: usize) -> f64 {
    -2.0 * log_likelihood + 2.0 * n_params as f64
}

/// Corrected AIC for small samples:
///
/// ```text
/// AICc = AIC + 2k(k + 1) / (n - k - 1)
/// ```
///
/// Converges to AIC as n grows. When n ≤ k + 1 the correction is undefined
/// and the model cannot be supported by the data at all; +∞ is returned so
/// such models always rank last.
pub fn aicc(log_likelihood: f64, n_params: usize, n_obs: usize) -> f64 {
    let k = n_params as f64;
    let n = n_obs as f64;
    if n - k - 1.0 <= 0.0 {
        return f64::INFINITY;
    }
    aic(log_likelihood, n_params) + 2.0 * k * (k + 1.0) / (n - k - 1.0)
}

/// Bayesian Information Criterion: BIC = -2ℓ + k·ln(n).
pub fn bic(log_likelihood: f64, n_params: usize, n_obs: usize) -> f64 {
    -2.0 * log_likelihood + n_params as f64 * (n_obs as f64).ln()
}

/// Deviance of the intercept-only model: the fitted mean is the weighted
/// mean of the response, clamped into the family's domain.
pub fn null_deviance(
    y: &Array1<f64>,
    family: &dyn Family,
    weights: Option<&Array1<f64>>,
) -> f64 {
    let (mut num, mut den) = (0.0, 0.0);
    for (i, &yi) in y.iter().enumerate() {
        let w = weights.map_or(1.0, |wv| wv[i]);
        num += w * yi;
        den += w;
    }
    let mean = if den > 0.0 { num / den } else { 0.0 };
    let mu = family.clamp_mu(&Array1::from_elem(y.len(), mean));
    family.deviance(y, &mu, weights)
}

// =============================================================================
// Tests
// =============================================================================
