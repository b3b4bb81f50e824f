// =============================================================================
// Dispersion Estimation
// =============================================================================
//
// The dispersion φ scales the variance function: Var(Y) = φ V(μ). Binomial
// and Poisson fix φ = 1; Gaussian and Gamma estimate it from the fit.
// Coefficient covariances are φ · (X'WX)⁻¹, so the coefficient summary of a
// trained model depends on these estimates.
//
// =============================================================================

use ndarray::Array1;

use crate::families::Family;

/// Pearson estimate: φ̂ = (1 / df_resid) Σ w (y - μ)² / V(μ).
pub fn estimate_dispersion_pearson(
    y: &Array1<f64>,
    mu: &Array1<f64>,
    family: &dyn Family,
    weights: Option<&Array1<f64>>,
    df_resid: usize,
) -> f64 {
    if df_resid == 0 {
        return f64::NAN;
    }
    let variance = family.variance(mu);
    let chi2: f64 = y
        .iter()
        .zip(mu.iter())
        .zip(variance.iter())
        .enumerate()
        .map(|(i, ((&yi, &mi), &vi))| {
            let w = weights.map_or(1.0, |wv| wv[i]);
            w * (yi - mi).powi(2) / vi.max(1e-10)
        })
        .sum();
    chi2 / df_resid as f64
}

/// Deviance estimate: φ̂ = deviance / df_resid.
pub fn estimate_dispersion_deviance(deviance: f64, df_resid: usize) -> f64 {
    if df_resid == 0 {
        return f64::NAN;
    }
    deviance / df_resid as f64
}

// =============================================================================
// Tests
// =============================================================================
