// =============================================================================
// Statistical Inference
// =============================================================================
//
// Wald-type inference for GLM coefficients: given an estimate and its
// standard error, the z-statistic estimate / SE is referred to the standard
// normal. These helpers back the coefficient summary table of a trained
// model.
//
// =============================================================================

use statrs::distribution::{ContinuousCDF, Normal};

/// Two-tailed p-value of a z-statistic against the standard normal.
///
/// P(|Z| ≥ |z|) = 2 (1 - Φ(|z|)). Non-finite input yields NaN.
pub fn pvalue_z(z: f64) -> f64 {
    if !z.is_finite() {
        return f64::NAN;
    }
    let normal = Normal::new(0.0, 1.0).unwrap();
    2.0 * (1.0 - normal.cdf(z.abs()))
}

/// Normal-theory confidence interval (lower, upper) at the given level
/// (e.g. 0.95).
pub fn confidence_interval_z(estimate: f64, std_error: f64, confidence: f64) -> (f64, f64) {
    if !estimate.is_finite() || !std_error.is_finite() || std_error <= 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let normal = Normal::new(0.0, 1.0).unwrap();
    let alpha = 1.0 - confidence;
    let z_critical = normal.inverse_cdf(1.0 - alpha / 2.0);
    let margin = z_critical * std_error;
    (estimate - margin, estimate + margin)
}

/// Conventional significance stars for a p-value.
pub fn significance_stars(pvalue: f64) -> &'static str {
    if pvalue < 0.001 {
        "***"
    } else if pvalue < 0.01 {
        "**"
    } else if pvalue < 0.05 {
        "*"
    } else if pvalue < 0.1 {
        "."
    } else {
        ""
    }
}

// =============================================================================
// Tests
// =============================================================================
