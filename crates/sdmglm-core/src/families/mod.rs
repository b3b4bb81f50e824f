// =============================================================================
// Distribution Families
// =============================================================================
//
// A family describes the stochastic part of a GLM: how the response varies
// around its mean μ. Each family supplies everything the solver and the
// model-fit diagnostics need:
//
//   - variance(μ):        the variance function V(μ), so Var(Y) = φ V(μ)
//   - deviance(y, μ, w):  goodness-of-fit measure minimized by the fit
//   - log_likelihood:     for information criteria (AIC / AICc / BIC)
//   - initialize_mu:      a starting point for IRLS
//   - clamp_mu:           projection of μ back into its valid domain
//
// For species distribution work the binomial family is the workhorse
// (presence/background responses); Gaussian, Poisson, and Gamma cover
// abundance and environmental-response use cases.
//
// =============================================================================

use ndarray::Array1;
use statrs::function::gamma::ln_gamma;

use crate::links::{IdentityLink, Link, LogLink, LogitLink};

const LN_2PI: f64 = 1.8378770664093453;

/// A GLM distribution family.
///
/// Implementations are stateless; a family object can be shared across
/// worker threads fitting different candidate models over the same data.
pub trait Family: Send + Sync {
    /// Family name ("binomial", "gaussian", ...).
    fn name(&self) -> &'static str;

    /// Variance function V(μ), element-wise.
    fn variance(&self, mu: &Array1<f64>) -> Array1<f64>;

    /// Total (weighted) deviance of the fit.
    fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>, weights: Option<&Array1<f64>>) -> f64;

    /// Weighted log-likelihood of the data under fitted means `mu`.
    ///
    /// `scale` is the dispersion φ. It is ignored by one-parameter families
    /// (binomial, Poisson); for Gaussian and Gamma the caller passes the
    /// maximum-likelihood estimate deviance/n so that information criteria
    /// match the usual ML definitions.
    fn log_likelihood(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        scale: f64,
        weights: Option<&Array1<f64>>,
    ) -> f64;

    /// Starting values of μ for the iterative fit.
    fn initialize_mu(&self, y: &Array1<f64>) -> Array1<f64>;

    /// Project μ back into the family's valid open domain.
    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64>;

    /// True if every element of μ lies strictly inside the valid domain.
    fn is_valid_mu(&self, mu: &Array1<f64>) -> bool;

    /// The canonical (or conventional) link for this family.
    fn canonical_link(&self) -> Box<dyn Link>;

    /// Number of distribution parameters estimated beyond the coefficients
    /// (the dispersion, where free). Enters the parameter count k of
    /// information criteria.
    fn extra_params(&self) -> usize;
}

fn weight_at(weights: Option<&Array1<f64>>, i: usize) -> f64 {
    weights.map_or(1.0, |w| w[i])
}

// =============================================================================
// Gaussian
// =============================================================================

/// Gaussian (normal) family: V(μ) = 1.
pub struct GaussianFamily;

impl Family for GaussianFamily {
    fn name(&self) -> &'static str {
        "gaussian"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        Array1::ones(mu.len())
    }

    fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>, weights: Option<&Array1<f64>>) -> f64 {
        y.iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| weight_at(weights, i) * (yi - mi).powi(2))
            .sum()
    }

    fn log_likelihood(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        scale: f64,
        weights: Option<&Array1<f64>>,
    ) -> f64 {
        let s = scale.max(1e-300);
        y.iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                -0.5 * weight_at(weights, i) * ((yi - mi).powi(2) / s + s.ln() + LN_2PI)
            })
            .sum()
    }

    fn initialize_mu(&self, y: &Array1<f64>) -> Array1<f64> {
        y.clone()
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.clone()
    }

    fn is_valid_mu(&self, mu: &Array1<f64>) -> bool {
        mu.iter().all(|m| m.is_finite())
    }

    fn canonical_link(&self) -> Box<dyn Link> {
        Box::new(IdentityLink)
    }

    fn extra_params(&self) -> usize {
        1 // the free variance σ²
    }
}

// =============================================================================
// Binomial
// =============================================================================

/// Binomial (Bernoulli) family: V(μ) = μ(1 - μ).
pub struct BinomialFamily;

impl Family for BinomialFamily {
    fn name(&self) -> &'static str {
        "binomial"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| {
            let m = m.max(1e-10).min(1.0 - 1e-10);
            m * (1.0 - m)
        })
    }

    fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>, weights: Option<&Array1<f64>>) -> f64 {
        // 2 Σ w [ y ln(y/μ) + (1-y) ln((1-y)/(1-μ)) ], with 0·ln(0) = 0
        let term = |obs: f64, fit: f64| {
            if obs > 0.0 {
                obs * (obs / fit).ln()
            } else {
                0.0
            }
        };
        2.0 * y
            .iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                let mi = mi.max(1e-10).min(1.0 - 1e-10);
                weight_at(weights, i) * (term(yi, mi) + term(1.0 - yi, 1.0 - mi))
            })
            .sum::<f64>()
    }

    fn log_likelihood(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        _scale: f64,
        weights: Option<&Array1<f64>>,
    ) -> f64 {
        y.iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                let mi = mi.max(1e-10).min(1.0 - 1e-10);
                weight_at(weights, i) * (yi * mi.ln() + (1.0 - yi) * (1.0 - mi).ln())
            })
            .sum()
    }

    fn initialize_mu(&self, y: &Array1<f64>) -> Array1<f64> {
        // Shrink 0/1 responses toward 1/2, the standard glm starting point
        y.mapv(|yi| (yi + 0.5) / 2.0)
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(1e-10).min(1.0 - 1e-10))
    }

    fn is_valid_mu(&self, mu: &Array1<f64>) -> bool {
        mu.iter().all(|&m| m.is_finite() && m > 0.0 && m < 1.0)
    }

    fn canonical_link(&self) -> Box<dyn Link> {
        Box::new(LogitLink)
    }

    fn extra_params(&self) -> usize {
        0
    }
}

// =============================================================================
// Poisson
// =============================================================================

/// Poisson family: V(μ) = μ. For count responses (e.g., abundance).
pub struct PoissonFamily;

impl Family for PoissonFamily {
    fn name(&self) -> &'static str {
        "poisson"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(1e-10))
    }

    fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>, weights: Option<&Array1<f64>>) -> f64 {
        2.0 * y
            .iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                let mi = mi.max(1e-10);
                let dev = if yi > 0.0 {
                    yi * (yi / mi).ln() - (yi - mi)
                } else {
                    mi
                };
                weight_at(weights, i) * dev
            })
            .sum::<f64>()
    }

    fn log_likelihood(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        _scale: f64,
        weights: Option<&Array1<f64>>,
    ) -> f64 {
        y.iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                let mi = mi.max(1e-10);
                weight_at(weights, i) * (yi * mi.ln() - mi - ln_gamma(yi + 1.0))
            })
            .sum()
    }

    fn initialize_mu(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|yi| (yi + 0.1).max(0.1))
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(1e-10))
    }

    fn is_valid_mu(&self, mu: &Array1<f64>) -> bool {
        mu.iter().all(|&m| m.is_finite() && m > 0.0)
    }

    fn canonical_link(&self) -> Box<dyn Link> {
        Box::new(LogLink)
    }

    fn extra_params(&self) -> usize {
        0
    }
}

// =============================================================================
// Gamma
// =============================================================================

/// Gamma family: V(μ) = μ². Positive continuous responses.
pub struct GammaFamily;

impl Family for GammaFamily {
    fn name(&self) -> &'static str {
        "gamma"
    }

    fn variance(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(1e-10).powi(2))
    }

    fn deviance(&self, y: &Array1<f64>, mu: &Array1<f64>, weights: Option<&Array1<f64>>) -> f64 {
        2.0 * y
            .iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                let yi = yi.max(1e-10);
                let mi = mi.max(1e-10);
                weight_at(weights, i) * (-(yi / mi).ln() + (yi - mi) / mi)
            })
            .sum::<f64>()
    }

    fn log_likelihood(
        &self,
        y: &Array1<f64>,
        mu: &Array1<f64>,
        scale: f64,
        weights: Option<&Array1<f64>>,
    ) -> f64 {
        // Shape α = 1/φ, rate α/μ
        let alpha = 1.0 / scale.max(1e-300);
        y.iter()
            .zip(mu.iter())
            .enumerate()
            .map(|(i, (&yi, &mi))| {
                let yi = yi.max(1e-300);
                let mi = mi.max(1e-10);
                weight_at(weights, i)
                    * (alpha * (alpha * yi / mi).ln() - alpha * yi / mi - yi.ln()
                        - ln_gamma(alpha))
            })
            .sum()
    }

    fn initialize_mu(&self, y: &Array1<f64>) -> Array1<f64> {
        y.mapv(|yi| yi.max(0.1))
    }

    fn clamp_mu(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(1e-10))
    }

    fn is_valid_mu(&self, mu: &Array1<f64>) -> bool {
        mu.iter().all(|&m| m.is_finite() && m > 0.0)
    }

    fn canonical_link(&self) -> Box<dyn Link> {
        Box::new(LogLink)
    }

    fn extra_params(&self) -> usize {
        1 // the free shape parameter
    }
}

// =============================================================================
// Tests
// =============================================================================
