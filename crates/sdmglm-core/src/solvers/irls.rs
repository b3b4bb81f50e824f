// =============================================================================
// IRLS: Iteratively Reweighted Least Squares
// =============================================================================
//
// Each iteration:
//
//     1. working weights   w_i = prior_i / (V(μ_i) · g'(μ_i)²)
//     2. working response  z_i = η_i + (y_i - μ_i) · g'(μ_i)
//     3. solve             (X'WX) β = X'Wz
//     4. update            η = Xβ,  μ = g⁻¹(η), clamped into the family domain
//     5. stop when the relative deviance change drops below tolerance
//
// Convergence and degeneracy are reported, never panicked on: the model
// search upstream treats a non-converged or boundary fit as an unusable
// candidate and moves on.
//
// =============================================================================

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

use crate::convert::{solve_qr_and_invert, solve_spd_and_invert, to_dmatrix};
use crate::error::{Result, SdmGlmCoreError};
use crate::families::Family;
use crate::links::Link;

// =============================================================================
// Configuration
// =============================================================================

/// Decomposition used for the weighted least-squares step.
///
/// Cholesky (with LU fallback) is the fast default; QR trades speed for
/// robustness on poorly conditioned systems. This is the target of the
/// engine's `method` pass-through option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMethod {
    #[default]
    Cholesky,
    Qr,
}

/// IRLS algorithm options. Defaults are appropriate for the small candidate
/// models the search engine fits.
#[derive(Debug, Clone)]
pub struct IrlsConfig {
    /// Maximum iterations before reporting non-convergence.
    pub max_iterations: usize,

    /// Relative deviance-change tolerance for convergence.
    pub tolerance: f64,

    /// Floor for working weights, to keep the normal equations finite.
    pub min_weight: f64,

    /// A fitted coefficient whose magnitude reaches this value marks the
    /// fit as a boundary (degenerate) estimate.
    pub boundary_threshold: f64,

    /// Least-squares backend for the inner solve.
    pub method: FitMethod,
}

impl Default for IrlsConfig {
    fn default() -> Self {
        Self {
            max_iterations: 25,
            tolerance: 1e-8,
            min_weight: 1e-10,
            boundary_threshold: 1e4,
            method: FitMethod::Cholesky,
        }
    }
}

// =============================================================================
// Result
// =============================================================================

/// A fitted GLM.
#[derive(Debug, Clone)]
pub struct GlmFit {
    /// Fitted coefficients β, in design-matrix column order.
    pub coefficients: Array1<f64>,

    /// Fitted means μ = g⁻¹(Xβ).
    pub fitted_values: Array1<f64>,

    /// Linear predictor η = Xβ.
    pub linear_predictor: Array1<f64>,

    /// Final (weighted) deviance.
    pub deviance: f64,

    /// Iterations actually run.
    pub iterations: usize,

    /// Whether the deviance-change criterion was met within the iteration
    /// budget.
    pub converged: bool,

    /// Whether any coefficient is non-finite or has magnitude at or above
    /// `IrlsConfig::boundary_threshold`: a numerically unbounded estimate,
    /// e.g. from perfect separation in a binomial fit.
    pub boundary: bool,

    /// (X'WX)⁻¹ at the final iteration. Multiply by the dispersion to get
    /// the coefficient covariance.
    pub covariance_unscaled: Array2<f64>,

    /// Prior observation weights the model was fitted with.
    pub prior_weights: Array1<f64>,
}

// =============================================================================
// Entry points
// =============================================================================

/// Fit a GLM with unit observation weights.
pub fn fit_glm(
    y: &Array1<f64>,
    x: &Array2<f64>,
    family: &dyn Family,
    link: &dyn Link,
    config: &IrlsConfig,
) -> Result<GlmFit> {
    fit_glm_weighted(y, x, family, link, config, None)
}

/// Fit a GLM with optional prior observation weights.
///
/// The design matrix must already contain its intercept column if one is
/// wanted. Concurrent calls over the same `y`/`x`/`weights` are safe; the
/// solver reads shared state only.
pub fn fit_glm_weighted(
    y: &Array1<f64>,
    x: &Array2<f64>,
    family: &dyn Family,
    link: &dyn Link,
    config: &IrlsConfig,
    weights: Option<&Array1<f64>>,
) -> Result<GlmFit> {
    let n = y.len();
    let p = x.ncols();

    if n == 0 {
        return Err(SdmGlmCoreError::EmptyInput("response is empty".to_string()));
    }
    if p == 0 {
        return Err(SdmGlmCoreError::EmptyInput(
            "design matrix has no columns".to_string(),
        ));
    }
    if x.nrows() != n {
        return Err(SdmGlmCoreError::DimensionMismatch(format!(
            "design matrix has {} rows but response has {}",
            x.nrows(),
            n
        )));
    }

    let prior = match weights {
        Some(w) => {
            if w.len() != n {
                return Err(SdmGlmCoreError::DimensionMismatch(format!(
                    "weights have {} elements but response has {}",
                    w.len(),
                    n
                )));
            }
            if w.iter().any(|&wi| !wi.is_finite() || wi < 0.0) {
                return Err(SdmGlmCoreError::InvalidValue(
                    "weights must be finite and non-negative".to_string(),
                ));
            }
            w.clone()
        }
        None => Array1::ones(n),
    };

    // Starting point: family-specific μ, re-centered if the family's own
    // initializer lands outside its domain
    let mut mu = family.initialize_mu(y);
    if !family.is_valid_mu(&mu) {
        mu = family.clamp_mu(&mu);
    }
    let mut eta = link.link(&mu);
    let mut deviance = family.deviance(y, &mu, Some(&prior));

    let x_nalg = to_dmatrix(x);

    let mut coefficients = Array1::zeros(p);
    let mut cov_unscaled = Array2::zeros((p, p));
    let mut converged = false;
    let mut iteration = 0;

    while iteration < config.max_iterations {
        iteration += 1;

        // Working weights: prior / (V(μ) g'(μ)²), floored for stability
        let variance = family.variance(&mu);
        let link_deriv = link.derivative(&mu);
        let w: Vec<f64> = prior
            .iter()
            .zip(variance.iter())
            .zip(link_deriv.iter())
            .map(|((&pw, &v), &d)| (pw / (v * d * d)).max(config.min_weight).min(1e10))
            .collect();

        // Working response: z = η + (y - μ) g'(μ)
        let z: Array1<f64> = eta
            .iter()
            .zip(y.iter())
            .zip(mu.iter())
            .zip(link_deriv.iter())
            .map(|(((&e, &yi), &mi), &d)| e + (yi - mi) * d)
            .collect();

        let (beta, xtwx_inv) = solve_wls(&x_nalg, &z, &w, config.method)?;

        eta = x.dot(&beta);
        mu = family.clamp_mu(&link.inverse(&eta));

        let deviance_old = deviance;
        deviance = family.deviance(y, &mu, Some(&prior));
        let rel_change = if deviance_old.abs() > 1e-10 {
            (deviance_old - deviance).abs() / deviance_old.abs()
        } else {
            (deviance_old - deviance).abs()
        };

        coefficients = beta;
        cov_unscaled = xtwx_inv;

        if rel_change < config.tolerance {
            converged = true;
            break;
        }
    }

    let boundary = coefficients
        .iter()
        .any(|c| !c.is_finite() || c.abs() >= config.boundary_threshold);

    Ok(GlmFit {
        coefficients,
        fitted_values: mu,
        linear_predictor: eta,
        deviance,
        iterations: iteration,
        converged,
        boundary,
        covariance_unscaled: cov_unscaled,
        prior_weights: prior,
    })
}

// =============================================================================
// Weighted least squares
// =============================================================================

/// Solve (X'WX) β = X'Wz and return (β, (X'WX)⁻¹).
fn solve_wls(
    x: &DMatrix<f64>,
    z: &Array1<f64>,
    w: &[f64],
    method: FitMethod,
) -> Result<(Array1<f64>, Array2<f64>)> {
    let n = x.nrows();
    let p = x.ncols();

    // Scale rows by √w so that X_w'X_w = X'WX and X_w'z_w = X'Wz
    let mut x_weighted = x.clone();
    for i in 0..n {
        let sw = w[i].sqrt();
        for j in 0..p {
            x_weighted[(i, j)] *= sw;
        }
    }
    let z_weighted: DVector<f64> =
        DVector::from_iterator(n, z.iter().zip(w.iter()).map(|(&zi, &wi)| zi * wi.sqrt()));

    let xtwx = x_weighted.transpose() * &x_weighted;
    let xtwz = x_weighted.transpose() * z_weighted;

    let solved = match method {
        FitMethod::Cholesky => solve_spd_and_invert(&xtwx, &xtwz),
        FitMethod::Qr => solve_qr_and_invert(&xtwx, &xtwz),
    };

    match solved {
        Some((beta, inv)) if beta.iter().all(|b| b.is_finite()) => Ok((beta, inv)),
        _ => Err(SdmGlmCoreError::LinearAlgebraError(
            "weighted least squares system is singular; predictors may be collinear".to_string(),
        )),
    }
}

// =============================================================================
// Tests
// =============================================================================
