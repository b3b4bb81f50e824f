// =============================================================================
// Link Functions
// =============================================================================
//
// The link function g connects the mean of the response to the linear
// predictor:
//
//     g(μ) = η = Xβ
//
// Each link provides three operations used by the IRLS solver:
//
//   - link(μ):       μ → η       (the link itself)
//   - inverse(η):    η → μ       (the mean function)
//   - derivative(μ): dη/dμ       (enters the IRLS weights and working response)
//
// The logit and complementary log-log links matter most here: presence /
// background species data is modeled as a binomial response, and cloglog is
// the standard choice when background points are interpreted as a Poisson
// point process sample.
//
// =============================================================================

use ndarray::Array1;

/// Floor/ceiling used to keep μ away from the exact boundary of its domain
/// before applying a link that is undefined there.
const MU_EPS: f64 = 1e-10;

/// A GLM link function.
///
/// Implementations must be pure: no interior mutability, so a single link
/// object can be shared freely across worker threads.
pub trait Link: Send + Sync {
    /// Human-readable name ("logit", "log", ...).
    fn name(&self) -> &'static str;

    /// Apply the link: η = g(μ).
    fn link(&self, mu: &Array1<f64>) -> Array1<f64>;

    /// Apply the inverse link (mean function): μ = g⁻¹(η).
    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64>;

    /// Derivative dη/dμ = g'(μ), evaluated element-wise.
    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64>;
}

// =============================================================================
// Identity: η = μ
// =============================================================================

/// Identity link, canonical for the Gaussian family.
pub struct IdentityLink;

impl Link for IdentityLink {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.clone()
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        eta.clone()
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        Array1::ones(mu.len())
    }
}

// =============================================================================
// Log: η = ln(μ)
// =============================================================================

/// Log link, canonical for Poisson and the conventional choice for Gamma.
pub struct LogLink;

impl Link for LogLink {
    fn name(&self) -> &'static str {
        "log"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| m.max(MU_EPS).ln())
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        eta.mapv(f64::exp)
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| 1.0 / m.max(MU_EPS))
    }
}

// =============================================================================
// Logit: η = ln(μ / (1 - μ))
// =============================================================================

/// Logit link, canonical for the binomial family.
pub struct LogitLink;

impl Link for LogitLink {
    fn name(&self) -> &'static str {
        "logit"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| {
            let m = m.max(MU_EPS).min(1.0 - MU_EPS);
            (m / (1.0 - m)).ln()
        })
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        // 1 / (1 + e^{-η}), computed in the numerically stable split form
        eta.mapv(|e| {
            if e >= 0.0 {
                1.0 / (1.0 + (-e).exp())
            } else {
                let ex = e.exp();
                ex / (1.0 + ex)
            }
        })
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| {
            let m = m.max(MU_EPS).min(1.0 - MU_EPS);
            1.0 / (m * (1.0 - m))
        })
    }
}

// =============================================================================
// Complementary log-log: η = ln(-ln(1 - μ))
// =============================================================================

/// Complementary log-log link.
///
/// Asymmetric: approaches 1 faster than it leaves 0. Standard for
/// presence/background designs derived from a point-process likelihood.
pub struct CloglogLink;

impl Link for CloglogLink {
    fn name(&self) -> &'static str {
        "cloglog"
    }

    fn link(&self, mu: &Array1<f64>) -> Array1<f64> {
        mu.mapv(|m| {
            let m = m.max(MU_EPS).min(1.0 - MU_EPS);
            (-(1.0 - m).ln()).ln()
        })
    }

    fn inverse(&self, eta: &Array1<f64>) -> Array1<f64> {
        // μ = 1 - exp(-exp(η)); cap exp(η) to avoid overflow for large η
        eta.mapv(|e| 1.0 - (-e.exp().min(700.0)).exp())
    }

    fn derivative(&self, mu: &Array1<f64>) -> Array1<f64> {
        // dη/dμ = 1 / (-(1 - μ) ln(1 - μ))
        mu.mapv(|m| {
            let m = m.max(MU_EPS).min(1.0 - MU_EPS);
            1.0 / (-(1.0 - m) * (1.0 - m).ln())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn roundtrip(link: &dyn Link, mu: Array1<f64>) {
        let eta = link.link(&mu);
        let back = link.inverse(&eta);
        for (m, b) in mu.iter().zip(back.iter()) {
            assert_abs_diff_eq!(m, b, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_identity_roundtrip() {
        roundtrip(&IdentityLink, array![-3.0, 0.0, 2.5]);
    }

    #[test]
    fn test_log_roundtrip() {
        roundtrip(&LogLink, array![0.1, 1.0, 25.0]);
    }

    #[test]
    fn test_logit_roundtrip() {
        roundtrip(&LogitLink, array![0.05, 0.5, 0.95]);
    }

    #[test]
    fn test_cloglog_roundtrip() {
        roundtrip(&CloglogLink, array![0.05, 0.5, 0.95]);
    }

    #[test]
    fn test_logit_midpoint() {
        // logit(0.5) = 0, and the inverse maps 0 back to 0.5
        let eta = LogitLink.link(&array![0.5]);
        assert_abs_diff_eq!(eta[0], 0.0, epsilon = 1e-12);
        let mu = LogitLink.inverse(&array![0.0]);
        assert_abs_diff_eq!(mu[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_logit_inverse_is_stable_for_extreme_eta() {
        let mu = LogitLink.inverse(&array![-800.0, 800.0]);
        assert!(mu[0] >= 0.0 && mu[0] < 1e-12);
        assert!(mu[1] <= 1.0 && mu[1] > 1.0 - 1e-12);
    }

    #[test]
    fn test_cloglog_is_asymmetric() {
        // Unlike logit, cloglog(0.5) is not 0
        let eta = CloglogLink.link(&array![0.5]);
        assert!((eta[0]).abs() > 0.1);
    }

    #[test]
    fn test_derivatives_positive() {
        let mu_unit = array![0.1, 0.5, 0.9];
        for link in [&LogitLink as &dyn Link, &CloglogLink] {
            assert!(link.derivative(&mu_unit).iter().all(|&d| d > 0.0));
        }
        let mu_pos = array![0.5, 2.0, 10.0];
        assert!(LogLink.derivative(&mu_pos).iter().all(|&d| d > 0.0));
    }
}
