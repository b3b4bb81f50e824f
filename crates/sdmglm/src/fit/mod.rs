// =============================================================================
// Model Fit Worker
// =============================================================================
//
// Fits ONE candidate term set and reduces it to the facts the search
// needs: coefficients, convergence/boundary flags, and AICc. This is the
// unit of work both search phases fan out over, so two rules hold:
//
//   1. No panics and no propagated errors. A candidate whose fit blows up
//      numerically comes back as `converged = false` with infinite AICc;
//      a single bad term must never abort a phase.
//   2. No shared mutable state. The worker reads the context and returns
//      a value, so any number of invocations can run concurrently. Family
//      and link objects are rebuilt per call from their plain-enum kinds
//      rather than shared as trait objects across threads.
//
// AICc rather than AIC throughout: candidate models are fitted to samples
// that are small relative to their parameter counts, exactly the regime
// where AIC's penalty is too weak.
//
// =============================================================================

use ndarray::Array1;
use sdmglm_core::diagnostics::aicc;
use sdmglm_core::families::{
    BinomialFamily, Family, GammaFamily, GaussianFamily, PoissonFamily,
};
use sdmglm_core::links::{CloglogLink, IdentityLink, Link, LogLink, LogitLink};
use sdmglm_core::solvers::{fit_glm_weighted, GlmFit, IrlsConfig};

use crate::data::DataTable;
use crate::design::{build_model_matrix, ModelMatrix};
use crate::error::Result;
use crate::terms::TermSet;

// =============================================================================
// Family and link selection
// =============================================================================

/// Distribution family, as a plain value suitable for configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FamilyKind {
    Gaussian,
    #[default]
    Binomial,
    Poisson,
    Gamma,
}

impl FamilyKind {
    pub fn build(self) -> Box<dyn Family> {
        match self {
            FamilyKind::Gaussian => Box::new(GaussianFamily),
            FamilyKind::Binomial => Box::new(BinomialFamily),
            FamilyKind::Poisson => Box::new(PoissonFamily),
            FamilyKind::Gamma => Box::new(GammaFamily),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FamilyKind::Gaussian => "gaussian",
            FamilyKind::Binomial => "binomial",
            FamilyKind::Poisson => "poisson",
            FamilyKind::Gamma => "gamma",
        }
    }

    /// Whether the family estimates a free dispersion from the data.
    pub fn has_free_dispersion(self) -> bool {
        matches!(self, FamilyKind::Gaussian | FamilyKind::Gamma)
    }
}

/// Link function, as a plain configuration value. `Canonical` defers to
/// the family's canonical link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkKind {
    #[default]
    Canonical,
    Identity,
    Log,
    Logit,
    Cloglog,
}

impl LinkKind {
    pub fn build(self, family: FamilyKind) -> Box<dyn Link> {
        match self {
            LinkKind::Canonical => family.build().canonical_link(),
            LinkKind::Identity => Box::new(IdentityLink),
            LinkKind::Log => Box::new(LogLink),
            LinkKind::Logit => Box::new(LogitLink),
            LinkKind::Cloglog => Box::new(CloglogLink),
        }
    }
}

// =============================================================================
// Fit context and result
// =============================================================================

/// Everything a worker needs to fit one candidate: the (possibly
/// standardized) data, the resolved response and weights, and the fitting
/// configuration. Shared by reference across all workers of a phase.
pub struct FitContext<'a> {
    pub table: &'a DataTable,
    pub response: &'a str,
    pub y: &'a Array1<f64>,
    pub weights: &'a Array1<f64>,
    pub family: FamilyKind,
    pub link: LinkKind,
    pub irls: IrlsConfig,
}

/// The distilled result of fitting one candidate model. Immutable; this
/// is what phases rank and what tuning tables are built from.
#[derive(Debug, Clone)]
pub struct FitSummary {
    pub terms: TermSet,
    pub formula: String,
    pub coefficients: Vec<(String, f64)>,
    pub converged: bool,
    pub boundary: bool,
    pub aicc: f64,
    pub log_likelihood: f64,
    pub n_params: usize,
}

impl FitSummary {
    /// A fit the search may rank: converged and away from the parameter
    /// boundary.
    pub fn usable(&self) -> bool {
        self.converged && !self.boundary
    }
}

// =============================================================================
// Fitting
// =============================================================================

/// Fit a term set, returning the raw fit and its design matrix.
///
/// Errors here mean the model could not be fitted at all (singular
/// design, bad input); `fit_candidate` is the error-absorbing wrapper the
/// search phases use.
pub fn fit_model_matrix(ctx: &FitContext<'_>, terms: &TermSet) -> Result<(GlmFit, ModelMatrix)> {
    let mm = build_model_matrix(ctx.table, terms, true, None)?;
    let family = ctx.family.build();
    let link = ctx.link.build(ctx.family);
    let fit = fit_glm_weighted(
        ctx.y,
        &mm.matrix,
        family.as_ref(),
        link.as_ref(),
        &ctx.irls,
        Some(ctx.weights),
    )?;
    Ok((fit, mm))
}

/// Log-likelihood and AICc of a completed fit.
pub(crate) fn information(
    ctx: &FitContext<'_>,
    fit: &GlmFit,
    n_coefs: usize,
) -> (f64, f64, usize) {
    let family = ctx.family.build();
    let n = ctx.y.len();
    // ML dispersion for the families that estimate one; fixed at 1 otherwise
    let scale = if ctx.family.has_free_dispersion() {
        fit.deviance / n as f64
    } else {
        1.0
    };
    let llf = family.log_likelihood(ctx.y, &fit.fitted_values, scale, Some(ctx.weights));
    let n_params = n_coefs + family.extra_params();
    (llf, aicc(llf, n_params, n), n_params)
}

/// Build a `FitSummary` from a completed fit.
pub(crate) fn summarize(ctx: &FitContext<'_>, terms: &TermSet, fit: &GlmFit, mm: &ModelMatrix) -> FitSummary {
    let (llf, aicc_value, n_params) = information(ctx, fit, mm.names.len());
    FitSummary {
        terms: terms.clone(),
        formula: terms.formula(ctx.response),
        coefficients: mm
            .names
            .iter()
            .cloned()
            .zip(fit.coefficients.iter().copied())
            .collect(),
        converged: fit.converged,
        boundary: fit.boundary,
        aicc: aicc_value,
        log_likelihood: llf,
        n_params,
    }
}

/// Fit one candidate term set, absorbing any fitting error into an
/// unusable summary. This is the function the executor fans out.
pub fn fit_candidate(ctx: &FitContext<'_>, terms: &TermSet) -> FitSummary {
    match fit_model_matrix(ctx, terms) {
        Ok((fit, mm)) => summarize(ctx, terms, &fit, &mm),
        Err(_) => FitSummary {
            terms: terms.clone(),
            formula: terms.formula(ctx.response),
            coefficients: Vec::new(),
            converged: false,
            boundary: false,
            aicc: f64::INFINITY,
            log_likelihood: f64::NAN,
            n_params: 0,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
