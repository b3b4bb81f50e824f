// =============================================================================
// Training Orchestrator
// =============================================================================
//
// `train_glm` wires the whole pipeline together:
//
//   SETUP      validate inputs, resolve weights and effective sample size
//   SCALE      (optional) standardize continuous predictors, capturing the
//              (mean, sd) pairs on the output model
//   CONSTRUCT  fit and rank every candidate term group, then greedily
//              assemble the "full" model under the term/data budgets
//   SELECT     enumerate marginality-respecting subsets of the full model,
//              fit them all, rank by AICc
//   OUTPUT     best model / all models / tuning table, per the caller's
//              output request
//
// Skipping construction (`construct = false`) forces a single direct fit
// of the maximal term set; selection cannot run without construction, so
// `select = true` is then downgraded to a warning. The only hard failure
// out of the search itself is `NoUsableModel`, and only when
// `fail_if_no_valid` is set.
//
// =============================================================================

use std::collections::BTreeMap;
use std::fmt::Write as _;

use log::{info, warn};
use ndarray::{Array1, Array2};
use sdmglm_core::diagnostics::estimate_dispersion_pearson;
use sdmglm_core::inference::{pvalue_z, significance_stars};
use sdmglm_core::solvers::{FitMethod, GlmFit, IrlsConfig};

use crate::data::DataTable;
use crate::design::ModelMatrix;
use crate::error::{Result, SdmGlmError};
use crate::executor::Executor;
use crate::fit::{
    fit_model_matrix, information, FamilyKind, FitContext, FitSummary, LinkKind,
};
use crate::scaling::{compute_scale_params, standardize, ScaleOption, ScaleParams};
use crate::search::{
    assemble_full_model, enumerate_model_subsets, rank_candidates, PhaseOptions, TuningTable,
};
use crate::terms::{generate_term_groups, TermSet};
use crate::weights::{resolve_weights, WeightSpec};

// =============================================================================
// Configuration
// =============================================================================

/// Which artifacts `train_glm` should return.
#[derive(Debug, Clone, Copy)]
pub struct OutputRequest {
    /// The single best model, refitted and carrying scale parameters.
    pub best_model: bool,
    /// Every ranked candidate, refitted.
    pub all_models: bool,
    /// The tuning table.
    pub tuning: bool,
}

impl Default for OutputRequest {
    fn default() -> Self {
        Self {
            best_model: true,
            all_models: false,
            tuning: false,
        }
    }
}

/// Options for one training run. The defaults mirror common
/// presence/background practice: binomial response, balanced weights,
/// both phases on, quadratic and interaction candidates considered, 10
/// presences required per term.
#[derive(Debug, Clone)]
pub struct TrainGlmConfig {
    pub family: FamilyKind,
    pub link: LinkKind,

    /// Predictor standardization (Auto standardizes continuous predictors,
    /// skipping constants).
    pub scale: ScaleOption,

    /// Run the construction phase. When off, the maximal term set is
    /// fitted directly and no search happens.
    pub construct: bool,

    /// Run subset selection over the assembled full model. Requires
    /// construction.
    pub select: bool,

    /// Consider quadratic / interaction candidate terms.
    pub quadratic: bool,
    pub interaction: bool,

    /// Include the intercept-only model among the selection candidates.
    pub intercept_only: bool,

    /// Least-squares backend passed through to the IRLS solver.
    pub method: FitMethod,

    /// Minimum effective samples per term during construction
    /// (candidate-term gating) and assembly (full-model data budget).
    pub pres_per_term_initial: usize,
    pub pres_per_term_final: usize,

    /// Cap on the number of terms in the full model.
    pub max_terms: usize,

    pub weights: WeightSpec,

    /// Drop non-converged / boundary candidates before ranking.
    pub remove_invalid: bool,

    /// If a phase loses every candidate: `true` raises `NoUsableModel`,
    /// `false` returns an empty output with a warning.
    pub fail_if_no_valid: bool,

    /// Parallelism for the fitting fan-outs (1 = sequential).
    pub cores: usize,

    /// Progress reporting via `log::info!`; no effect on results.
    pub verbose: bool,

    pub outputs: OutputRequest,
}

impl Default for TrainGlmConfig {
    fn default() -> Self {
        Self {
            family: FamilyKind::Binomial,
            link: LinkKind::Canonical,
            scale: ScaleOption::Auto,
            construct: true,
            select: true,
            quadratic: true,
            interaction: true,
            intercept_only: true,
            method: FitMethod::Cholesky,
            pres_per_term_initial: 10,
            pres_per_term_final: 10,
            max_terms: 8,
            weights: WeightSpec::Balanced,
            remove_invalid: true,
            fail_if_no_valid: true,
            cores: 1,
            verbose: false,
            outputs: OutputRequest::default(),
        }
    }
}

// =============================================================================
// Trained model
// =============================================================================

/// A fitted model as returned to the caller: coefficients, fit quality,
/// and everything needed to predict on new raw data (stored scale
/// parameters and factor encodings).
#[derive(Debug, Clone)]
pub struct TrainedGlm {
    pub response: String,
    pub terms: TermSet,
    pub formula: String,
    pub family: FamilyKind,
    pub link: LinkKind,
    pub coefficients: Vec<(String, f64)>,
    pub converged: bool,
    pub boundary: bool,
    pub aicc: f64,
    pub log_likelihood: f64,
    pub n_params: usize,
    pub n_obs: usize,
    pub dispersion: f64,

    /// Standardization parameters captured at training time, if scaling
    /// was on. Prediction re-applies exactly these.
    pub scale: Option<ScaleParams>,

    coef_values: Array1<f64>,
    covariance_unscaled: Array2<f64>,
    factor_levels: BTreeMap<String, Vec<String>>,
}

impl TrainedGlm {
    /// Predict response-scale values for new raw data.
    ///
    /// New predictor values go through the SAME standardization captured
    /// at training time and the SAME factor encodings; statistics are
    /// never recomputed from the new data.
    pub fn predict(&self, table: &DataTable) -> Result<Array1<f64>> {
        let working = match &self.scale {
            Some(params) => standardize(table, params)?,
            None => table.clone(),
        };
        let mm = crate::design::build_model_matrix(
            &working,
            &self.terms,
            true,
            Some(&self.factor_levels),
        )?;
        if mm.names.len() != self.coef_values.len() {
            return Err(SdmGlmError::DimensionMismatch(format!(
                "prediction design has {} columns, model has {} coefficients",
                mm.names.len(),
                self.coef_values.len()
            )));
        }
        let eta = mm.matrix.dot(&self.coef_values);
        Ok(self.link.build(self.family).inverse(&eta))
    }

    /// Wald standard error of the j-th coefficient.
    fn std_error(&self, j: usize) -> f64 {
        (self.dispersion * self.covariance_unscaled[[j, j]]).sqrt()
    }

    /// Coefficient table in the style of a GLM summary: estimate, standard
    /// error, z value, two-tailed p, significance stars.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Formula: {}", self.formula);
        let _ = writeln!(
            out,
            "Family: {} ({})",
            self.family.name(),
            self.link.build(self.family).name()
        );
        let _ = writeln!(
            out,
            "AICc: {:.3}   log-likelihood: {:.3}   n = {}",
            self.aicc, self.log_likelihood, self.n_obs
        );
        let name_width = self
            .coefficients
            .iter()
            .map(|(n, _)| n.len())
            .max()
            .unwrap_or(4)
            .max(4);
        let _ = writeln!(
            out,
            "{:<name_width$}  {:>12}  {:>12}  {:>8}  {:>10}",
            "", "Estimate", "Std. Error", "z value", "Pr(>|z|)"
        );
        for (j, (name, estimate)) in self.coefficients.iter().enumerate() {
            let se = self.std_error(j);
            let z = estimate / se;
            let p = pvalue_z(z);
            let p_text = if p.is_nan() {
                "NA".to_string()
            } else if p >= 1e-4 {
                format!("{p:.4}")
            } else {
                format!("{p:.2e}")
            };
            let _ = writeln!(
                out,
                "{:<name_width$}  {:>12.5}  {:>12.5}  {:>8.3}  {:>10} {}",
                name,
                estimate,
                se,
                z,
                p_text,
                significance_stars(p)
            );
        }
        out
    }
}

/// The artifacts of one training run, populated per the `OutputRequest`.
/// All fields are `None` when a phase exhausted every candidate and
/// `fail_if_no_valid` was off.
#[derive(Debug, Clone, Default)]
pub struct TrainGlmOutput {
    pub model: Option<TrainedGlm>,
    pub models: Option<Vec<TrainedGlm>>,
    pub tuning: Option<TuningTable>,
}

impl TrainGlmOutput {
    fn empty() -> Self {
        Self::default()
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// Train a GLM over the given response and predictors.
///
/// See module docs for the phase structure. Degenerate candidate fits are
/// filtered, never raised; `Err` means invalid input or (with
/// `fail_if_no_valid`) a phase in which no candidate was usable.
pub fn train_glm(
    table: &DataTable,
    response: &str,
    predictors: &[&str],
    config: &TrainGlmConfig,
) -> Result<TrainGlmOutput> {
    // ------------------------------------------------------------------ SETUP
    if predictors.is_empty() {
        return Err(SdmGlmError::InvalidValue(
            "at least one predictor is required".to_string(),
        ));
    }
    for &p in predictors {
        if !table.has_column(p) {
            return Err(SdmGlmError::UnknownColumn(p.to_string()));
        }
    }
    if table.nrows() == 0 {
        return Err(SdmGlmError::InvalidValue("data table is empty".to_string()));
    }

    let outputs = effective_outputs(&config.outputs);
    let y = table.response_vector(response)?;
    let weights = resolve_weights(&config.weights, table, &y)?;
    let effective_n = effective_sample_size(&y, config.family);

    // ------------------------------------------------------------------ SCALE
    let (working, scale_params) = match config.scale {
        ScaleOption::Off => (table.clone(), None),
        ScaleOption::Auto => {
            let params = compute_scale_params(table, predictors, false)?;
            (standardize(table, &params)?, Some(params))
        }
        ScaleOption::On => {
            let params = compute_scale_params(table, predictors, true)?;
            (standardize(table, &params)?, Some(params))
        }
    };

    let ctx = FitContext {
        table: &working,
        response,
        y: &y,
        weights: &weights,
        family: config.family,
        link: config.link,
        irls: IrlsConfig {
            method: config.method,
            ..IrlsConfig::default()
        },
    };
    let executor = Executor::from_cores(config.cores);
    let phase_options = PhaseOptions {
        remove_invalid: config.remove_invalid,
        fail_if_no_valid: config.fail_if_no_valid,
        verbose: config.verbose,
    };

    let is_factor: Vec<bool> = predictors.iter().map(|&p| working.is_factor(p)).collect();
    let groups = generate_term_groups(
        predictors,
        &is_factor,
        effective_n,
        config.pres_per_term_initial,
        config.quadratic,
        config.interaction,
    );

    // -------------------------------------------------- CONSTRUCT skipped
    if !config.construct {
        if config.select {
            warn!("model selection requires construction; skipping selection");
        }
        let maximal = groups
            .iter()
            .fold(TermSet::new(), |acc, group| acc.union(group));
        if config.verbose {
            info!("direct fit of maximal model {}", maximal.formula(response));
        }
        return single_model_output(&ctx, &maximal, scale_params, config, &outputs);
    }

    // ---------------------------------------------------------- CONSTRUCT
    let ranked_groups =
        match rank_candidates(&ctx, &groups, &executor, &phase_options, "construction")? {
            Some(ranked) => ranked,
            None => return Ok(TrainGlmOutput::empty()),
        };

    let group_sets: Vec<TermSet> = ranked_groups.iter().map(|s| s.terms.clone()).collect();
    let full = assemble_full_model(
        &group_sets,
        effective_n,
        config.max_terms,
        config.pres_per_term_final,
    );
    if config.verbose {
        info!("full model: {}", full.formula(response));
    }

    // ------------------------------------------------------------- SELECT
    if !config.select {
        // The assembled full model is the model; the construction ranking
        // is the audit trail.
        let mut output =
            single_model_output(&ctx, &full, scale_params.clone(), config, &outputs)?;
        if outputs.tuning {
            output.tuning = Some(TuningTable::from_summaries(&ranked_groups));
        }
        if outputs.all_models {
            output.models = Some(refit_all(&ctx, &ranked_groups, scale_params));
        }
        return Ok(output);
    }

    let candidates = enumerate_model_subsets(&full, config.intercept_only);
    let ranked = match rank_candidates(&ctx, &candidates, &executor, &phase_options, "selection")? {
        Some(ranked) => ranked,
        None => return Ok(TrainGlmOutput::empty()),
    };

    if !config.remove_invalid && !ranked[0].usable() {
        warn!(
            "best-ranked model {} is degenerate (kept because remove_invalid is off)",
            ranked[0].formula
        );
    }

    // ------------------------------------------------------------- OUTPUT
    let mut output = TrainGlmOutput::empty();
    if outputs.tuning {
        output.tuning = Some(TuningTable::from_summaries(&ranked));
    }
    if outputs.best_model {
        match fit_model_matrix(&ctx, &ranked[0].terms) {
            Ok((fit, mm)) => {
                output.model = Some(finalize_model(
                    &ctx,
                    &ranked[0].terms,
                    fit,
                    mm,
                    scale_params.clone(),
                ));
            }
            Err(e) => {
                if config.fail_if_no_valid {
                    return Err(e);
                }
                warn!("refit of best model failed: {e}");
            }
        }
    }
    if outputs.all_models {
        output.models = Some(refit_all(&ctx, &ranked, scale_params));
    }
    Ok(output)
}

// =============================================================================
// Helpers
// =============================================================================

fn effective_outputs(requested: &OutputRequest) -> OutputRequest {
    if !requested.best_model && !requested.all_models && !requested.tuning {
        warn!("no output requested; returning the best model");
        return OutputRequest::default();
    }
    *requested
}

/// Effective sample size for the data-sufficiency budgets: presences for
/// binary binomial data, rows otherwise.
fn effective_sample_size(y: &Array1<f64>, family: FamilyKind) -> usize {
    let binary = y.iter().all(|&v| v == 0.0 || v == 1.0);
    if family == FamilyKind::Binomial && binary {
        y.iter().filter(|&&v| v == 1.0).count()
    } else {
        y.len()
    }
}

/// Fit one term set and package it (with the tuning row) as the entire
/// run output. Used for the construct-skipped path and the select-skipped
/// full-model fit.
fn single_model_output(
    ctx: &FitContext<'_>,
    terms: &TermSet,
    scale_params: Option<ScaleParams>,
    config: &TrainGlmConfig,
    outputs: &OutputRequest,
) -> Result<TrainGlmOutput> {
    match fit_model_matrix(ctx, terms) {
        Ok((fit, mm)) => {
            let mut output = TrainGlmOutput::empty();
            if outputs.tuning {
                let summary = crate::fit::summarize(ctx, terms, &fit, &mm);
                output.tuning = Some(TuningTable::from_summaries(&[summary]));
            }
            let model = finalize_model(ctx, terms, fit, mm, scale_params);
            if !model.converged || model.boundary {
                warn!("fitted model {} is degenerate", model.formula);
            }
            if outputs.all_models {
                output.models = Some(vec![model.clone()]);
            }
            if outputs.best_model {
                output.model = Some(model);
            }
            Ok(output)
        }
        Err(e) => {
            if config.fail_if_no_valid {
                Err(e)
            } else {
                warn!("model fit failed: {e}");
                Ok(TrainGlmOutput::empty())
            }
        }
    }
}

/// Refit every ranked candidate into a full `TrainedGlm`. A refit that
/// fails (possible only for degenerate entries kept by
/// `remove_invalid = false`) is skipped with a warning.
fn refit_all(
    ctx: &FitContext<'_>,
    ranked: &[FitSummary],
    scale_params: Option<ScaleParams>,
) -> Vec<TrainedGlm> {
    ranked
        .iter()
        .filter_map(|summary| match fit_model_matrix(ctx, &summary.terms) {
            Ok((fit, mm)) => Some(finalize_model(
                ctx,
                &summary.terms,
                fit,
                mm,
                scale_params.clone(),
            )),
            Err(e) => {
                warn!("refit of {} failed: {e}", summary.formula);
                None
            }
        })
        .collect()
}

fn finalize_model(
    ctx: &FitContext<'_>,
    terms: &TermSet,
    fit: GlmFit,
    mm: ModelMatrix,
    scale_params: Option<ScaleParams>,
) -> TrainedGlm {
    let (llf, aicc_value, n_params) = information(ctx, &fit, mm.names.len());
    let n = ctx.y.len();
    let p = mm.names.len();
    let dispersion = if ctx.family.has_free_dispersion() {
        if n > p {
            let family = ctx.family.build();
            estimate_dispersion_pearson(
                ctx.y,
                &fit.fitted_values,
                family.as_ref(),
                Some(ctx.weights),
                n - p,
            )
        } else {
            f64::NAN
        }
    } else {
        1.0
    };

    TrainedGlm {
        response: ctx.response.to_string(),
        terms: terms.clone(),
        formula: terms.formula(ctx.response),
        family: ctx.family,
        link: ctx.link,
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
        n_obs: n,
        dispersion,
        scale: scale_params,
        coef_values: fit.coefficients,
        covariance_unscaled: fit.covariance_unscaled,
        factor_levels: mm.factor_levels,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Gaussian data: y = 2 + 3·x2 + small deterministic noise; x1 is an
    /// unrelated cyclic nuisance predictor.
    fn gaussian_table(n: usize) -> DataTable {
        let mut table = DataTable::new();
        let x1: Vec<f64> = (0..n).map(|i| (i % 7) as f64).collect();
        let x2: Vec<f64> = (0..n).map(|i| i as f64 / 4.0).collect();
        let noise: Vec<f64> = (0..n).map(|i| ((i * 37 % 11) as f64 - 5.0) / 10.0).collect();
        let y: Vec<f64> = x2
            .iter()
            .zip(noise.iter())
            .map(|(v, e)| 2.0 + 3.0 * v + e)
            .collect();
        table.add_numeric("x1", x1).unwrap();
        table.add_numeric("x2", x2).unwrap();
        table.add_numeric("y", y).unwrap();
        table
    }

    fn gaussian_config() -> TrainGlmConfig {
        TrainGlmConfig {
            family: FamilyKind::Gaussian,
            weights: WeightSpec::Uniform,
            outputs: OutputRequest {
                best_model: true,
                all_models: false,
                tuning: true,
            },
            ..TrainGlmConfig::default()
        }
    }

    /// Binomial data with class overlap in both directions, so the fit is
    /// never separable.
    fn binomial_table(n: usize) -> DataTable {
        let mut table = DataTable::new();
        let x: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| {
                let base = i >= n / 2;
                // Deterministic exceptions on both sides of the split
                let flip = i % 9 == 4;
                u8::from(base != flip) as f64
            })
            .collect();
        table.add_numeric("x", x).unwrap();
        table.add_numeric("y", y).unwrap();
        table
    }

    #[test]
    fn test_train_selects_signal_predictor() {
        let table = gaussian_table(40);
        let output = train_glm(&table, "y", &["x1", "x2"], &gaussian_config()).unwrap();
        let model = output.model.unwrap();
        assert!(model.converged);
        assert!(!model.boundary);
        // x2 carries all the signal; the winning model must include it
        assert!(model.formula.contains("x2"), "formula: {}", model.formula);

        let tuning = output.tuning.unwrap();
        assert!(!tuning.is_empty());
        // Ranked ascending by AICc
        for pair in tuning.rows.windows(2) {
            assert!(pair[0].aicc <= pair[1].aicc);
        }
        assert_eq!(tuning.best().unwrap().formula, model.formula);
    }

    #[test]
    fn test_train_is_deterministic_and_parallel_invariant() {
        let table = gaussian_table(40);
        let config = gaussian_config();
        let parallel = TrainGlmConfig {
            cores: 3,
            ..config.clone()
        };
        let a = train_glm(&table, "y", &["x1", "x2"], &config).unwrap();
        let b = train_glm(&table, "y", &["x1", "x2"], &config).unwrap();
        let c = train_glm(&table, "y", &["x1", "x2"], &parallel).unwrap();
        let aicc_a = a.model.as_ref().unwrap().aicc;
        assert_eq!(aicc_a.to_bits(), b.model.as_ref().unwrap().aicc.to_bits());
        assert_eq!(aicc_a.to_bits(), c.model.as_ref().unwrap().aicc.to_bits());
        assert_eq!(
            a.model.unwrap().formula,
            c.model.unwrap().formula
        );
    }

    #[test]
    fn test_scale_params_stored_and_reused_in_prediction() {
        // Single predictor with mean 50, sd 10; select off so the model is
        // exactly y ~ elev
        let mut table = DataTable::new();
        table.add_numeric("elev", vec![40.0, 50.0, 60.0]).unwrap();
        let y: Vec<f64> = [40.0, 50.0, 60.0]
            .iter()
            .map(|x| 2.0 + 3.0 * ((x - 50.0) / 10.0))
            .collect();
        table.add_numeric("y", y).unwrap();

        let config = TrainGlmConfig {
            family: FamilyKind::Gaussian,
            weights: WeightSpec::Uniform,
            scale: ScaleOption::On,
            select: false,
            quadratic: false,
            interaction: false,
            pres_per_term_initial: 0,
            pres_per_term_final: 0,
            ..TrainGlmConfig::default()
        };
        let output = train_glm(&table, "y", &["elev"], &config).unwrap();
        let model = output.model.unwrap();

        let (mean, sd) = model.scale.as_ref().unwrap().get("elev").unwrap();
        assert_abs_diff_eq!(mean, 50.0, epsilon = 1e-10);
        assert_abs_diff_eq!(sd, 10.0, epsilon = 1e-10);

        // Prediction on new RAW data must reuse the stored transform:
        // elev = 60 → z = 1 → y = 2 + 3 = 5
        let mut new_table = DataTable::new();
        new_table.add_numeric("elev", vec![60.0, 50.0]).unwrap();
        let pred = model.predict(&new_table).unwrap();
        assert_abs_diff_eq!(pred[0], 5.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pred[1], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_construct_false_skips_selection_with_direct_fit() {
        let table = gaussian_table(40);
        let config = TrainGlmConfig {
            construct: false,
            select: true,
            ..gaussian_config()
        };
        let output = train_glm(&table, "y", &["x1", "x2"], &config).unwrap();
        let model = output.model.unwrap();
        // The maximal term set: both mains, both quadratics, the interaction
        assert_eq!(
            model.formula,
            "y ~ x1 + x2 + I(x1^2) + I(x2^2) + x1:x2"
        );
        // No subset search happened: the tuning table has exactly one row
        assert_eq!(output.tuning.unwrap().len(), 1);
    }

    #[test]
    fn test_exhaustion_raises_or_recovers() {
        // A constant predictor is collinear with the intercept: every
        // candidate fit is degenerate
        let mut table = DataTable::new();
        table.add_numeric("flat", vec![1.0; 30]).unwrap();
        table
            .add_numeric("y", (0..30).map(|i| i as f64).collect())
            .unwrap();

        let strict = TrainGlmConfig {
            family: FamilyKind::Gaussian,
            weights: WeightSpec::Uniform,
            quadratic: false,
            interaction: false,
            ..TrainGlmConfig::default()
        };
        let result = train_glm(&table, "y", &["flat"], &strict);
        assert!(matches!(result, Err(SdmGlmError::NoUsableModel(_))));

        let lenient = TrainGlmConfig {
            fail_if_no_valid: false,
            ..strict
        };
        let output = train_glm(&table, "y", &["flat"], &lenient).unwrap();
        assert!(output.model.is_none());
        assert!(output.models.is_none());
        assert!(output.tuning.is_none());
    }

    #[test]
    fn test_binomial_end_to_end_with_balanced_weights() {
        let table = binomial_table(60);
        let config = TrainGlmConfig {
            outputs: OutputRequest {
                best_model: true,
                all_models: true,
                tuning: true,
            },
            ..TrainGlmConfig::default()
        };
        let output = train_glm(&table, "y", &["x"], &config).unwrap();
        let model = output.model.unwrap();
        assert!(model.converged);
        assert!(!model.boundary);
        // Occurrence probability must rise with x
        let mut probe = DataTable::new();
        probe.add_numeric("x", vec![5.0, 55.0]).unwrap();
        let pred = model.predict(&probe).unwrap();
        assert!(pred[1] > pred[0]);
        assert!(pred.iter().all(|&p| (0.0..=1.0).contains(&p)));

        // All-models output is ranked the same way as the tuning table
        let models = output.models.unwrap();
        let tuning = output.tuning.unwrap();
        assert_eq!(models.len(), tuning.len());
        assert_eq!(models[0].formula, tuning.best().unwrap().formula);
    }

    #[test]
    fn test_null_model_wins_without_signal() {
        // Alternating response carries no information about x
        let mut table = DataTable::new();
        table
            .add_numeric("x", (0..40).map(|i| i as f64).collect())
            .unwrap();
        table
            .add_numeric("y", (0..40).map(|i| (i % 2) as f64).collect())
            .unwrap();
        let config = TrainGlmConfig {
            quadratic: false,
            interaction: false,
            ..TrainGlmConfig::default()
        };
        let output = train_glm(&table, "y", &["x"], &config).unwrap();
        assert_eq!(output.model.unwrap().formula, "y ~ 1");
    }

    #[test]
    fn test_unknown_predictor_rejected_up_front() {
        let table = gaussian_table(10);
        let result = train_glm(&table, "y", &["nope"], &gaussian_config());
        assert!(matches!(result, Err(SdmGlmError::UnknownColumn(_))));
    }

    #[test]
    fn test_summary_renders_coefficient_table() {
        let table = gaussian_table(40);
        let output = train_glm(&table, "y", &["x1", "x2"], &gaussian_config()).unwrap();
        let text = output.model.unwrap().summary();
        assert!(text.contains("(Intercept)"));
        assert!(text.contains("Estimate"));
        assert!(text.contains("AICc"));
    }

    #[test]
    fn test_factor_predictor_round_trip() {
        // Habitat shifts the mean; the factor must survive training and
        // prediction with its stored encoding
        let n = 40;
        let mut table = DataTable::new();
        let habitat: Vec<&str> = (0..n).map(|i| if i % 2 == 0 { "bog" } else { "scrub" }).collect();
        let x: Vec<f64> = (0..n).map(|i| i as f64 / 4.0).collect();
        let y: Vec<f64> = (0..n)
            .map(|i| {
                let shift = if i % 2 == 0 { 0.0 } else { 4.0 };
                1.0 + 0.5 * (i as f64 / 4.0) + shift + ((i * 31 % 7) as f64 - 3.0) / 10.0
            })
            .collect();
        table.add_factor("habitat", &habitat).unwrap();
        table.add_numeric("x", x).unwrap();
        table.add_numeric("y", y).unwrap();

        let config = TrainGlmConfig {
            family: FamilyKind::Gaussian,
            weights: WeightSpec::Uniform,
            quadratic: false,
            interaction: false,
            ..TrainGlmConfig::default()
        };
        let output = train_glm(&table, "y", &["x", "habitat"], &config).unwrap();
        let model = output.model.unwrap();
        assert!(model.formula.contains("habitat"));

        let mut probe = DataTable::new();
        probe.add_factor("habitat", &["scrub", "bog"]).unwrap();
        probe.add_numeric("x", vec![2.0, 2.0]).unwrap();
        let pred = model.predict(&probe).unwrap();
        // scrub sits ~4 above bog at the same x
        assert!(pred[0] - pred[1] > 2.0);
    }
}
