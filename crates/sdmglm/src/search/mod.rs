// =============================================================================
// Model Search
// =============================================================================
//
// The two-phase AICc search over candidate models:
//
//   construction  fit every candidate term group as its own one-term
//                 model and rank the groups  (rank_candidates)
//   assembly      greedily grow the "full" model from the ranked groups
//                 under the term and data budgets  (assemble.rs)
//   selection     enumerate all marginality-respecting subsets of the
//                 full model, fit them all, rank  (subsets.rs +
//                 rank_candidates again)
//
// Both fitting phases share one shape: fan the candidates out through the
// executor, fan the summaries back in, drop the degenerate ones, sort by
// AICc. `rank_candidates` is that shape.
//
// =============================================================================

pub mod assemble;
pub mod subsets;
pub mod tuning;

use log::{info, warn};

use crate::error::{Result, SdmGlmError};
use crate::executor::Executor;
use crate::fit::{fit_candidate, FitContext, FitSummary};
use crate::terms::TermSet;

pub use assemble::assemble_full_model;
pub use subsets::enumerate_model_subsets;
pub use tuning::{TuningRow, TuningTable};

/// Validity policy for a search phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseOptions {
    /// Drop candidates that did not converge or hit a boundary estimate.
    pub remove_invalid: bool,

    /// If every candidate is dropped: `true` raises `NoUsableModel`,
    /// `false` returns `Ok(None)` with a warning.
    pub fail_if_no_valid: bool,

    /// Emit progress via `log::info!`.
    pub verbose: bool,
}

/// Fit every candidate and rank by AICc.
///
/// One parallel fan-out/fan-in barrier: all candidates are fitted (each
/// absorbing its own numerical failures) before ranking starts. The sort
/// is stable, so AICc ties keep enumeration order and repeated runs over
/// identical input produce identically ordered results.
///
/// Returns `Ok(None)` only in the exhaustion case with
/// `fail_if_no_valid = false`; otherwise `Some` of the ranked summaries
/// (which still contain degenerate entries when `remove_invalid` is off).
pub fn rank_candidates(
    ctx: &FitContext<'_>,
    candidates: &[TermSet],
    executor: &Executor,
    options: &PhaseOptions,
    phase: &'static str,
) -> Result<Option<Vec<FitSummary>>> {
    if options.verbose {
        info!(
            "{phase} phase: fitting {} candidate models",
            candidates.len()
        );
    }

    let mut summaries: Vec<FitSummary> =
        executor.run(candidates.len(), |i| fit_candidate(ctx, &candidates[i]));

    if options.remove_invalid {
        summaries.retain(FitSummary::usable);
    }

    if summaries.is_empty() {
        if options.fail_if_no_valid {
            return Err(SdmGlmError::NoUsableModel(phase));
        }
        warn!("every candidate in the {phase} phase was degenerate; no usable model");
        return Ok(None);
    }

    summaries.sort_by(|a, b| a.aicc.total_cmp(&b.aicc));

    if options.verbose {
        info!(
            "{phase} phase: best model {} (AICc {:.3})",
            summaries[0].formula, summaries[0].aicc
        );
    }

    Ok(Some(summaries))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{FamilyKind, LinkKind};
    use crate::terms::Term;
    use ndarray::Array1;
    use sdmglm_core::solvers::IrlsConfig;

    fn quadratic_data() -> (crate::data::DataTable, Array1<f64>) {
        // y depends on x2 quadratically and not on x1 at all
        let mut table = crate::data::DataTable::new();
        let x1: Vec<f64> = (0..40).map(|i| (i % 7) as f64).collect();
        let x2: Vec<f64> = (0..40).map(|i| i as f64 / 4.0).collect();
        let y: Vec<f64> = x2.iter().map(|v| 3.0 + (v - 5.0) * (v - 5.0)).collect();
        table.add_numeric("x1", x1).unwrap();
        table.add_numeric("x2", x2).unwrap();
        table.add_numeric("y", y.clone()).unwrap();
        (table, Array1::from_vec(y))
    }

    fn options() -> PhaseOptions {
        PhaseOptions {
            remove_invalid: true,
            fail_if_no_valid: true,
            verbose: false,
        }
    }

    #[test]
    fn test_ranking_prefers_true_structure() {
        let (table, y) = quadratic_data();
        let w = Array1::ones(y.len());
        let ctx = FitContext {
            table: &table,
            response: "y",
            y: &y,
            weights: &w,
            family: FamilyKind::Gaussian,
            link: LinkKind::Canonical,
            irls: IrlsConfig::default(),
        };
        let candidates = vec![
            TermSet::from_terms([Term::Linear("x1".to_string())]),
            TermSet::from_terms([Term::Quadratic("x2".to_string())]),
            TermSet::from_terms([Term::Linear("x2".to_string())]),
        ];
        let ranked = rank_candidates(&ctx, &candidates, &Executor::Sequential, &options(), "construction")
            .unwrap()
            .unwrap();
        // The quadratic group explains the data exactly and must win
        assert_eq!(ranked[0].formula, "y ~ x2 + I(x2^2)");
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let (table, y) = quadratic_data();
        let w = Array1::ones(y.len());
        let ctx = FitContext {
            table: &table,
            response: "y",
            y: &y,
            weights: &w,
            family: FamilyKind::Gaussian,
            link: LinkKind::Canonical,
            irls: IrlsConfig::default(),
        };
        let candidates = vec![
            TermSet::from_terms([Term::Linear("x1".to_string())]),
            TermSet::from_terms([Term::Linear("x2".to_string())]),
        ];
        let first = rank_candidates(&ctx, &candidates, &Executor::Sequential, &options(), "construction")
            .unwrap()
            .unwrap();
        let second = rank_candidates(&ctx, &candidates, &Executor::Sequential, &options(), "construction")
            .unwrap()
            .unwrap();
        let order1: Vec<&str> = first.iter().map(|s| s.formula.as_str()).collect();
        let order2: Vec<&str> = second.iter().map(|s| s.formula.as_str()).collect();
        assert_eq!(order1, order2);
    }

    #[test]
    fn test_parallel_ranking_matches_sequential() {
        let (table, y) = quadratic_data();
        let w = Array1::ones(y.len());
        let ctx = FitContext {
            table: &table,
            response: "y",
            y: &y,
            weights: &w,
            family: FamilyKind::Gaussian,
            link: LinkKind::Canonical,
            irls: IrlsConfig::default(),
        };
        let candidates = vec![
            TermSet::from_terms([Term::Linear("x1".to_string())]),
            TermSet::from_terms([Term::Quadratic("x2".to_string())]),
            TermSet::from_terms([Term::Linear("x2".to_string())]),
            TermSet::from_terms([Term::interaction("x1", "x2")]),
        ];
        let sequential =
            rank_candidates(&ctx, &candidates, &Executor::Sequential, &options(), "construction")
                .unwrap()
                .unwrap();
        let pooled = rank_candidates(
            &ctx,
            &candidates,
            &Executor::WorkerPool { workers: 3 },
            &options(),
            "construction",
        )
        .unwrap()
        .unwrap();
        let seq: Vec<(&str, u64)> = sequential
            .iter()
            .map(|s| (s.formula.as_str(), s.aicc.to_bits()))
            .collect();
        let par: Vec<(&str, u64)> = pooled
            .iter()
            .map(|s| (s.formula.as_str(), s.aicc.to_bits()))
            .collect();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_exhaustion_raises_when_asked() {
        let (table, y) = quadratic_data();
        let w = Array1::ones(y.len());
        let ctx = FitContext {
            table: &table,
            response: "y",
            y: &y,
            weights: &w,
            family: FamilyKind::Gaussian,
            link: LinkKind::Canonical,
            irls: IrlsConfig::default(),
        };
        // Every candidate names a missing predictor, so every fit fails
        let candidates = vec![
            TermSet::from_terms([Term::Linear("ghost1".to_string())]),
            TermSet::from_terms([Term::Linear("ghost2".to_string())]),
        ];
        let result =
            rank_candidates(&ctx, &candidates, &Executor::Sequential, &options(), "construction");
        assert!(matches!(result, Err(SdmGlmError::NoUsableModel(_))));
    }

    #[test]
    fn test_exhaustion_recovers_when_asked() {
        let (table, y) = quadratic_data();
        let w = Array1::ones(y.len());
        let ctx = FitContext {
            table: &table,
            response: "y",
            y: &y,
            weights: &w,
            family: FamilyKind::Gaussian,
            link: LinkKind::Canonical,
            irls: IrlsConfig::default(),
        };
        let candidates = vec![TermSet::from_terms([Term::Linear("ghost".to_string())])];
        let lenient = PhaseOptions {
            fail_if_no_valid: false,
            ..options()
        };
        let result =
            rank_candidates(&ctx, &candidates, &Executor::Sequential, &lenient, "construction")
                .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_kept_when_not_removing() {
        let (table, y) = quadratic_data();
        let w = Array1::ones(y.len());
        let ctx = FitContext {
            table: &table,
            response: "y",
            y: &y,
            weights: &w,
            family: FamilyKind::Gaussian,
            link: LinkKind::Canonical,
            irls: IrlsConfig::default(),
        };
        let candidates = vec![
            TermSet::from_terms([Term::Linear("ghost".to_string())]),
            TermSet::from_terms([Term::Linear("x2".to_string())]),
        ];
        let keep_all = PhaseOptions {
            remove_invalid: false,
            ..options()
        };
        let ranked =
            rank_candidates(&ctx, &candidates, &Executor::Sequential, &keep_all, "construction")
                .unwrap()
                .unwrap();
        assert_eq!(ranked.len(), 2);
        // The degenerate fit has infinite AICc and sorts last
        assert!(ranked[0].usable());
        assert!(!ranked[1].usable());
    }
}
