// =============================================================================
// Full-Model Assembly
// =============================================================================
//
// Greedy accumulation of ranked term groups into the "full" model that
// subset selection will search. Starting from the best-ranked group, each
// next group's terms are unioned in only while two budgets hold:
//
//   term budget   |terms| <= max_terms
//   data budget   sample_size / |terms| >= min_data_per_term
//
// The FIRST group that would break either budget stops accumulation -
// later groups are not considered, even if they happen to be small enough
// to fit. Single pass, no backtracking: this does not find the best
// feasible full model, just a feasible one, cheaply, and downstream
// results depend on exactly this behavior.
//
// =============================================================================

use crate::terms::TermSet;

/// Accumulate ranked term groups into the full model term set.
///
/// `ranked_groups` must be in rank order (best first); the first group is
/// always taken whole. An empty slice yields the empty (intercept-only)
/// set.
pub fn assemble_full_model(
    ranked_groups: &[TermSet],
    sample_size: usize,
    max_terms: usize,
    min_data_per_term: usize,
) -> TermSet {
    let mut full = match ranked_groups.first() {
        Some(first) => first.clone(),
        None => return TermSet::new(),
    };

    for group in &ranked_groups[1..] {
        let trial = full.union(group);
        if !within_budget(trial.len(), sample_size, max_terms, min_data_per_term) {
            break;
        }
        full = trial;
    }

    full
}

fn within_budget(
    n_terms: usize,
    sample_size: usize,
    max_terms: usize,
    min_data_per_term: usize,
) -> bool {
    if n_terms > max_terms {
        return false;
    }
    min_data_per_term == 0 || sample_size as f64 / n_terms as f64 >= min_data_per_term as f64
}

// =============================================================================
// Tests
// =============================================================================
