// =============================================================================
// Marginality-Constrained Subset Enumeration
// =============================================================================
//
// Enumerate every sub-model of the full model that respects marginality:
// a quadratic or interaction term may appear only when all of its main
// effects do.
//
// Illegal combinations are never GENERATED, rather than generated and
// filtered: the outer loop walks the powerset of the full model's main
// effects, and for each main-effect subset the inner loop walks the
// powerset of only those higher-order terms whose prerequisites are all
// present. For a full model with L main effects and H higher-order terms
// this visits Σ 2^(legal H per subset) candidates instead of 2^(L+H).
//
// Higher-order terms whose main effects were never in the full model
// cannot occur here by construction - they are not in the full model
// either (the assembler unions whole marginality-closed groups).
//
// =============================================================================

use crate::terms::{Term, TermSet};

/// All marginality-respecting sub-models of `full`, in deterministic
/// order. When `include_intercept_only` is set, the empty set (the
/// intercept-only model) is the first candidate; otherwise enumeration
/// starts at the single-main-effect models.
pub fn enumerate_model_subsets(full: &TermSet, include_intercept_only: bool) -> Vec<TermSet> {
    let (linear, quadratic, interaction) = full.partition();
    let mut higher = quadratic;
    higher.extend(interaction);

    let mut out = Vec::new();

    for main_mask in 0u64..(1u64 << linear.len()) {
        let mains: Vec<&Term> = linear
            .iter()
            .enumerate()
            .filter(|(i, _)| main_mask >> i & 1 == 1)
            .map(|(_, t)| t)
            .collect();

        if mains.is_empty() && !include_intercept_only {
            continue;
        }

        // Higher-order terms whose every main effect is in this subset
        let legal: Vec<&Term> = higher
            .iter()
            .filter(|term| {
                term.predictors()
                    .iter()
                    .all(|p| mains.iter().any(|m| m.predictors() == vec![*p]))
            })
            .collect();

        for higher_mask in 0u64..(1u64 << legal.len()) {
            let mut set = TermSet::new();
            for &m in &mains {
                set.insert(m.clone());
            }
            for (i, &h) in legal.iter().enumerate() {
                if higher_mask >> i & 1 == 1 {
                    set.insert(h.clone());
                }
            }
            out.push(set);
        }
    }

    out
}

// =============================================================================
// Tests
// =============================================================================
