// =============================================================================
// Model Terms
// =============================================================================
//
// Candidate models are sets of typed terms, never formula strings:
//
//   Linear(x)            the main effect of predictor x
//   Quadratic(x)         x², only ever present together with Linear(x)
//   Interaction(x1, x2)  x1:x2, only ever present with both main effects
//
// MARGINALITY is enforced structurally: `TermSet::insert` adds a term's
// lower-order constituents before the term itself, so a set containing a
// higher-order term always contains its prerequisites. Code downstream can
// rely on this invariant instead of re-checking it.
//
// The formula string ("y ~ x1 + I(x1^2) + x1:x2") exists only at the fit
// and reporting boundary, derived from the set on demand.
//
// =============================================================================

use std::fmt;

use itertools::Itertools;

/// A single model term over one or two predictor names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Linear(String),
    Quadratic(String),
    Interaction(String, String),
}

impl Term {
    /// An interaction term in canonical order: `a:b` and `b:a` are the
    /// same term.
    pub fn interaction(a: &str, b: &str) -> Term {
        if a <= b {
            Term::Interaction(a.to_string(), b.to_string())
        } else {
            Term::Interaction(b.to_string(), a.to_string())
        }
    }

    /// Polynomial order: 1 for main effects, 2 for quadratic and
    /// interaction terms.
    pub fn order(&self) -> usize {
        match self {
            Term::Linear(_) => 1,
            Term::Quadratic(_) | Term::Interaction(_, _) => 2,
        }
    }

    /// The lower-order terms this term requires (empty for main effects).
    pub fn constituents(&self) -> Vec<Term> {
        match self {
            Term::Linear(_) => vec![],
            Term::Quadratic(x) => vec![Term::Linear(x.clone())],
            Term::Interaction(a, b) => {
                vec![Term::Linear(a.clone()), Term::Linear(b.clone())]
            }
        }
    }

    /// Names of the predictors this term involves.
    pub fn predictors(&self) -> Vec<&str> {
        match self {
            Term::Linear(x) | Term::Quadratic(x) => vec![x],
            Term::Interaction(a, b) => vec![a, b],
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Linear(x) => write!(f, "{x}"),
            Term::Quadratic(x) => write!(f, "I({x}^2)"),
            Term::Interaction(a, b) => write!(f, "{a}:{b}"),
        }
    }
}

// =============================================================================
// Term sets
// =============================================================================

/// An ordered, duplicate-free set of terms: one candidate model (plus the
/// implicit intercept).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet {
    terms: Vec<Term>,
}

impl TermSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms<I: IntoIterator<Item = Term>>(terms: I) -> Self {
        let mut set = Self::new();
        for term in terms {
            set.insert(term);
        }
        set
    }

    /// Insert a term, first inserting any missing lower-order
    /// constituents. Duplicates are ignored. This is what makes
    /// marginality hold by construction.
    pub fn insert(&mut self, term: Term) {
        for lower in term.constituents() {
            if !self.contains(&lower) {
                self.terms.push(lower);
            }
        }
        if !self.contains(&term) {
            self.terms.push(term);
        }
    }

    pub fn contains(&self, term: &Term) -> bool {
        self.terms.contains(term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    /// Set union, keeping this set's order and appending the other's new
    /// terms in their order.
    pub fn union(&self, other: &TermSet) -> TermSet {
        let mut out = self.clone();
        for term in other.iter() {
            out.insert(term.clone());
        }
        out
    }

    /// Split into (linear, quadratic, interaction) terms, preserving set
    /// order within each class.
    pub fn partition(&self) -> (Vec<Term>, Vec<Term>, Vec<Term>) {
        let mut linear = vec![];
        let mut quadratic = vec![];
        let mut interaction = vec![];
        for term in &self.terms {
            match term {
                Term::Linear(_) => linear.push(term.clone()),
                Term::Quadratic(_) => quadratic.push(term.clone()),
                Term::Interaction(_, _) => interaction.push(term.clone()),
            }
        }
        (linear, quadratic, interaction)
    }

    /// Render the model formula. The empty set is the intercept-only
    /// model `response ~ 1`.
    pub fn formula(&self, response: &str) -> String {
        if self.terms.is_empty() {
            return format!("{response} ~ 1");
        }
        let rhs = self.terms.iter().map(Term::to_string).join(" + ");
        format!("{response} ~ {rhs}")
    }

    /// True if every higher-order term's constituents are present. Holds
    /// for any set built through `insert`; exposed for tests and debug
    /// assertions.
    pub fn respects_marginality(&self) -> bool {
        self.terms
            .iter()
            .all(|t| t.constituents().iter().all(|c| self.contains(c)))
    }
}

// =============================================================================
// Term generation
// =============================================================================

/// Generate the candidate term groups for the construction phase.
///
/// Each group is the unit the construction phase fits as its own
/// single-term model: `{x}` for a main effect, `{x, x²}` for a quadratic,
/// `{x1, x2, x1:x2}` for an interaction.
///
/// `sample_size` is the effective sample size (presences for binomial
/// data) and `min_data_per_term` the required data per term: quadratic and
/// interaction groups are emitted only when `sample_size` covers two terms
/// (`>= 2 * min_data_per_term`). Being under that threshold silently omits
/// the higher-order candidates; it is never an error.
///
/// Factors get no quadratic term (a factor cannot be squared) but do
/// participate in interactions.
pub fn generate_term_groups(
    predictors: &[&str],
    is_factor: &[bool],
    sample_size: usize,
    min_data_per_term: usize,
    quadratic: bool,
    interaction: bool,
) -> Vec<TermSet> {
    debug_assert_eq!(predictors.len(), is_factor.len());

    let mut groups: Vec<TermSet> = predictors
        .iter()
        .map(|&p| TermSet::from_terms([Term::Linear(p.to_string())]))
        .collect();

    let enough_for_two = sample_size >= 2 * min_data_per_term;

    if quadratic && enough_for_two {
        for (&p, &factor) in predictors.iter().zip(is_factor.iter()) {
            if !factor {
                groups.push(TermSet::from_terms([Term::Quadratic(p.to_string())]));
            }
        }
    }

    if interaction && enough_for_two && predictors.len() >= 2 {
        for (&a, &b) in predictors.iter().tuple_combinations() {
            groups.push(TermSet::from_terms([Term::interaction(a, b)]));
        }
    }

    groups
}

// =============================================================================
// Tests
// =============================================================================
