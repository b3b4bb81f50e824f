// =============================================================================
// Tuning Table
// =============================================================================
//
// The audit artifact of a search run: one row per evaluated candidate, in
// AICc rank order, with the convergence/boundary flags the validity filter
// acted on. Everything a reader needs to see why the winning model won.
//
// =============================================================================

use std::fmt;

use crate::fit::FitSummary;

/// One evaluated candidate model.
#[derive(Debug, Clone)]
pub struct TuningRow {
    pub formula: String,
    pub converged: bool,
    pub boundary: bool,
    pub aicc: f64,
}

/// Candidates in AICc rank order (best first).
#[derive(Debug, Clone, Default)]
pub struct TuningTable {
    pub rows: Vec<TuningRow>,
}

impl TuningTable {
    pub fn from_summaries(summaries: &[FitSummary]) -> Self {
        let rows = summaries
            .iter()
            .map(|s| TuningRow {
                formula: s.formula.clone(),
                converged: s.converged,
                boundary: s.boundary,
                aicc: s.aicc,
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The top-ranked candidate, if any.
    pub fn best(&self) -> Option<&TuningRow> {
        self.rows.first()
    }
}

impl fmt::Display for TuningTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formula_width = self
            .rows
            .iter()
            .map(|r| r.formula.len())
            .max()
            .unwrap_or(7)
            .max(7);
        writeln!(
            f,
            "{:<formula_width$}  {:>12}  {:>9}  {:>8}",
            "formula", "AICc", "converged", "boundary"
        )?;
        for row in &self.rows {
            let aicc = if row.aicc.is_finite() {
                format!("{:.3}", row.aicc)
            } else {
                "Inf".to_string()
            };
            writeln!(
                f,
                "{:<formula_width$}  {:>12}  {:>9}  {:>8}",
                row.formula, aicc, row.converged, row.boundary
            )?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
