// =============================================================================
// Observation Weights
// =============================================================================
//
// Presence/background data is usually wildly unbalanced - a few hundred
// presences against thousands of background points. Balanced weighting
// gives each class the same total weight (presences weight 1, background
// points n_presence / n_background), so the background sample drives the
// shape of the availability distribution without drowning the presences.
//
// The resolved vector is owned by the orchestrator for the whole run and
// read-only to every fit worker.
//
// =============================================================================

use log::warn;
use ndarray::Array1;

use crate::data::DataTable;
use crate::error::{Result, SdmGlmError};

/// How to weight observations.
#[derive(Debug, Clone, Default)]
pub enum WeightSpec {
    /// Every observation weighs 1.
    Uniform,

    /// Class-balanced for a binary response: presence weight 1, background
    /// weight n_presence / n_background, making the class sums equal.
    /// Falls back to uniform (with a warning) when the response is not
    /// binary 0/1 with both classes present.
    #[default]
    Balanced,

    /// Caller-supplied weights, one per row.
    Vector(Vec<f64>),

    /// Weights read from a numeric column of the data.
    Column(String),
}

fn validated(weights: Vec<f64>, n: usize, origin: &str) -> Result<Array1<f64>> {
    if weights.len() != n {
        return Err(SdmGlmError::DimensionMismatch(format!(
            "{origin} has {} weights but data has {n} rows",
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(SdmGlmError::InvalidValue(format!(
            "{origin} must contain only finite, non-negative weights"
        )));
    }
    Ok(Array1::from_vec(weights))
}

/// Resolve a weight specification against the data.
pub fn resolve_weights(
    spec: &WeightSpec,
    table: &DataTable,
    response: &Array1<f64>,
) -> Result<Array1<f64>> {
    let n = response.len();
    match spec {
        WeightSpec::Uniform => Ok(Array1::ones(n)),
        WeightSpec::Balanced => {
            let binary = response.iter().all(|&y| y == 0.0 || y == 1.0);
            let n_pres = response.iter().filter(|&&y| y == 1.0).count();
            let n_bg = n - n_pres;
            if !binary || n_pres == 0 || n_bg == 0 {
                warn!(
                    "balanced weights require a binary response with both classes; \
                     using uniform weights"
                );
                return Ok(Array1::ones(n));
            }
            let bg_weight = n_pres as f64 / n_bg as f64;
            Ok(response.mapv(|y| if y == 1.0 { 1.0 } else { bg_weight }))
        }
        WeightSpec::Vector(values) => validated(values.clone(), n, "weight vector"),
        WeightSpec::Column(name) => {
            let values = table.numeric(name)?.to_vec();
            validated(values, n, &format!("weight column '{name}'"))
        }
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

    #[test]
    fn test_balanced_class_sums_equal() {
        let y = array![1.0, 1.0, 0.0, 0.0, 0.0, 0.0];
        let w = resolve_weights(&WeightSpec::Balanced, &DataTable::new(), &y).unwrap();
        let pres_sum: f64 = y.iter().zip(w.iter()).filter(|(&y, _)| y == 1.0).map(|(_, w)| w).sum();
        let bg_sum: f64 = y.iter().zip(w.iter()).filter(|(&y, _)| y == 0.0).map(|(_, w)| w).sum();
        assert_abs_diff_eq!(pres_sum, bg_sum, epsilon = 1e-12);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[2], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_balanced_falls_back_for_nonbinary() {
        let y = array![0.5, 1.5, 2.0];
        let w = resolve_weights(&WeightSpec::Balanced, &DataTable::new(), &y).unwrap();
        assert!(w.iter().all(|&wi| wi == 1.0));
    }

    #[test]
    fn test_balanced_falls_back_for_single_class() {
        let y = array![1.0, 1.0, 1.0];
        let w = resolve_weights(&WeightSpec::Balanced, &DataTable::new(), &y).unwrap();
        assert!(w.iter().all(|&wi| wi == 1.0));
    }

    #[test]
    fn test_vector_length_checked() {
        let y = array![0.0, 1.0, 0.0];
        let result = resolve_weights(
            &WeightSpec::Vector(vec![1.0, 2.0]),
            &DataTable::new(),
            &y,
        );
        assert!(matches!(result, Err(SdmGlmError::DimensionMismatch(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let y = array![0.0, 1.0];
        let result = resolve_weights(
            &WeightSpec::Vector(vec![1.0, -2.0]),
            &DataTable::new(),
            &y,
        );
        assert!(matches!(result, Err(SdmGlmError::InvalidValue(_))));
    }

    #[test]
    fn test_column_weights() {
        let mut table = DataTable::new();
        table.add_numeric("w", vec![0.5, 2.0]).unwrap();
        let y = array![0.0, 1.0];
        let w = resolve_weights(&WeightSpec::Column("w".to_string()), &table, &y).unwrap();
        assert_eq!(w, array![0.5, 2.0]);
    }
}
