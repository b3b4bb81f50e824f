// =============================================================================
// Predictor Standardization
// =============================================================================
//
// Optionally center and scale continuous predictors to mean 0, sd 1 before
// fitting. Polynomial and interaction columns built from standardized
// predictors are far better conditioned, which matters when hundreds of
// small candidate models are fitted mechanically.
//
// THE ONE INVARIANT THAT MUST HOLD: the (mean, sd) pairs captured at
// training time travel with the trained model, and prediction re-applies
// exactly those values to new raw data. Recomputing statistics from new
// data would silently shift every coefficient's meaning.
//
// Factors are never scaled. A constant column (sd = 0) cannot be
// standardized; `strict` decides whether that is an error or the column is
// left alone.
//
// =============================================================================

use log::debug;

use crate::data::DataTable;
use crate::error::{Result, SdmGlmError};

/// Per-predictor standardization parameters captured at training time.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleParams {
    entries: Vec<ScaleEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScaleEntry {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
}

impl ScaleParams {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScaleEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<(f64, f64)> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| (e.mean, e.sd))
    }
}

/// Whether to standardize continuous predictors before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleOption {
    /// Standardize, silently leaving constant (sd = 0) predictors alone.
    #[default]
    Auto,

    /// Standardize, treating a constant predictor as an error.
    On,

    /// Fit on raw predictor values.
    Off,
}

/// Compute mean and sample standard deviation of each continuous predictor.
///
/// Factors are skipped. With `strict`, a constant predictor is an error;
/// otherwise it is omitted from the result (and so never transformed).
pub fn compute_scale_params(
    table: &DataTable,
    predictors: &[&str],
    strict: bool,
) -> Result<ScaleParams> {
    let mut entries = Vec::new();
    for &name in predictors {
        if table.is_factor(name) {
            continue;
        }
        let values = table.numeric(name)?;
        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        let sd = if n > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };
        if sd == 0.0 {
            if strict {
                return Err(SdmGlmError::InvalidValue(format!(
                    "predictor '{name}' is constant and cannot be standardized"
                )));
            }
            debug!("predictor '{name}' is constant; left unscaled");
            continue;
        }
        entries.push(ScaleEntry {
            name: name.to_string(),
            mean,
            sd,
        });
    }
    Ok(ScaleParams { entries })
}

/// Return a copy of the table with the parameterized columns standardized:
/// x → (x - mean) / sd. Columns not named in `params` pass through.
pub fn standardize(table: &DataTable, params: &ScaleParams) -> Result<DataTable> {
    let mut out = table.clone();
    for entry in &params.entries {
        let transformed: Vec<f64> = out
            .numeric(&entry.name)?
            .iter()
            .map(|v| (v - entry.mean) / entry.sd)
            .collect();
        out.replace_numeric(&entry.name, transformed)?;
    }
    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn table_with(name: &str, values: Vec<f64>) -> DataTable {
        let mut table = DataTable::new();
        table.add_numeric(name, values).unwrap();
        table
    }

    #[test]
    fn test_params_capture_mean_and_sd() {
        let table = table_with("elev", vec![40.0, 50.0, 60.0]);
        let params = compute_scale_params(&table, &["elev"], false).unwrap();
        let (mean, sd) = params.get("elev").unwrap();
        assert_abs_diff_eq!(mean, 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sd, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_standardize_produces_zero_mean_unit_sd() {
        let table = table_with("elev", vec![40.0, 50.0, 60.0]);
        let params = compute_scale_params(&table, &["elev"], false).unwrap();
        let scaled = standardize(&table, &params).unwrap();
        let values = scaled.numeric("elev").unwrap();
        assert_abs_diff_eq!(values[0], -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_strict_errors() {
        let table = table_with("flat", vec![5.0, 5.0, 5.0]);
        assert!(matches!(
            compute_scale_params(&table, &["flat"], true),
            Err(SdmGlmError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_constant_column_lenient_skips() {
        let table = table_with("flat", vec![5.0, 5.0, 5.0]);
        let params = compute_scale_params(&table, &["flat"], false).unwrap();
        assert!(params.is_empty());
        // Standardizing with no entries is the identity
        let scaled = standardize(&table, &params).unwrap();
        assert_eq!(scaled.numeric("flat").unwrap(), &[5.0, 5.0, 5.0]);
    }

    #[test]
    fn test_factors_are_skipped() {
        let mut table = DataTable::new();
        table.add_factor("habitat", &["a", "b", "a"]).unwrap();
        let params = compute_scale_params(&table, &["habitat"], true).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_stored_params_apply_to_new_data() {
        // Train-time params applied to different raw values must use the
        // TRAINING mean/sd, not the new data's
        let train = table_with("elev", vec![40.0, 50.0, 60.0]);
        let params = compute_scale_params(&train, &["elev"], false).unwrap();
        let new = table_with("elev", vec![70.0]);
        let scaled = standardize(&new, &params).unwrap();
        assert_abs_diff_eq!(scaled.numeric("elev").unwrap()[0], 2.0, epsilon = 1e-12);
    }
}
