// =============================================================================
// Data Table
// =============================================================================
//
// A minimal column-oriented table: named columns, each numeric or factor
// (categorical), all the same length. This is the tabular-data abstraction
// the engine consumes - occurrence records with a response column (1 =
// presence, 0 = background) and one column per environmental predictor.
//
// Factors are stored factorized (sorted unique levels + per-row codes) so
// dummy encoding at fit time is a plain index lookup.
//
// =============================================================================

use ndarray::Array1;
use sdmglm_core::design_matrix::factorize;

use crate::error::{Result, SdmGlmError};

/// One column of a `DataTable`.
#[derive(Debug, Clone)]
pub enum Column {
    Numeric(Vec<f64>),
    Factor { levels: Vec<String>, codes: Vec<u32> },
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Factor { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_factor(&self) -> bool {
        matches!(self, Column::Factor { .. })
    }
}

/// Named, row-aligned columns. Rows stay aligned by construction: every
/// column added after the first must match the existing row count.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<(String, Column)>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (0 for a table with no columns).
    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |(_, c)| c.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    fn check_new_column(&self, name: &str, len: usize) -> Result<()> {
        if self.columns.iter().any(|(n, _)| n == name) {
            return Err(SdmGlmError::DuplicateColumn(name.to_string()));
        }
        if !self.columns.is_empty() && len != self.nrows() {
            return Err(SdmGlmError::DimensionMismatch(format!(
                "column '{}' has {} rows, table has {}",
                name,
                len,
                self.nrows()
            )));
        }
        Ok(())
    }

    /// Append a numeric column.
    pub fn add_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        self.check_new_column(name, values.len())?;
        self.columns.push((name.to_string(), Column::Numeric(values)));
        Ok(())
    }

    /// Append a factor column from string values. Levels are the sorted
    /// unique values.
    pub fn add_factor(&mut self, name: &str, values: &[&str]) -> Result<()> {
        self.check_new_column(name, values.len())?;
        let (levels, codes) = factorize(values);
        self.columns
            .push((name.to_string(), Column::Factor { levels, codes }));
        Ok(())
    }

    /// Replace an existing numeric column's values (used by predictor
    /// standardization). Length must match.
    pub(crate) fn replace_numeric(&mut self, name: &str, values: Vec<f64>) -> Result<()> {
        if values.len() != self.nrows() {
            return Err(SdmGlmError::DimensionMismatch(format!(
                "replacement for '{}' has {} rows, table has {}",
                name,
                values.len(),
                self.nrows()
            )));
        }
        match self.columns.iter_mut().find(|(n, _)| n == name) {
            Some((_, col @ Column::Numeric(_))) => {
                *col = Column::Numeric(values);
                Ok(())
            }
            Some(_) => Err(SdmGlmError::InvalidValue(format!(
                "column '{name}' is a factor, not numeric"
            ))),
            None => Err(SdmGlmError::UnknownColumn(name.to_string())),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn is_factor(&self, name: &str) -> bool {
        self.column(name).is_some_and(Column::is_factor)
    }

    /// Borrow a numeric column's values.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name) {
            Some(Column::Numeric(v)) => Ok(v),
            Some(Column::Factor { .. }) => Err(SdmGlmError::InvalidValue(format!(
                "column '{name}' is a factor, not numeric"
            ))),
            None => Err(SdmGlmError::UnknownColumn(name.to_string())),
        }
    }

    /// The response as an owned array. Must be a numeric column.
    pub fn response_vector(&self, name: &str) -> Result<Array1<f64>> {
        Ok(Array1::from_vec(self.numeric(name)?.to_vec()))
    }
}

// =============================================================================
// Tests
// =============================================================================
