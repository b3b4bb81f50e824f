// =============================================================================
// Model Matrix Construction
// =============================================================================
//
// Turns a typed TermSet plus a DataTable into a numeric design matrix.
// Column layout is deterministic: intercept first (when requested), then
// each term's block in set order. A factor contributes its treatment-coded
// dummy block; a quadratic term contributes the squared column; an
// interaction contributes the products of its two predictors' base blocks.
//
// The levels used to encode each factor are returned so a trained model
// can encode NEW data identically - prediction passes the stored levels
// back in, and a level never seen in training is an error rather than a
// silently shifted column.
//
// =============================================================================

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use sdmglm_core::design_matrix::{
    block_product, block_times_continuous, continuous_product, encode_categorical,
};

use crate::data::{Column, DataTable};
use crate::error::{Result, SdmGlmError};
use crate::terms::{Term, TermSet};

/// A materialized design matrix with its column names and the factor level
/// sets used to encode it.
#[derive(Debug, Clone)]
pub struct ModelMatrix {
    pub matrix: Array2<f64>,
    pub names: Vec<String>,
    pub factor_levels: BTreeMap<String, Vec<String>>,
}

/// One predictor's base columns: a single numeric column, or a factor's
/// dummy block.
enum BaseBlock {
    Continuous { values: Array1<f64>, name: String },
    Dummies { matrix: Array2<f64>, names: Vec<String> },
}

fn base_block(
    table: &DataTable,
    name: &str,
    known_levels: Option<&BTreeMap<String, Vec<String>>>,
    used_levels: &mut BTreeMap<String, Vec<String>>,
) -> Result<BaseBlock> {
    match table.column(name) {
        Some(Column::Numeric(values)) => Ok(BaseBlock::Continuous {
            values: Array1::from_vec(values.clone()),
            name: name.to_string(),
        }),
        Some(Column::Factor { levels, codes }) => {
            let target: Vec<String> = match known_levels.and_then(|m| m.get(name)) {
                Some(stored) => stored.clone(),
                None => levels.clone(),
            };
            let codes = remap_codes(name, levels, codes, &target)?;
            let enc = encode_categorical(&codes, &target, name);
            used_levels.insert(name.to_string(), target);
            Ok(BaseBlock::Dummies {
                matrix: enc.matrix,
                names: enc.names,
            })
        }
        None => Err(SdmGlmError::UnknownColumn(name.to_string())),
    }
}

/// Re-express factor codes against a target level set (the one captured at
/// training time). A value outside the target set cannot be encoded.
fn remap_codes(
    name: &str,
    levels: &[String],
    codes: &[u32],
    target: &[String],
) -> Result<Vec<u32>> {
    if levels == target {
        return Ok(codes.to_vec());
    }
    let position: BTreeMap<&str, u32> = target
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i as u32))
        .collect();
    codes
        .iter()
        .map(|&c| {
            let value = levels[c as usize].as_str();
            position.get(value).copied().ok_or_else(|| {
                SdmGlmError::InvalidValue(format!(
                    "factor '{name}' has level '{value}' not seen in training"
                ))
            })
        })
        .collect()
}

/// Build the design matrix for a term set.
///
/// `known_levels` carries a trained model's factor encodings; pass `None`
/// at training time to derive them from the table.
pub fn build_model_matrix(
    table: &DataTable,
    terms: &TermSet,
    intercept: bool,
    known_levels: Option<&BTreeMap<String, Vec<String>>>,
) -> Result<ModelMatrix> {
    let n = table.nrows();
    let mut used_levels = BTreeMap::new();
    let mut blocks: Vec<(Array2<f64>, Vec<String>)> = Vec::with_capacity(terms.len());

    for term in terms.iter() {
        let block = match term {
            Term::Linear(x) => match base_block(table, x, known_levels, &mut used_levels)? {
                BaseBlock::Continuous { values, name } => {
                    (values.insert_axis(ndarray::Axis(1)), vec![name])
                }
                BaseBlock::Dummies { matrix, names } => (matrix, names),
            },
            Term::Quadratic(x) => {
                let values = table.numeric(x).map_err(|_| {
                    SdmGlmError::InvalidValue(format!(
                        "quadratic term requires a numeric predictor, but '{x}' is not"
                    ))
                })?;
                let squared: Array1<f64> = values.iter().map(|v| v * v).collect();
                (
                    squared.insert_axis(ndarray::Axis(1)),
                    vec![format!("I({x}^2)")],
                )
            }
            Term::Interaction(a, b) => {
                let left = base_block(table, a, known_levels, &mut used_levels)?;
                let right = base_block(table, b, known_levels, &mut used_levels)?;
                interaction_block(left, right)
            }
        };
        blocks.push(block);
    }

    let total_cols =
        usize::from(intercept) + blocks.iter().map(|(m, _)| m.ncols()).sum::<usize>();
    let mut matrix = Array2::zeros((n, total_cols));
    let mut names = Vec::with_capacity(total_cols);

    let mut col = 0;
    if intercept {
        matrix.column_mut(0).fill(1.0);
        names.push("(Intercept)".to_string());
        col = 1;
    }
    for (block, block_names) in blocks {
        for j in 0..block.ncols() {
            matrix.column_mut(col).assign(&block.column(j));
            col += 1;
        }
        names.extend(block_names);
    }

    Ok(ModelMatrix {
        matrix,
        names,
        factor_levels: used_levels,
    })
}

fn interaction_block(left: BaseBlock, right: BaseBlock) -> (Array2<f64>, Vec<String>) {
    match (left, right) {
        (
            BaseBlock::Continuous { values: v1, name: n1 },
            BaseBlock::Continuous { values: v2, name: n2 },
        ) => {
            let (col, name) = continuous_product(&v1, &v2, &n1, &n2);
            (col.insert_axis(ndarray::Axis(1)), vec![name])
        }
        (
            BaseBlock::Dummies { matrix, names },
            BaseBlock::Continuous { values, name },
        )
        | (
            BaseBlock::Continuous { values, name },
            BaseBlock::Dummies { matrix, names },
        ) => {
            let (out, out_names) = block_times_continuous(&matrix, &names, &values, &name);
            (out, out_names)
        }
        (
            BaseBlock::Dummies { matrix: m1, names: n1 },
            BaseBlock::Dummies { matrix: m2, names: n2 },
        ) => block_product(&m1, &n1, &m2, &n2),
    }
}

// =============================================================================
// Tests
// =============================================================================
