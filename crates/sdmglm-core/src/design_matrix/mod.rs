// =============================================================================
// Design Matrix Building Blocks
// =============================================================================
//
// Fast categorical encoding and interaction-column construction. The term
// engine upstream decides WHICH columns a model needs; this module knows
// HOW to materialize them:
//
//   - factorize:            string values → (sorted unique levels, codes)
//   - encode_categorical:   codes → treatment-coded dummy block
//   - interaction products: element-wise products of column blocks
//
// Treatment coding drops the first (reference) level, matching the
// statsmodels/R convention, so a factor with L levels contributes L-1
// columns named `var[T.level]`.
//
// =============================================================================

use std::collections::HashMap;

use ndarray::{Array1, Array2};

/// A dummy-coded categorical block: one column per non-reference level.
#[derive(Debug, Clone)]
pub struct EncodedCategorical {
    pub matrix: Array2<f64>,
    pub names: Vec<String>,
}

/// Map string values to sorted unique levels and per-observation codes.
pub fn factorize(values: &[&str]) -> (Vec<String>, Vec<u32>) {
    let mut levels: Vec<String> = values.iter().map(|s| s.to_string()).collect();
    levels.sort();
    levels.dedup();

    let index: HashMap<&str, u32> = levels
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i as u32))
        .collect();

    let codes = values.iter().map(|s| index[s]).collect();
    (levels, codes)
}

/// Build the treatment-coded dummy block for pre-computed level codes.
///
/// `levels[0]` is the reference and gets no column. Codes must be valid
/// indices into `levels`; the caller guarantees this by construction.
pub fn encode_categorical(codes: &[u32], levels: &[String], var_name: &str) -> EncodedCategorical {
    let n = codes.len();
    let k = levels.len().saturating_sub(1);
    let mut matrix = Array2::zeros((n, k));
    for (i, &code) in codes.iter().enumerate() {
        if code > 0 {
            matrix[[i, code as usize - 1]] = 1.0;
        }
    }
    let names = levels
        .iter()
        .skip(1)
        .map(|level| format!("{var_name}[T.{level}]"))
        .collect();
    EncodedCategorical { matrix, names }
}

/// Element-wise product of two continuous columns.
pub fn continuous_product(
    x1: &Array1<f64>,
    x2: &Array1<f64>,
    name1: &str,
    name2: &str,
) -> (Array1<f64>, String) {
    (x1 * x2, format!("{name1}:{name2}"))
}

/// Multiply every column of a block by a continuous column.
///
/// Used for categorical × continuous interactions: each dummy column gets
/// its own slope on the continuous variable.
pub fn block_times_continuous(
    block: &Array2<f64>,
    names: &[String],
    continuous: &Array1<f64>,
    cont_name: &str,
) -> (Array2<f64>, Vec<String>) {
    let mut out = block.clone();
    for (i, &c) in continuous.iter().enumerate() {
        for j in 0..out.ncols() {
            out[[i, j]] *= c;
        }
    }
    let names = names.iter().map(|n| format!("{n}:{cont_name}")).collect();
    (out, names)
}

/// All pairwise products between the columns of two blocks.
///
/// Covers categorical × categorical interactions (one column per pair of
/// non-reference levels).
pub fn block_product(
    block1: &Array2<f64>,
    names1: &[String],
    block2: &Array2<f64>,
    names2: &[String],
) -> (Array2<f64>, Vec<String>) {
    let n = block1.nrows();
    let (k1, k2) = (block1.ncols(), block2.ncols());
    let mut out = Array2::zeros((n, k1 * k2));
    let mut names = Vec::with_capacity(k1 * k2);
    for a in 0..k1 {
        for b in 0..k2 {
            let col = a * k2 + b;
            for i in 0..n {
                out[[i, col]] = block1[[i, a]] * block2[[i, b]];
            }
            names.push(format!("{}:{}", names1[a], names2[b]));
        }
    }
    (out, names)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_factorize_sorted_levels() {
        let (levels, codes) = factorize(&["forest", "alpine", "forest", "bog"]);
        assert_eq!(levels, vec!["alpine", "bog", "forest"]);
        assert_eq!(codes, vec![2, 0, 2, 1]);
    }

    #[test]
    fn test_encode_drops_reference_level() {
        let levels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let enc = encode_categorical(&[0, 1, 2, 1], &levels, "habitat");
        assert_eq!(enc.names, vec!["habitat[T.b]", "habitat[T.c]"]);
        assert_eq!(enc.matrix.ncols(), 2);
        // Row 0 is the reference: all zeros
        assert_eq!(enc.matrix[[0, 0]], 0.0);
        assert_eq!(enc.matrix[[0, 1]], 0.0);
        assert_eq!(enc.matrix[[1, 0]], 1.0);
        assert_eq!(enc.matrix[[2, 1]], 1.0);
        assert_eq!(enc.matrix[[3, 0]], 1.0);
    }

    #[test]
    fn test_single_level_factor_has_no_columns() {
        let levels = vec!["only".to_string()];
        let enc = encode_categorical(&[0, 0], &levels, "f");
        assert_eq!(enc.matrix.ncols(), 0);
        assert!(enc.names.is_empty());
    }

    #[test]
    fn test_continuous_product() {
        let (col, name) = continuous_product(&array![1.0, 2.0], &array![3.0, 4.0], "x1", "x2");
        assert_eq!(col, array![3.0, 8.0]);
        assert_eq!(name, "x1:x2");
    }

    #[test]
    fn test_block_times_continuous() {
        let block = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let names = vec!["f[T.b]".to_string(), "f[T.c]".to_string()];
        let (out, out_names) =
            block_times_continuous(&block, &names, &array![2.0, 3.0], "elev");
        assert_eq!(out[[0, 0]], 2.0);
        assert_eq!(out[[1, 1]], 3.0);
        assert_eq!(out_names, vec!["f[T.b]:elev", "f[T.c]:elev"]);
    }

    #[test]
    fn test_block_product_names_and_values() {
        let b1 = Array2::from_shape_vec((2, 1), vec![1.0, 0.0]).unwrap();
        let b2 = Array2::from_shape_vec((2, 2), vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        let (out, names) = block_product(
            &b1,
            &["f[T.b]".to_string()],
            &b2,
            &["g[T.x]".to_string(), "g[T.y]".to_string()],
        );
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out[[0, 1]], 1.0);
        assert_eq!(out[[1, 0]], 0.0);
        assert_eq!(names, vec!["f[T.b]:g[T.x]", "f[T.b]:g[T.y]"]);
    }
}
