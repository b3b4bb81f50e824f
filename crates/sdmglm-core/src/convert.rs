// =============================================================================
// ndarray ↔ nalgebra Conversion and Solve Helpers
// =============================================================================
//
// Data lives in ndarray types; decompositions run in nalgebra. This module
// centralizes the conversions and the two linear solves the IRLS loop needs,
// so solver code never touches raw element loops.
//
// =============================================================================

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray matrix to a nalgebra matrix.
///
/// Non-contiguous input is copied into standard layout first.
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let (nrows, ncols) = (a.nrows(), a.ncols());
    let contig = if a.is_standard_layout() {
        a.clone()
    } else {
        a.as_standard_layout().to_owned()
    };
    DMatrix::from_row_slice(nrows, ncols, contig.as_slice().unwrap())
}

/// Convert an ndarray vector to a nalgebra vector.
pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra matrix to an ndarray matrix.
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    let (nrows, ncols) = m.shape();
    let mut out = Array2::zeros((nrows, ncols));
    for i in 0..nrows {
        for j in 0..ncols {
            out[[i, j]] = m[(i, j)];
        }
    }
    out
}

/// Convert a nalgebra vector to an ndarray vector.
pub fn to_array1(v: &DVector<f64>) -> Array1<f64> {
    Array1::from_iter(v.iter().copied())
}

/// Solve the symmetric positive-definite system A x = b and return
/// (x, A⁻¹).
///
/// Cholesky first; LU as the fallback for systems that are positive
/// definite only up to rounding. Returns `None` when the system is
/// singular, which the solver reports as a linear-algebra error.
pub fn solve_spd_and_invert(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Option<(Array1<f64>, Array2<f64>)> {
    let p = a.nrows();
    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        let inv = chol.solve(&DMatrix::identity(p, p));
        return Some((to_array1(&x), to_array2(&inv)));
    }
    let x = a.clone().lu().solve(b)?;
    let inv = a.clone().try_inverse()?;
    Some((to_array1(&x), to_array2(&inv)))
}

/// Solve A x = b by QR decomposition and return (x, A⁻¹).
///
/// Same contract as `solve_spd_and_invert`, selected when the caller asks
/// for the QR fitting method.
pub fn solve_qr_and_invert(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Option<(Array1<f64>, Array2<f64>)> {
    let qr = a.clone().qr();
    let x = qr.solve(b)?;
    let inv = a.clone().try_inverse()?;
    Some((to_array1(&x), to_array2(&inv)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_roundtrip_matrix() {
        let a = Array2::from_shape_vec((2, 3), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let back = to_array2(&to_dmatrix(&a));
        assert_eq!(a, back);
    }

    #[test]
    fn test_roundtrip_vector() {
        let v = array![1.0, -2.0, 3.5];
        assert_eq!(v, to_array1(&to_dvector(&v)));
    }

    #[test]
    fn test_solve_spd() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[5.0, 4.0]);
        let (x, inv) = solve_spd_and_invert(&a, &b).unwrap();
        assert!((4.0 * x[0] + x[1] - 5.0).abs() < 1e-10);
        assert!((x[0] + 3.0 * x[1] - 4.0).abs() < 1e-10);
        // A · A⁻¹ = I, spot-check one entry
        assert!((4.0 * inv[[0, 0]] + inv[[1, 0]] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_solve_qr_matches_spd() {
        let a = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_row_slice(&[5.0, 4.0]);
        let (x1, _) = solve_spd_and_invert(&a, &b).unwrap();
        let (x2, _) = solve_qr_and_invert(&a, &b).unwrap();
        for i in 0..2 {
            assert!((x1[i] - x2[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_singular_system_is_none() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(solve_spd_and_invert(&a, &b).is_none());
    }
}
