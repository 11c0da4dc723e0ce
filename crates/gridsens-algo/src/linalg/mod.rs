//! Dense linear algebra used by the sensitivity kernels.
//!
//! - [`direct_inverse`]: LU inverse of a dense matrix (faer, partial pivoting)
//! - [`block`]: Schur-complement block inversion for matrices too large to
//!   factor in one pass
//!
//! Sparse inputs are densified before inversion; the inverse of a connected
//! network's admittance matrix has no zeros worth storing.

pub mod block;

pub use block::{invert, BlockInverter, DEFAULT_BLOCK_SIZE};

use faer::solvers::{PartialPivLu, SolverCore};
use faer::{Mat, MatRef};
use gridsens_core::ErrorKind;
use sprs::CsMat;
use thiserror::Error;

/// Bound on `scale · max|A⁻¹|`. Past it the inverse carries relative errors
/// above 1e-4 and the matrix is reported singular.
pub const CONDITION_LIMIT: f64 = 1e-4 / f64::EPSILON;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InversionError {
    #[error("Matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("Block size must be at least 1")]
    ZeroBlockSize,

    #[error("Matrix of dimension {dim} is singular or nearly singular")]
    Singular { dim: usize },
}

impl InversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InversionError::NotSquare { .. } => ErrorKind::Data,
            InversionError::ZeroBlockSize => ErrorKind::Configuration,
            InversionError::Singular { .. } => ErrorKind::Numerical,
        }
    }
}

/// Invert a square matrix in one LU factorization.
///
/// The inverse is judged against the matrix's own largest entry; see
/// [`direct_inverse_scaled`]. An empty matrix inverts to an empty matrix.
pub fn direct_inverse(matrix: MatRef<'_, f64>) -> Result<Mat<f64>, InversionError> {
    direct_inverse_scaled(matrix, max_abs(matrix))
}

/// Invert `matrix`, rejecting it as singular when the inverse is not finite
/// or `scale · max|A⁻¹|` exceeds [`CONDITION_LIMIT`].
///
/// `scale` is the magnitude the matrix should be measured against: the
/// whole input when `matrix` is one block of it, or 1 for a perturbation of
/// the identity whose own entries may all be tiny.
pub fn direct_inverse_scaled(
    matrix: MatRef<'_, f64>,
    scale: f64,
) -> Result<Mat<f64>, InversionError> {
    let n = check_square(matrix)?;
    if n == 0 {
        return Ok(Mat::zeros(0, 0));
    }

    let lu = PartialPivLu::new(matrix);
    let inverse = lu.inverse();
    check_conditioning(inverse.as_ref(), scale)?;
    Ok(inverse)
}

pub(crate) fn check_conditioning(
    inverse: MatRef<'_, f64>,
    scale: f64,
) -> Result<(), InversionError> {
    let output_scale = max_abs(inverse);
    if !output_scale.is_finite() || scale * output_scale > CONDITION_LIMIT {
        return Err(InversionError::Singular {
            dim: inverse.nrows(),
        });
    }
    Ok(())
}

pub(crate) fn check_square(matrix: MatRef<'_, f64>) -> Result<usize, InversionError> {
    let (rows, cols) = (matrix.nrows(), matrix.ncols());
    if rows != cols {
        return Err(InversionError::NotSquare { rows, cols });
    }
    Ok(rows)
}

/// Largest absolute entry; NaN propagates as infinity.
pub(crate) fn max_abs(matrix: MatRef<'_, f64>) -> f64 {
    let mut max = 0.0_f64;
    for j in 0..matrix.ncols() {
        for i in 0..matrix.nrows() {
            let v = matrix.read(i, j);
            if v.is_nan() {
                return f64::INFINITY;
            }
            max = max.max(v.abs());
        }
    }
    max
}

/// Densify a sparse matrix.
pub fn dense_from_sparse(matrix: &CsMat<f64>) -> Mat<f64> {
    let (rows, cols) = matrix.shape();
    let mut dense = Mat::zeros(rows, cols);
    for (&val, (i, j)) in matrix.iter() {
        dense.write(i, j, dense.read(i, j) + val);
    }
    dense
}

/// Dense matrix from row vectors (all rows must share one length).
pub fn dense_from_rows(rows: &[Vec<f64>]) -> Mat<f64> {
    let ncols = rows.first().map_or(0, Vec::len);
    Mat::from_fn(rows.len(), ncols, |i, j| rows[i][j])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_inverse_2x2() {
        let m = Mat::from_fn(2, 2, |i, j| [[4.0, 7.0], [2.0, 6.0]][i][j]);
        let inv = direct_inverse(m.as_ref()).unwrap();
        let expected = [[0.6, -0.7], [-0.2, 0.4]];
        for i in 0..2 {
            for j in 0..2 {
                assert!((inv.read(i, j) - expected[i][j]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_singular_detected() {
        let m = Mat::from_fn(2, 2, |i, j| [[1.0, 2.0], [2.0, 4.0]][i][j]);
        assert!(matches!(
            direct_inverse(m.as_ref()),
            Err(InversionError::Singular { dim: 2 })
        ));
    }

    #[test]
    fn test_zero_row_detected() {
        let m = Mat::from_fn(3, 3, |i, j| if i == 2 { 0.0 } else { (3 * i + j + 1) as f64 });
        assert!(matches!(
            direct_inverse(m.as_ref()),
            Err(InversionError::Singular { .. })
        ));
    }

    #[test]
    fn test_tiny_scalar_rejected_against_unit_scale() {
        // 1 - (1 - 1e-16): what an islanding outage leaves on the diagonal
        let m = Mat::from_fn(1, 1, |_, _| 1.0 - (1.0 - 1e-16));
        assert!(direct_inverse(m.as_ref()).is_ok());
        assert!(matches!(
            direct_inverse_scaled(m.as_ref(), 1.0),
            Err(InversionError::Singular { dim: 1 })
        ));
    }

    #[test]
    fn test_well_conditioned_small_matrix_accepted_at_unit_scale() {
        let m = Mat::from_fn(2, 2, |i, j| [[0.02, 0.01], [0.0, 0.05]][i][j]);
        let inv = direct_inverse_scaled(m.as_ref(), 1.0).unwrap();
        assert!((inv.read(0, 0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_not_square() {
        let m = Mat::<f64>::zeros(2, 3);
        let err = match direct_inverse(m.as_ref()) {
            Err(err) => err,
            Ok(_) => panic!("2x3 matrix inverted"),
        };
        assert_eq!(err, InversionError::NotSquare { rows: 2, cols: 3 });
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_empty_matrix() {
        let m = Mat::<f64>::zeros(0, 0);
        assert_eq!(direct_inverse(m.as_ref()).unwrap().nrows(), 0);
    }

    #[test]
    fn test_dense_helpers() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let dense = dense_from_rows(&rows);
        assert_eq!((dense.nrows(), dense.ncols()), (2, 3));
        assert_eq!(dense.read(1, 0), 4.0);

        let mut triplets = sprs::TriMat::new((2, 2));
        triplets.add_triplet(0, 1, 2.5);
        triplets.add_triplet(0, 1, 0.5);
        let dense = dense_from_sparse(&triplets.to_csr());
        assert_eq!(dense.read(0, 1), 3.0);
        assert_eq!(dense.read(1, 1), 0.0);
    }
}
