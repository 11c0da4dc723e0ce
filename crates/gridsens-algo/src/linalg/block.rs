//! Block-partitioned matrix inversion.
//!
//! Dense LU is efficient up to a few thousand rows and then runs out of
//! memory bandwidth long before it runs out of arithmetic. For larger
//! matrices the input is carved from the top-left into `block_size` square
//! blocks, leaving a trailing submatrix no larger than `block_size`:
//!
//! ```text
//!     ┌────┬──────────────┐
//!     │ A₀ │      B₀      │
//!     ├────┼────┬─────────┤
//!     │    │ A₁ │   B₁    │
//!     │ C₀ ├────┼─────────┤
//!     │    │ C₁ │    D    │
//!     └────┴────┴─────────┘
//! ```
//!
//! `D` is inverted directly, then each level is folded back in from the
//! innermost outward using the Schur complement:
//!
//! ```text
//! S   = A − B·D⁻¹·C
//! A'  = S⁻¹
//! B'  = −A'·B·D⁻¹
//! C'  = −D⁻¹·C·A'
//! D'' = D⁻¹ + D⁻¹·C·A'·B·D⁻¹
//! ```
//!
//! `[[A', B'], [C', D'']]` is the inverse of the level's trailing submatrix
//! and becomes `D⁻¹` for the next level out. Levels are kept on an explicit
//! stack of borrowed views, so very large inputs never deepen the call stack.

use super::{check_conditioning, check_square, direct_inverse, direct_inverse_scaled, max_abs, InversionError};
use faer::{Mat, MatRef};
use tracing::debug;

/// Largest dimension inverted in a single LU pass by default.
pub const DEFAULT_BLOCK_SIZE: usize = 13_000;

/// Inverts square matrices, partitioning anything larger than `block_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInverter {
    block_size: usize,
}

impl Default for BlockInverter {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// One level of the partition: the leading block and its two couplings to
/// the trailing submatrix, all borrowed from the input.
struct Level<'a> {
    a: MatRef<'a, f64>,
    b: MatRef<'a, f64>,
    c: MatRef<'a, f64>,
}

impl BlockInverter {
    pub fn new(block_size: usize) -> Result<Self, InversionError> {
        if block_size == 0 {
            return Err(InversionError::ZeroBlockSize);
        }
        Ok(Self { block_size })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of Schur-complement folds needed for a matrix of dimension `n`.
    pub fn fold_count(&self, n: usize) -> usize {
        if n <= self.block_size {
            0
        } else {
            (n - 1) / self.block_size
        }
    }

    /// Invert `matrix`.
    ///
    /// When the dimension does not exceed the block size this is exactly
    /// [`direct_inverse`]; otherwise the result agrees with it to rounding.
    pub fn invert(&self, matrix: MatRef<'_, f64>) -> Result<Mat<f64>, InversionError> {
        let n = check_square(matrix)?;
        if n <= self.block_size {
            return direct_inverse(matrix);
        }

        let k = self.block_size;
        let mut levels = Vec::with_capacity(self.fold_count(n));
        let mut offset = 0;
        while n - offset > k {
            let t = n - offset - k;
            levels.push(Level {
                a: matrix.submatrix(offset, offset, k, k),
                b: matrix.submatrix(offset, offset + k, k, t),
                c: matrix.submatrix(offset + k, offset, t, k),
            });
            offset += k;
        }

        let inner = n - offset;
        debug!(
            n,
            block_size = k,
            levels = levels.len(),
            inner,
            "partitioned matrix for block inversion"
        );

        // Every block is judged against the whole input; a Schur complement
        // that cancels to rounding noise looks well scaled on its own.
        let scale = max_abs(matrix);
        let mut d_inv = direct_inverse_scaled(matrix.submatrix(offset, offset, inner, inner), scale)?;
        while let Some(level) = levels.pop() {
            debug!(
                level = levels.len(),
                leading = level.a.nrows(),
                trailing = d_inv.nrows(),
                "folding Schur complement"
            );
            d_inv = fold(&level, &d_inv, scale)?;
        }

        check_conditioning(d_inv.as_ref(), scale)?;
        Ok(d_inv)
    }
}

/// Merge one partition level into the inverse of its trailing submatrix.
fn fold(level: &Level<'_>, d_inv: &Mat<f64>, scale: f64) -> Result<Mat<f64>, InversionError> {
    let a = level.a.to_owned();
    let b = level.b.to_owned();
    let c = level.c.to_owned();

    // X = D⁻¹·C, Y = B·D⁻¹
    let x = d_inv * &c;
    let y = &b * d_inv;

    let schur = &a - &(&b * &x);
    let a_new = direct_inverse_scaled(schur.as_ref(), scale)?;

    let b_new = negate(&(&a_new * &y));
    let c_new = negate(&(&x * &a_new));
    let d_new = d_inv - &(&c_new * &y);

    let k = a_new.nrows();
    let n = k + d_new.nrows();
    Ok(Mat::from_fn(n, n, |i, j| match (i < k, j < k) {
        (true, true) => a_new.read(i, j),
        (true, false) => b_new.read(i, j - k),
        (false, true) => c_new.read(i - k, j),
        (false, false) => d_new.read(i - k, j - k),
    }))
}

fn negate(m: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| -m.read(i, j))
}

/// Invert `matrix` with the given partition threshold.
pub fn invert(matrix: MatRef<'_, f64>, block_size: usize) -> Result<Mat<f64>, InversionError> {
    BlockInverter::new(block_size)?.invert(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Symmetric, strictly diagonally dominant, hence invertible.
    fn laplacian_like(n: usize) -> Mat<f64> {
        Mat::from_fn(n, n, |i, j| {
            if i == j {
                4.0 + (i % 3) as f64
            } else if i.abs_diff(j) == 1 {
                -1.0
            } else if i.abs_diff(j) == 3 {
                -0.5
            } else {
                0.0
            }
        })
    }

    fn max_abs_diff(a: &Mat<f64>, b: &Mat<f64>) -> f64 {
        let mut max = 0.0_f64;
        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                max = max.max((a.read(i, j) - b.read(i, j)).abs());
            }
        }
        max
    }

    #[test]
    fn test_fold_count() {
        let inverter = BlockInverter::new(3).unwrap();
        assert_eq!(inverter.fold_count(3), 0);
        assert_eq!(inverter.fold_count(4), 1);
        assert_eq!(inverter.fold_count(6), 1);
        assert_eq!(inverter.fold_count(7), 2);
    }

    #[test]
    fn test_large_block_size_is_direct_inverse() {
        let m = laplacian_like(8);
        let direct = direct_inverse(m.as_ref()).unwrap();
        for block_size in [8, 9, DEFAULT_BLOCK_SIZE] {
            let blocked = invert(m.as_ref(), block_size).unwrap();
            for i in 0..8 {
                for j in 0..8 {
                    assert_eq!(blocked.read(i, j), direct.read(i, j));
                }
            }
        }
    }

    #[test]
    fn test_small_block_sizes_match_direct_inverse() {
        let m = laplacian_like(11);
        let direct = direct_inverse(m.as_ref()).unwrap();
        for block_size in 1..11 {
            let blocked = invert(m.as_ref(), block_size).unwrap();
            let diff = max_abs_diff(&blocked, &direct);
            assert!(diff < 1e-10, "block_size {}: max diff {}", block_size, diff);
        }
    }

    #[test]
    fn test_product_with_input_is_identity() {
        let m = laplacian_like(10);
        let inv = invert(m.as_ref(), 4).unwrap();
        let product = &m * &inv;
        let identity = Mat::from_fn(10, 10, |i, j| if i == j { 1.0 } else { 0.0 });
        assert!(max_abs_diff(&product, &identity) < 1e-12);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let m = laplacian_like(3);
        assert!(matches!(
            invert(m.as_ref(), 0),
            Err(InversionError::ZeroBlockSize)
        ));
    }

    #[test]
    fn test_rank_deficient_without_repeated_rows_rejected_at_every_block_size() {
        // Row 2 = row 0 + row 1; every leading block alone is invertible.
        let rows = [
            [4.0, 1.0, 5.0, 2.0],
            [1.0, 3.0, 4.0, 1.0],
            [5.0, 4.0, 9.0, 3.0],
            [2.0, 1.0, 3.0, 6.0],
        ];
        let m = Mat::from_fn(4, 4, |i, j| rows[i][j]);
        for block_size in 1..=4 {
            assert!(
                matches!(
                    invert(m.as_ref(), block_size),
                    Err(InversionError::Singular { .. })
                ),
                "block_size {}",
                block_size
            );
        }
    }

    #[test]
    fn test_singular_trailing_block_propagates() {
        // Last two rows identical: singular overall.
        let mut m = laplacian_like(6);
        for j in 0..6 {
            let v = m.read(4, j);
            m.write(5, j, v);
        }
        assert!(matches!(
            invert(m.as_ref(), 2),
            Err(InversionError::Singular { .. })
        ));
    }
}
