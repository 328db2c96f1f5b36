// posefuse_core/src/utils/linalg.rs

//! Shape-checked dense matrix helpers used by the EKF.
//!
//! `nalgebra` already panics on mismatched shapes; these wrappers turn that
//! into a `LinalgError` so a broken Jacobian surfaces as an error value.

use std::ops::Range;

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::LinalgError;

/// Determinant magnitude below which a 2x2 matrix is treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-10;

fn shape(m: &DMatrix<f64>) -> (usize, usize) {
    m.shape()
}

fn mismatch(op: &'static str, a: &DMatrix<f64>, b: &DMatrix<f64>) -> LinalgError {
    LinalgError::DimensionMismatch {
        op,
        left: shape(a),
        right: shape(b),
    }
}

pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    if a.ncols() != b.nrows() {
        return Err(mismatch("multiply", a, b));
    }
    Ok(a * b)
}

pub fn add(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    if a.shape() != b.shape() {
        return Err(mismatch("add", a, b));
    }
    Ok(a + b)
}

pub fn subtract(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    if a.shape() != b.shape() {
        return Err(mismatch("subtract", a, b));
    }
    Ok(a - b)
}

pub fn transpose(a: &DMatrix<f64>) -> DMatrix<f64> {
    a.transpose()
}

pub fn identity(n: usize) -> DMatrix<f64> {
    DMatrix::identity(n, n)
}

/// Closed-form inverse of a 2x2 matrix.
///
/// A (near) singular input yields the 2x2 identity instead of NaNs. The
/// caller ends up with a degraded gain for that step, not a poisoned state.
pub fn invert2x2(a: &DMatrix<f64>) -> Result<DMatrix<f64>, LinalgError> {
    if a.shape() != (2, 2) {
        return Err(LinalgError::DimensionMismatch {
            op: "invert2x2",
            left: shape(a),
            right: (2, 2),
        });
    }

    let (m00, m01, m10, m11) = (a[(0, 0)], a[(0, 1)], a[(1, 0)], a[(1, 1)]);
    let det = m00 * m11 - m01 * m10;
    if !det.is_finite() || det.abs() < SINGULAR_DETERMINANT {
        debug!("invert2x2: singular matrix (det = {:e}), using identity", det);
        return Ok(identity(2));
    }

    let inv_det = 1.0 / det;
    Ok(DMatrix::from_row_slice(
        2,
        2,
        &[m11 * inv_det, -m01 * inv_det, -m10 * inv_det, m00 * inv_det],
    ))
}

/// Copies the block `rows x cols` out of `a`. Ranges are half-open.
pub fn submatrix(
    a: &DMatrix<f64>,
    rows: Range<usize>,
    cols: Range<usize>,
) -> Result<DMatrix<f64>, LinalgError> {
    if rows.start > rows.end || cols.start > cols.end || rows.end > a.nrows() || cols.end > a.ncols()
    {
        return Err(LinalgError::DimensionMismatch {
            op: "submatrix",
            left: shape(a),
            right: (rows.end, cols.end),
        });
    }
    Ok(a
        .view((rows.start, cols.start), (rows.len(), cols.len()))
        .into_owned())
}

/// Replaces every off-diagonal pair `(i, j)`, `(j, i)` with their average.
pub fn symmetrize(a: &mut DMatrix<f64>) -> Result<(), LinalgError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(LinalgError::DimensionMismatch {
            op: "symmetrize",
            left: shape(a),
            right: (n, n),
        });
    }
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (a[(i, j)] + a[(j, i)]);
            a[(i, j)] = avg;
            a[(j, i)] = avg;
        }
    }
    Ok(())
}

/// Largest absolute difference between `a` and its transpose.
pub fn asymmetry(a: &DMatrix<f64>) -> f64 {
    if a.nrows() != a.ncols() {
        return f64::INFINITY;
    }
    (a - a.transpose()).amax()
}
