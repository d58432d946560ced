use crate::error::NeuroptError;
use crate::ops::linalg::matrix_dims;
use crate::tensor::Tensor;

/// Computes the inverse of a square matrix by Gauss-Jordan elimination with
/// partial pivoting.
///
/// A pivot smaller than `n * ε * max|A|` is treated as zero.
///
/// # Errors
/// * `ShapeMismatch` if `a` is not a square matrix.
/// * `SingularMatrix` if `a` has no numerically stable inverse.
pub fn inverse(a: &Tensor) -> Result<Tensor, NeuroptError> {
    let (n, cols) = matrix_dims(a, "inverse")?;
    if n != cols {
        return Err(NeuroptError::ShapeMismatch {
            expected: vec![n, n],
            actual: a.shape().to_vec(),
            operation: "inverse".to_string(),
        });
    }

    let max_abs = a.data().iter().fold(0.0_f64, |m, &x| m.max(x.abs()));
    if n > 0 && max_abs == 0.0 {
        return Err(NeuroptError::SingularMatrix { size: n });
    }
    let tolerance = n as f64 * f64::EPSILON * max_abs;

    let mut lhs = a.data().to_vec();
    let mut rhs = crate::tensor::eye(n).into_data();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| lhs[r1 * n + col].abs().total_cmp(&lhs[r2 * n + col].abs()))
            .unwrap_or(col);
        let pivot = lhs[pivot_row * n + col];
        if !pivot.is_finite() || pivot.abs() <= tolerance {
            log::debug!("inverse: pivot {:e} in column {} below tolerance {:e}", pivot, col, tolerance);
            return Err(NeuroptError::SingularMatrix { size: n });
        }
        if pivot_row != col {
            for j in 0..n {
                lhs.swap(col * n + j, pivot_row * n + j);
                rhs.swap(col * n + j, pivot_row * n + j);
            }
        }

        let inv_pivot = 1.0 / pivot;
        for j in 0..n {
            lhs[col * n + j] *= inv_pivot;
            rhs[col * n + j] *= inv_pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = lhs[row * n + col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n {
                lhs[row * n + j] -= factor * lhs[col * n + j];
                rhs[row * n + j] -= factor * rhs[col * n + j];
            }
        }
    }

    Tensor::new(rhs, vec![n, n])
}
