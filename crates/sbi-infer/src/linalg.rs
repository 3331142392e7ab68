//! Small dense linear-algebra helpers for the Gaussian estimator.

use ndarray::{Array1, Array2, ArrayView1};

use sbi_core::errors::ErrorInfo;
use sbi_core::SbiError;

/// Computes the lower Cholesky factor of a symmetric positive-definite matrix.
pub fn cholesky(matrix: &Array2<f64>) -> Result<Array2<f64>, SbiError> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return Err(SbiError::Train(
            ErrorInfo::new("chol-square", "Cholesky factorization needs a square matrix")
                .with_context("rows", n.to_string())
                .with_context("cols", matrix.ncols().to_string()),
        ));
    }
    let mut factor = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = matrix[[i, j]];
            for k in 0..j {
                sum -= factor[[i, k]] * factor[[j, k]];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return Err(SbiError::Train(
                        ErrorInfo::new("chol-not-spd", "matrix is not positive definite")
                            .with_context("pivot", i.to_string())
                            .with_hint("increase the jitter or supply more records"),
                    ));
                }
                factor[[i, j]] = sum.sqrt();
            } else {
                factor[[i, j]] = sum / factor[[j, j]];
            }
        }
    }
    Ok(factor)
}

/// Solves `L y = b` by forward substitution, `L` lower triangular.
pub fn solve_lower(factor: &Array2<f64>, b: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = factor.nrows();
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= factor[[i, k]] * y[k];
        }
        y[i] = sum / factor[[i, i]];
    }
    y
}

/// Solves `Lᵀ x = y` by backward substitution, `L` lower triangular.
pub fn solve_lower_transpose(factor: &Array2<f64>, y: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = factor.nrows();
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = y[i];
        for k in (i + 1)..n {
            sum -= factor[[k, i]] * x[k];
        }
        x[i] = sum / factor[[i, i]];
    }
    x
}

/// Solves `A x = b` given the lower Cholesky factor of `A`.
pub fn solve_spd(factor: &Array2<f64>, b: ArrayView1<'_, f64>) -> Array1<f64> {
    let y = solve_lower(factor, b);
    solve_lower_transpose(factor, y.view())
}

/// Log-determinant of the factored matrix, `2·Σ ln L_ii`.
pub fn log_det_from_cholesky(factor: &Array2<f64>) -> f64 {
    2.0 * factor.diag().iter().map(|value| value.ln()).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn factor_reconstructs_the_matrix() {
        let matrix = array![[4.0, 2.0], [2.0, 3.0]];
        let factor = cholesky(&matrix).unwrap();
        let rebuilt = factor.dot(&factor.t());
        for (lhs, rhs) in rebuilt.iter().zip(matrix.iter()) {
            assert!((lhs - rhs).abs() < 1e-12);
        }
    }

    #[test]
    fn spd_solve_matches_direct_inverse() {
        let matrix = array![[4.0, 2.0], [2.0, 3.0]];
        let factor = cholesky(&matrix).unwrap();
        let b = array![1.0, 2.0];
        let x = solve_spd(&factor, b.view());
        let reproduced = matrix.dot(&x);
        for (lhs, rhs) in reproduced.iter().zip(b.iter()) {
            assert!((lhs - rhs).abs() < 1e-12);
        }
    }

    #[test]
    fn non_spd_matrix_is_rejected() {
        let matrix = array![[1.0, 2.0], [2.0, 1.0]];
        let err = cholesky(&matrix).unwrap_err();
        assert_eq!(err.info().code, "chol-not-spd");
    }
}
