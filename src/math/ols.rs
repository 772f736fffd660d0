//! Weighted least squares solver.
//!
//! The exponential trend fit reduces to one small linear regression:
//!
//! ```text
//! minimize Σ (w_i (ln y_i - x_i^T β))^2
//! ```
//!
//! with a two-column design (`[1, day]`). Callers pre-scale rows and the
//! right-hand side by `w_i` (numpy-polyfit-style residual weights), so this
//! module only ever sees an ordinary least squares problem.
//!
//! Implementation choices:
//! - SVD solves the least-squares problem robustly even when the design
//!   matrix is tall (many window days, two columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - The parameter dimension is tiny, so SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    // Very short or heavily weighted windows can produce near-collinear
    // columns, so try progressively looser tolerances before giving up.
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 1 + 0.5x on x = [0,2,4]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 2.0, 1.0, 4.0]);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-10);
        assert!((beta[1] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn least_squares_handles_overdetermined_noisy_rows() {
        // Five noisy observations of y = 2 + x; the solution stays close.
        let x = DMatrix::from_row_slice(
            5,
            2,
            &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0],
        );
        let y = DVector::from_row_slice(&[2.1, 2.9, 4.05, 5.0, 5.95]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 0.15);
        assert!((beta[1] - 1.0).abs() < 0.05);
    }
}
