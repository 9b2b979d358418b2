//! Linear least squares via SVD.
//!
//! Solves `minimize ||A β - y||²` for a tall design matrix `A` (more samples
//! than coefficients). Nalgebra's `QR::solve` only handles square systems, so
//! we go through the SVD and reject rank-deficient designs instead of
//! returning a minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Relative singular-value cutoff used for the rank test.
const RANK_TOL: f64 = 1e-12;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the design is rank deficient or the solution is not finite.
pub fn solve_least_squares(a: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if a.nrows() < a.ncols() || a.nrows() != y.len() {
        return None;
    }

    let svd = a.clone().svd(true, true);
    let max_sv = svd.singular_values.max();
    if !(max_sv.is_finite() && max_sv > 0.0) {
        return None;
    }
    let cutoff = max_sv * RANK_TOL;
    if svd.singular_values.iter().any(|&s| s <= cutoff) {
        return None;
    }

    let beta = svd.solve(y, cutoff).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}
