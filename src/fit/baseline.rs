//! Polynomial baseline estimation.
//!
//! The polynomial is fitted to a handful of user-picked `(x, y)` samples and then
//! evaluated over the *whole* unit-converted axis, so a baseline is always either
//! absent or exactly `NAXIS1` long.

use crate::coords::UnitConverter;
use crate::domain::Unit;
use crate::error::Result;
use crate::math::PolynomialSolver;

pub const DEFAULT_BASELINE_DEGREE: usize = 2;

/// Fit a baseline over axis 1.
///
/// Returns `Ok(None)` without touching the solver when either sample list is empty.
/// Solver rejections (e.g. `degree >= samples`) are returned as `FitFailure`.
pub fn fit_baseline<S>(
    converter: &UnitConverter,
    xs: &[f64],
    ys: &[f64],
    unit: Unit,
    degree: usize,
    solver: &S,
) -> Result<Option<Vec<f64>>>
where
    S: PolynomialSolver + ?Sized,
{
    if xs.is_empty() || ys.is_empty() {
        log::debug!("baseline skipped: no samples");
        return Ok(None);
    }

    let poly = solver.polyfit(xs, ys, degree)?;
    let axis = converter.axis_values(unit);
    let baseline = solver.polyval(&poly, &axis);
    log::info!(
        "baseline fitted: degree={degree}, samples={}, unit={unit}, channels={}",
        xs.len(),
        baseline.len()
    );
    Ok(Some(baseline))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::SpectrumError;
    use crate::math::{Polynomial, SvdPolynomialSolver};
    use crate::testing::hi_header;

    #[derive(Default)]
    struct CountingSolver {
        calls: Cell<usize>,
    }

    impl PolynomialSolver for CountingSolver {
        fn polyfit(&self, xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial> {
            self.calls.set(self.calls.get() + 1);
            SvdPolynomialSolver.polyfit(xs, ys, degree)
        }
    }

    fn converter() -> UnitConverter {
        UnitConverter::from_header(&hi_header()).unwrap()
    }

    #[test]
    fn empty_samples_skip_the_solver() {
        let solver = CountingSolver::default();
        let out = fit_baseline(&converter(), &[], &[], Unit::HZ, 2, &solver).unwrap();
        assert!(out.is_none());
        let out = fit_baseline(&converter(), &[1.0], &[], Unit::HZ, 2, &solver).unwrap();
        assert!(out.is_none());
        assert_eq!(solver.calls.get(), 0);
    }

    #[test]
    fn recovers_noiseless_polynomial_over_full_axis() {
        let conv = converter();
        let truth = |v: f64| 2.0 - 0.03 * v + 0.0015 * v * v;
        for unit in [Unit::CHANNEL, Unit::HZ, Unit::MHZ, Unit::VELOCITY] {
            let axis = conv.axis_values(unit);
            let picks = [3usize, 10, 25, 60, 80, 95];
            let xs: Vec<f64> = picks.iter().map(|&k| axis[k]).collect();
            // Express the polynomial in the channel index so every unit sees a degree-2 curve.
            let ys: Vec<f64> = picks.iter().map(|&k| truth(k as f64)).collect();

            let solver = CountingSolver::default();
            let baseline = fit_baseline(&conv, &xs, &ys, unit, 2, &solver).unwrap().unwrap();
            assert_eq!(solver.calls.get(), 1);
            assert_eq!(baseline.len(), 100);
            for (k, value) in baseline.iter().enumerate() {
                let expected = truth(k as f64);
                assert!((value - expected).abs() < 1e-9, "{unit} at {k}: {value} vs {expected}");
            }
        }
    }

    #[test]
    fn degree_at_sample_count_is_a_fit_failure() {
        let err = fit_baseline(
            &converter(),
            &[1.0, 2.0],
            &[0.5, 0.7],
            Unit::CHANNEL,
            2,
            &SvdPolynomialSolver,
        )
        .unwrap_err();
        assert!(matches!(err, SpectrumError::FitFailure(_)));
    }
}
