//! Multi-Gaussian decomposition of a baseline-subtracted spectrum.
//!
//! All components share one joint bounded least-squares fit: the model is the
//! sum of `n` Gaussians over the unit-converted axis, the target is
//! `flux - baseline`. The optimized vector is split back into per-component
//! parameters, profiles and their superposition.

use crate::coords::UnitConverter;
use crate::domain::{ComponentLimit, FitResult, GaussianComponent, Unit};
use crate::error::{Result, SpectrumError};
use crate::fit::seeds::{SeriesStats, assemble_seeds, flatten};
use crate::math::{CurveFitter, gaussian_sum, profile};

/// Decompose `flux - baseline` into `n_components` Gaussians.
///
/// `n_components == 0` or an absent baseline yields [`FitResult::empty`].
pub fn fit_gaussian<C>(
    converter: &UnitConverter,
    flux: &[f64],
    unit: Unit,
    baseline: Option<&[f64]>,
    n_components: usize,
    limits: &[ComponentLimit],
    fitter: &C,
) -> Result<FitResult>
where
    C: CurveFitter + ?Sized,
{
    let len = converter.len();
    let Some(baseline) = baseline.filter(|_| n_components > 0) else {
        log::debug!("gaussian fit skipped: components={n_components}, baseline absent={}", baseline.is_none());
        return Ok(FitResult::empty(unit, len));
    };

    check_len("flux", len, flux.len())?;
    check_len("baseline", len, baseline.len())?;

    let axis = converter.axis_values(unit);
    let residual: Vec<f64> = flux.iter().zip(baseline).map(|(f, b)| f - b).collect();

    let (Some(axis_stats), Some(residual_stats)) = (SeriesStats::of(&axis), SeriesStats::of(&residual))
    else {
        return Err(SpectrumError::fit("cannot fit Gaussians to an empty axis"));
    };

    let seeds = assemble_seeds(&axis_stats, &residual_stats, n_components, limits);
    let (initial, lower, upper) = flatten(&seeds);
    log::debug!("gaussian seeds: {seeds:?}");

    let fit = fitter.curve_fit(&gaussian_sum, &axis, &residual, &initial, &lower, &upper)?;
    if fit.params.len() != initial.len() {
        return Err(SpectrumError::fit(format!(
            "solver returned {} parameters, expected {}",
            fit.params.len(),
            initial.len()
        )));
    }

    let params: Vec<GaussianComponent> = fit
        .params
        .chunks_exact(3)
        .map(GaussianComponent::from_slice)
        .collect();
    let components: Vec<Vec<f64>> = params.iter().map(|c| profile(&axis, c)).collect();
    let mut superposition = vec![0.0; len];
    for component in &components {
        for (total, value) in superposition.iter_mut().zip(component) {
            *total += value;
        }
    }

    log::info!(
        "gaussian fit: {n_components} component(s) in {} after {} iterations",
        unit.label(),
        fit.iterations
    );
    Ok(FitResult {
        unit,
        superposition,
        components,
        params,
    })
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SpectrumError::ShapeMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
