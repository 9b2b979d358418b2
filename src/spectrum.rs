//! A single-dish spectrum: header, flux along axis 1 and the last fit results.
//!
//! `Spectrum` is the public entry point. It is built explicitly from a header
//! and the raw (flattened) data array; the numeric collaborators can be swapped
//! for custom implementations. Every fit recomputes from scratch; only the most
//! recent baseline and Gaussian fit are kept for read-back.

use std::fmt;

use crate::coords::{AxisModel, UnitConverter};
use crate::domain::{ComponentLimit, FitResult, SolverConfig, SpectralHeader, Unit};
use crate::error::{Result, SpectrumError};
use crate::fit;
use crate::math::{BoundedLevenbergMarquardt, CurveFitter, PolynomialSolver, SvdPolynomialSolver};

pub struct Spectrum {
    header: SpectralHeader,
    converter: UnitConverter,
    flux: Vec<f64>,
    poly_solver: Box<dyn PolynomialSolver + Send + Sync>,
    curve_fitter: Box<dyn CurveFitter + Send + Sync>,
    baseline: Option<Vec<f64>>,
    last_fit: Option<FitResult>,
}

impl Spectrum {
    /// Build from a header and the flattened data cube.
    ///
    /// The spectrum is the first `NAXIS1` values of `data` (the innermost axis).
    pub fn new(header: SpectralHeader, data: &[f64]) -> Result<Self> {
        let converter = UnitConverter::from_header(&header)?;
        let n = converter.len();
        if data.len() < n {
            return Err(SpectrumError::ShapeMismatch {
                what: "flux",
                expected: n,
                actual: data.len(),
            });
        }

        Ok(Self {
            header,
            converter,
            flux: data[..n].to_vec(),
            poly_solver: Box::new(SvdPolynomialSolver),
            curve_fitter: Box::new(BoundedLevenbergMarquardt::default()),
            baseline: None,
            last_fit: None,
        })
    }

    pub fn with_polynomial_solver(mut self, solver: impl PolynomialSolver + Send + Sync + 'static) -> Self {
        self.poly_solver = Box::new(solver);
        self
    }

    pub fn with_curve_fitter(mut self, fitter: impl CurveFitter + Send + Sync + 'static) -> Self {
        self.curve_fitter = Box::new(fitter);
        self
    }

    pub fn with_solver_config(self, config: SolverConfig) -> Self {
        self.with_curve_fitter(BoundedLevenbergMarquardt::new(config))
    }

    pub fn header(&self) -> &SpectralHeader {
        &self.header
    }

    pub fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// Flux unit for the y-axis (`BUNIT`), if the header has one.
    pub fn flux_unit(&self) -> Option<&str> {
        self.header.text("BUNIT")
    }

    /// Resolve a unit string; an unknown unit names this spectrum's `CTYPE1`.
    pub fn parse_unit(&self, unit: &str) -> Result<Unit> {
        self.converter.parse_unit(unit)
    }

    /// Physical coordinates of any header axis (1-based index).
    pub fn coordinates(&self, axis_index: usize) -> Result<Vec<f64>> {
        Ok(AxisModel::from_header(&self.header, axis_index)?.coordinates())
    }

    /// Axis-1 values in `unit`.
    pub fn axis(&self, unit: Unit) -> Vec<f64> {
        self.converter.axis_values(unit)
    }

    pub fn convert_to_frequency(&self, value: f64, unit: Unit) -> f64 {
        self.converter.to_frequency(value, unit)
    }

    pub fn convert_from_frequency(&self, freq: f64, unit: Unit) -> f64 {
        self.converter.from_frequency(freq, unit)
    }

    /// Fit and cache a baseline; `Ok(None)` (and a cleared cache) for empty samples.
    pub fn fit_baseline(&mut self, xs: &[f64], ys: &[f64], unit: Unit, degree: usize) -> Result<Option<&[f64]>> {
        let baseline = fit::fit_baseline(&self.converter, xs, ys, unit, degree, self.poly_solver.as_ref())?;
        self.baseline = baseline;
        Ok(self.baseline.as_deref())
    }

    /// Most recent baseline.
    pub fn baseline(&self) -> Option<&[f64]> {
        self.baseline.as_deref()
    }

    /// Flux with the cached baseline removed.
    pub fn subtracted(&self) -> Option<Vec<f64>> {
        let baseline = self.baseline.as_ref()?;
        Some(self.flux.iter().zip(baseline).map(|(f, b)| f - b).collect())
    }

    /// Decompose `flux - baseline` into Gaussians and cache the result.
    pub fn fit_gaussian(
        &mut self,
        unit: Unit,
        baseline: Option<&[f64]>,
        n_components: usize,
        limits: &[ComponentLimit],
    ) -> Result<&FitResult> {
        let result = self.decompose(unit, baseline, n_components, limits)?;
        Ok(self.last_fit.insert(result))
    }

    /// Like [`Spectrum::fit_gaussian`], using the cached baseline.
    pub fn fit_gaussian_on_baseline(
        &mut self,
        unit: Unit,
        n_components: usize,
        limits: &[ComponentLimit],
    ) -> Result<&FitResult> {
        let result = self.decompose(unit, self.baseline.as_deref(), n_components, limits)?;
        Ok(self.last_fit.insert(result))
    }

    /// Most recent Gaussian fit.
    pub fn last_fit(&self) -> Option<&FitResult> {
        self.last_fit.as_ref()
    }

    fn decompose(
        &self,
        unit: Unit,
        baseline: Option<&[f64]>,
        n_components: usize,
        limits: &[ComponentLimit],
    ) -> Result<FitResult> {
        fit::fit_gaussian(
            &self.converter,
            &self.flux,
            unit,
            baseline,
            n_components,
            limits,
            self.curve_fitter.as_ref(),
        )
    }
}

impl fmt::Debug for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spectrum")
            .field("channels", &self.flux.len())
            .field("axis", self.converter.axis())
            .field("has_baseline", &self.baseline.is_some())
            .field("has_fit", &self.last_fit.is_some())
            .finish()
    }
}
