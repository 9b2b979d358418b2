//! Polynomial least squares: the linear-solver collaborator of the baseline fit.
//!
//! Spectral abscissae can be large (frequencies around 1e9 Hz), so the design
//! matrix is built on a centred and scaled variable `t = (x - shift) / scale`.
//! The fitted [`Polynomial`] keeps that transform and applies it on evaluation.

use nalgebra::{DMatrix, DVector};
use serde::Serialize;

use crate::error::{Result, SpectrumError};
use crate::math::solve_least_squares;

/// Polynomial in the normalized variable `t = (x - shift) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    /// Coefficients in ascending order of power of `t`.
    pub coeffs: Vec<f64>,
    pub shift: f64,
    pub scale: f64,
}

impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.shift) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }
}

/// Linear least-squares collaborator: `polyfit` / `polyval`.
pub trait PolynomialSolver {
    fn polyfit(&self, xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial>;

    fn polyval(&self, poly: &Polynomial, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| poly.eval(x)).collect()
    }
}

/// Default solver: Vandermonde design on the normalized abscissa, solved by SVD.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvdPolynomialSolver;

impl PolynomialSolver for SvdPolynomialSolver {
    fn polyfit(&self, xs: &[f64], ys: &[f64], degree: usize) -> Result<Polynomial> {
        if xs.len() != ys.len() {
            return Err(SpectrumError::fit(format!(
                "x and y samples differ in length ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        let n = xs.len();
        if n <= degree {
            return Err(SpectrumError::fit(format!(
                "not enough samples ({n}) for a polynomial of degree {degree}; need at least {}",
                degree + 1
            )));
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return Err(SpectrumError::fit("samples contain non-finite values"));
        }

        let shift = xs.iter().sum::<f64>() / n as f64;
        let spread = xs.iter().map(|x| (x - shift).abs()).fold(0.0, f64::max);
        let scale = if spread > 0.0 { spread } else { 1.0 };

        let cols = degree + 1;
        let mut design = DMatrix::<f64>::zeros(n, cols);
        for (i, &x) in xs.iter().enumerate() {
            let t = (x - shift) / scale;
            let mut power = 1.0;
            for j in 0..cols {
                design[(i, j)] = power;
                power *= t;
            }
        }
        let y = DVector::from_column_slice(ys);

        let coeffs = solve_least_squares(&design, &y).ok_or_else(|| {
            SpectrumError::fit(format!(
                "polynomial of degree {degree} is not determined by the {n} samples (rank deficient)"
            ))
        })?;

        log::debug!("polyfit degree={degree} n={n} shift={shift} scale={scale}");
        Ok(Polynomial {
            coeffs: coeffs.iter().copied().collect(),
            shift,
            scale,
        })
    }
}
