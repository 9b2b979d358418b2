//! Bounded nonlinear least squares: the curve-fit collaborator of the Gaussian
//! decomposition.
//!
//! [`BoundedLevenbergMarquardt`] minimizes `½ Σ (f(x_i; p) - y_i)²` subject to
//! `lower ≤ p ≤ upper`:
//!
//! - forward-difference Jacobian, stepping inward at an upper bound
//! - Marquardt-scaled damping `(JᵀJ + λ diag(JᵀJ)) δ = -Jᵀr`
//! - every trial point is projected back onto the box
//!
//! The solver is opaque to its callers: it runs to convergence or fails, and is
//! neither cancellable nor time-bounded.

use nalgebra::{DMatrix, DVector};

use crate::domain::SolverConfig;
use crate::error::{Result, SpectrumError};

const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-15;
const LAMBDA_MAX: f64 = 1e16;

/// Model function `f(x, params)`.
pub type ModelFn<'a> = dyn Fn(f64, &[f64]) -> f64 + 'a;

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model reproduces the data exactly.
    ExactFit,
    /// Projected gradient below `gtol`.
    Gradient,
    /// Relative cost reduction below `ftol`.
    CostReduction,
    /// Relative step below `xtol`.
    StepSize,
    /// No damped step lowers the cost, even at maximum damping.
    Stalled,
}

impl Termination {
    pub fn describe(self) -> &'static str {
        match self {
            Termination::ExactFit => "zero cost",
            Termination::Gradient => "gtol",
            Termination::CostReduction => "ftol",
            Termination::StepSize => "xtol",
            Termination::Stalled => "stalled",
        }
    }
}

/// Solver output.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit {
    pub params: Vec<f64>,
    /// Final `½ Σ r²`.
    pub cost: f64,
    pub iterations: usize,
    pub termination: Termination,
}

/// Bounded nonlinear least-squares collaborator.
pub trait CurveFitter {
    fn curve_fit(
        &self,
        model: &ModelFn<'_>,
        xs: &[f64],
        ys: &[f64],
        initial: &[f64],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<CurveFit>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedLevenbergMarquardt {
    pub config: SolverConfig,
}

impl BoundedLevenbergMarquardt {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl CurveFitter for BoundedLevenbergMarquardt {
    fn curve_fit(
        &self,
        model: &ModelFn<'_>,
        xs: &[f64],
        ys: &[f64],
        initial: &[f64],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<CurveFit> {
        validate(xs, ys, initial, lower, upper)?;

        let n = initial.len();
        let cfg = self.config;
        let budget = cfg.iteration_budget(n);

        let residuals = |p: &DVector<f64>| -> DVector<f64> {
            DVector::from_iterator(
                xs.len(),
                xs.iter().zip(ys).map(|(&x, &y)| model(x, p.as_slice()) - y),
            )
        };

        let mut p = DVector::from_column_slice(initial);
        let mut r = residuals(&p);
        let mut cost = 0.5 * r.norm_squared();
        if !cost.is_finite() {
            return Err(SpectrumError::fit("model is not finite at the initial guess"));
        }

        let mut lambda = LAMBDA_INIT;
        for iteration in 1..=budget {
            if cost == 0.0 {
                return Ok(finish(p, cost, iteration - 1, Termination::ExactFit));
            }

            let jac = jacobian(&residuals, &p, &r, upper);
            let jtj = jac.transpose() * &jac;
            let grad = jac.transpose() * &r;

            if projected_gradient_norm(&grad, &p, lower, upper) <= cfg.gtol * cost.max(1.0) {
                return Ok(finish(p, cost, iteration - 1, Termination::Gradient));
            }

            let diag_floor = jtj.diagonal().max().max(1.0) * 1e-12;
            loop {
                let mut damped = jtj.clone();
                for i in 0..n {
                    damped[(i, i)] += lambda * jtj[(i, i)].max(diag_floor);
                }

                let Some(chol) = damped.cholesky() else {
                    lambda *= 10.0;
                    if lambda > LAMBDA_MAX {
                        return Ok(finish(p, cost, iteration, Termination::Stalled));
                    }
                    continue;
                };
                let delta = chol.solve(&(-&grad));
                let candidate = project(&(&p + &delta), lower, upper);
                let r_new = residuals(&candidate);
                let cost_new = 0.5 * r_new.norm_squared();

                if cost_new.is_finite() && cost_new < cost {
                    let step = (&candidate - &p).norm();
                    let reduction = cost - cost_new;
                    let p_norm = p.norm();

                    p = candidate;
                    r = r_new;
                    cost = cost_new;
                    lambda = (lambda / 10.0).max(LAMBDA_MIN);

                    if reduction <= cfg.ftol * (cost + reduction) {
                        return Ok(finish(p, cost, iteration, Termination::CostReduction));
                    }
                    if step <= cfg.xtol * (cfg.xtol + p_norm) {
                        return Ok(finish(p, cost, iteration, Termination::StepSize));
                    }
                    break;
                }

                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    // Usually a bounded minimum the gradient test missed.
                    return Ok(finish(p, cost, iteration, Termination::Stalled));
                }
            }
        }

        Err(SpectrumError::fit(format!(
            "optimal parameters not found: iteration budget of {budget} exhausted (cost {cost:.6e})"
        )))
    }
}

fn finish(p: DVector<f64>, cost: f64, iterations: usize, termination: Termination) -> CurveFit {
    match termination {
        Termination::Stalled => log::debug!(
            "curve fit stalled after {iterations} iterations: no damped step reduces cost={cost:.6e} (lambda > {LAMBDA_MAX:e})"
        ),
        reason => log::debug!(
            "curve fit converged ({}) after {iterations} iterations, cost={cost:.6e}",
            reason.describe()
        ),
    }
    CurveFit {
        params: p.iter().copied().collect(),
        cost,
        iterations,
        termination,
    }
}

fn validate(xs: &[f64], ys: &[f64], initial: &[f64], lower: &[f64], upper: &[f64]) -> Result<()> {
    if xs.is_empty() || xs.len() != ys.len() {
        return Err(SpectrumError::fit(format!(
            "need matching, non-empty x/y data (got {} and {})",
            xs.len(),
            ys.len()
        )));
    }
    if initial.is_empty() || initial.len() != lower.len() || initial.len() != upper.len() {
        return Err(SpectrumError::fit(format!(
            "parameter, lower and upper vectors must have one equal, non-zero length (got {}, {}, {})",
            initial.len(),
            lower.len(),
            upper.len()
        )));
    }
    if xs.iter().chain(ys).chain(initial).any(|v| !v.is_finite()) {
        return Err(SpectrumError::fit("data or initial guess contain non-finite values"));
    }
    for (i, ((&lo, &hi), &p0)) in lower.iter().zip(upper).zip(initial).enumerate() {
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return Err(SpectrumError::fit(format!(
                "infeasible bounds for parameter {i}: lower {lo} must be strictly less than upper {hi}"
            )));
        }
        if p0 < lo || p0 > hi {
            return Err(SpectrumError::fit(format!(
                "initial guess {p0} for parameter {i} lies outside its bounds [{lo}, {hi}]"
            )));
        }
    }
    Ok(())
}

fn project(p: &DVector<f64>, lower: &[f64], upper: &[f64]) -> DVector<f64> {
    DVector::from_iterator(
        p.len(),
        p.iter()
            .zip(lower.iter().zip(upper))
            .map(|(&v, (&lo, &hi))| v.clamp(lo, hi)),
    )
}

fn jacobian(
    residuals: &impl Fn(&DVector<f64>) -> DVector<f64>,
    p: &DVector<f64>,
    r: &DVector<f64>,
    upper: &[f64],
) -> DMatrix<f64> {
    let h_rel = f64::EPSILON.sqrt();
    let mut jac = DMatrix::<f64>::zeros(r.len(), p.len());
    for j in 0..p.len() {
        let h = h_rel * p[j].abs().max(1.0);
        let mut shifted = p.clone();
        shifted[j] = if p[j] + h > upper[j] { p[j] - h } else { p[j] + h };
        let actual = shifted[j] - p[j];
        let column = (residuals(&shifted) - r) / actual;
        jac.set_column(j, &column);
    }
    jac
}

/// Infinity norm of the gradient, ignoring components that push against an active bound.
fn projected_gradient_norm(grad: &DVector<f64>, p: &DVector<f64>, lower: &[f64], upper: &[f64]) -> f64 {
    grad.iter()
        .enumerate()
        .map(|(i, &g)| {
            let blocked = (p[i] <= lower[i] && g > 0.0) || (p[i] >= upper[i] && g < 0.0);
            if blocked { 0.0 } else { g.abs() }
        })
        .fold(0.0, f64::max)
}
