//! Shared fit types.
//!
//! These are kept small and serializable so they can be printed as JSON by the
//! CLI and inspected in tests.

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::Unit;
use crate::error::SpectrumError;

/// `2 * sqrt(2 ln 2)`: FWHM of a Gaussian in units of sigma.
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// One Gaussian term, in the unit of the fit's x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaussianComponent {
    pub mean: f64,
    pub sigma: f64,
    pub amplitude: f64,
}

impl GaussianComponent {
    pub const fn new(mean: f64, sigma: f64, amplitude: f64) -> Self {
        Self {
            mean,
            sigma,
            amplitude,
        }
    }

    /// Flattened parameter order used by the solver.
    pub fn to_array(self) -> [f64; 3] {
        [self.mean, self.sigma, self.amplitude]
    }

    pub fn from_slice(p: &[f64]) -> Self {
        Self::new(p[0], p[1], p[2])
    }

    pub fn fwhm(&self) -> f64 {
        FWHM_PER_SIGMA * self.sigma.abs()
    }

    /// Integrated area under the profile.
    pub fn area(&self) -> f64 {
        self.amplitude * self.sigma.abs() * (2.0 * std::f64::consts::PI).sqrt()
    }
}

/// User-drawn box constraining one component: `(x_min, x_max, y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentLimit {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ComponentLimit {
    /// Build a limit, reordering the x-range when it was drawn backwards
    /// (velocity runs opposite to frequency). The y-range is kept as given.
    pub fn new(x_a: f64, x_b: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min: x_a.min(x_b),
            x_max: x_a.max(x_b),
            y_min,
            y_max,
        }
    }
}

impl FromStr for ComponentLimit {
    type Err = SpectrumError;

    /// Parse `xmin,xmax,ymin,ymax`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_floats(s)?;
        match values.as_slice() {
            &[x_a, x_b, y_min, y_max] => Ok(Self::new(x_a, x_b, y_min, y_max)),
            _ => Err(SpectrumError::InvalidArgument(format!(
                "component limit '{s}' must have 4 values: xmin,xmax,ymin,ymax"
            ))),
        }
    }
}

/// Initial guess and bounds for one component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentSeed {
    pub guess: GaussianComponent,
    pub lower: GaussianComponent,
    pub upper: GaussianComponent,
}

/// Output of a Gaussian decomposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub unit: Unit,
    /// Sum of all component profiles, one value per channel.
    pub superposition: Vec<f64>,
    /// Individual component profiles, one array per component.
    pub components: Vec<Vec<f64>>,
    pub params: Vec<GaussianComponent>,
}

impl FitResult {
    /// Defined no-op result: zero superposition, no components.
    pub fn empty(unit: Unit, len: usize) -> Self {
        Self {
            unit,
            superposition: vec![0.0; len],
            components: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// A single `(x, y)` sample picked for the baseline fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
}

impl FromStr for SamplePoint {
    type Err = SpectrumError;

    /// Parse `x,y`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = parse_floats(s)?;
        match values.as_slice() {
            &[x, y] => Ok(Self { x, y }),
            _ => Err(SpectrumError::InvalidArgument(format!(
                "baseline point '{s}' must have 2 values: x,y"
            ))),
        }
    }
}

/// Stopping rules for the bounded nonlinear solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Iteration budget; `None` means `200 * (n_params + 1)`.
    pub max_iterations: Option<usize>,
    /// Relative reduction of the cost below which the fit has converged.
    pub ftol: f64,
    /// Relative step size below which the fit has converged.
    pub xtol: f64,
    /// Scaled gradient norm below which the fit has converged.
    pub gtol: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: None,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 1e-10,
        }
    }
}

impl SolverConfig {
    pub fn iteration_budget(&self, n_params: usize) -> usize {
        self.max_iterations.unwrap_or(200 * (n_params + 1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Resolved configuration for one `salsa fit` run.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: PathBuf,
    /// Unit string as given; resolved against the loaded spectrum's axis.
    pub unit: String,
    pub baseline_points: Vec<SamplePoint>,
    pub degree: usize,
    pub components: usize,
    pub limits: Vec<ComponentLimit>,
    pub solver: SolverConfig,
    pub output: OutputFormat,
}

pub(crate) fn parse_floats(s: &str) -> Result<Vec<f64>, SpectrumError> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| SpectrumError::InvalidArgument(format!("'{part}' in '{s}': {e}")))
        })
        .collect()
}
