//! Gaussian line profiles.
//!
//! `g(x) = amp * exp(-(x - mean)^2 / (2 sigma^2))`
//!
//! A zero width is allowed (the lower sigma bound is 0): the profile then
//! collapses to `amp` exactly at the mean and `0` elsewhere instead of `NaN`.

use crate::domain::GaussianComponent;

pub fn gaussian(x: f64, mean: f64, sigma: f64, amplitude: f64) -> f64 {
    if sigma == 0.0 {
        return if x == mean { amplitude } else { 0.0 };
    }
    let z = (x - mean) / sigma;
    amplitude * (-0.5 * z * z).exp()
}

/// Sum of Gaussians over a flattened `[mean, sigma, amp, mean, sigma, amp, ...]` vector.
pub fn gaussian_sum(x: f64, params: &[f64]) -> f64 {
    params
        .chunks_exact(3)
        .map(|p| gaussian(x, p[0], p[1], p[2]))
        .sum()
}

/// Profile of one component over `xs`.
pub fn profile(xs: &[f64], component: &GaussianComponent) -> Vec<f64> {
    xs.iter()
        .map(|&x| gaussian(x, component.mean, component.sigma, component.amplitude))
        .collect()
}
