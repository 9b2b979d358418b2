//! Test fixtures shared by unit tests.

use crate::domain::{HeaderValue, SpectralHeader};

/// 100-channel HI header: reference 1.42 GHz at CRPIX 50, 1 kHz channels, VLSR 5 km/s.
pub(crate) fn hi_header() -> SpectralHeader {
    [
        ("NAXIS", HeaderValue::from(1.0)),
        ("NAXIS1", HeaderValue::from(100.0)),
        ("CRVAL1", HeaderValue::from(1.42e9)),
        ("CRPIX1", HeaderValue::from(50.0)),
        ("CDELT1", HeaderValue::from(1000.0)),
        ("CTYPE1", HeaderValue::from("FREQ")),
        ("VELO-LSR", HeaderValue::from(5.0)),
        ("BUNIT", HeaderValue::from("K")),
    ]
    .into_iter()
    .collect()
}

/// Evaluate a Gaussian sum at `x`.
pub(crate) fn gaussians(x: f64, lines: &[(f64, f64, f64)]) -> f64 {
    lines
        .iter()
        .map(|&(mean, sigma, amp)| amp * (-(x - mean).powi(2) / (2.0 * sigma * sigma)).exp())
        .sum()
}
