//! Synthetic 21 cm spectra.
//!
//! A SALSA-like single-dish spectrum: frequency axis centred on the HI rest
//! frequency, a gentle quadratic background, Gaussian emission lines placed in
//! channel units and seeded Gaussian noise. Used by the `synth` command and by
//! end-to-end tests.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::domain::types::parse_floats;
use crate::domain::{HeaderValue, SpectralHeader};
use crate::error::{Result, SpectrumError};
use crate::math::gaussian;

/// HI rest frequency in Hz.
pub const HI_REST_FREQUENCY: f64 = 1_420_405_751.77;

/// Channel width of a 2.5 MHz band over 1024 channels.
pub const DEFAULT_CHANNEL_WIDTH: f64 = 2_441.406_25;

/// One emission line in channel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthLine {
    pub channel: f64,
    pub sigma: f64,
    pub amplitude: f64,
}

impl FromStr for SynthLine {
    type Err = SpectrumError;

    /// `"channel,sigma,amplitude"`
    fn from_str(s: &str) -> Result<Self> {
        match parse_floats(s)?.as_slice() {
            &[channel, sigma, amplitude] => Ok(Self {
                channel,
                sigma,
                amplitude,
            }),
            other => Err(SpectrumError::InvalidArgument(format!(
                "line '{s}' needs 3 values (channel,sigma,amplitude), got {}",
                other.len()
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub channels: usize,
    pub seed: u64,
    pub lines: Vec<SynthLine>,
    /// Standard deviation of the additive noise, in flux units.
    pub noise: f64,
    pub vlsr_kms: f64,
    pub date_obs: Option<NaiveDateTime>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            channels: 256,
            seed: 42,
            lines: vec![
                SynthLine {
                    channel: 110.0,
                    sigma: 6.0,
                    amplitude: 12.0,
                },
                SynthLine {
                    channel: 140.0,
                    sigma: 10.0,
                    amplitude: 5.0,
                },
            ],
            noise: 0.2,
            vlsr_kms: 0.0,
            date_obs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpectrum {
    pub header: SpectralHeader,
    pub flux: Vec<f64>,
    /// Noise-free background alone.
    pub background: Vec<f64>,
}

pub fn generate_spectrum(config: &SynthConfig) -> Result<SyntheticSpectrum> {
    if config.channels < 2 {
        return Err(SpectrumError::InvalidArgument(format!(
            "need at least 2 channels, got {}",
            config.channels
        )));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(SpectrumError::InvalidArgument(format!(
            "noise must be a finite non-negative number, got {}",
            config.noise
        )));
    }
    if let Some(line) = config.lines.iter().find(|l| !(l.sigma > 0.0 && l.sigma.is_finite())) {
        return Err(SpectrumError::InvalidArgument(format!(
            "line at channel {} has non-positive sigma {}",
            line.channel, line.sigma
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| SpectrumError::InvalidArgument(format!("noise distribution: {e}")))?;

    let n = config.channels;
    let background: Vec<f64> = (0..n).map(|k| background_at(k, n)).collect();
    let flux = background
        .iter()
        .enumerate()
        .map(|(k, b)| {
            let x = k as f64;
            let lines: f64 = config
                .lines
                .iter()
                .map(|l| gaussian(x, l.channel, l.sigma, l.amplitude))
                .sum();
            let noise = if config.noise > 0.0 { normal.sample(&mut rng) } else { 0.0 };
            b + lines + noise
        })
        .collect();

    log::info!(
        "synthesized {n} channels with {} line(s), seed {}",
        config.lines.len(),
        config.seed
    );
    Ok(SyntheticSpectrum {
        header: synth_header(config),
        flux,
        background,
    })
}

/// Quadratic background over a normalized channel coordinate in `[-1, 1]`.
fn background_at(k: usize, n: usize) -> f64 {
    let t = 2.0 * k as f64 / (n - 1) as f64 - 1.0;
    40.0 + 3.0 * t - 4.0 * t * t
}

fn synth_header(config: &SynthConfig) -> SpectralHeader {
    let n = config.channels;
    let mut entries: Vec<(&str, HeaderValue)> = vec![
        ("NAXIS", HeaderValue::from(1i64)),
        ("NAXIS1", HeaderValue::from(n as i64)),
        ("CTYPE1", HeaderValue::from("FREQ")),
        ("CUNIT1", HeaderValue::from("Hz")),
        ("CRVAL1", HeaderValue::from(HI_REST_FREQUENCY)),
        ("CRPIX1", HeaderValue::from((n / 2 + 1) as i64)),
        ("CDELT1", HeaderValue::from(DEFAULT_CHANNEL_WIDTH)),
        ("VELO-LSR", HeaderValue::from(config.vlsr_kms)),
        ("BUNIT", HeaderValue::from("K")),
        ("OBJECT", HeaderValue::from("SYNTHETIC")),
        ("TELESCOP", HeaderValue::from("SALSA")),
    ];
    if let Some(date) = config.date_obs {
        entries.push(("DATE-OBS", HeaderValue::from(date.format("%Y-%m-%dT%H:%M:%S").to_string())));
    }
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::UnitConverter;

    #[test]
    fn same_seed_same_spectrum() {
        let config = SynthConfig::default();
        let a = generate_spectrum(&config).unwrap();
        let b = generate_spectrum(&config).unwrap();
        assert_eq!(a.flux, b.flux);

        let c = generate_spectrum(&SynthConfig { seed: 7, ..config }).unwrap();
        assert_ne!(a.flux, c.flux);
    }

    #[test]
    fn noiseless_flux_is_background_plus_lines() {
        let config = SynthConfig {
            channels: 64,
            lines: vec![SynthLine {
                channel: 20.0,
                sigma: 3.0,
                amplitude: 2.0,
            }],
            noise: 0.0,
            ..SynthConfig::default()
        };
        let s = generate_spectrum(&config).unwrap();
        assert_eq!(s.flux.len(), 64);
        assert!((s.flux[20] - s.background[20] - 2.0).abs() < 1e-12);
        assert!((s.flux[63] - s.background[63]).abs() < 1e-12);
    }

    #[test]
    fn header_describes_a_convertible_axis() {
        let config = SynthConfig {
            channels: 128,
            vlsr_kms: -12.5,
            ..SynthConfig::default()
        };
        let s = generate_spectrum(&config).unwrap();
        let conv = UnitConverter::from_header(&s.header).unwrap();
        assert_eq!(conv.len(), 128);
        assert_eq!(conv.axis().value_at(64.0), HI_REST_FREQUENCY);
        assert_eq!(conv.vlsr_kms(), -12.5);
        assert!(s.header.get("DATE-OBS").is_none());
    }

    #[test]
    fn parses_lines_and_rejects_bad_input() {
        let line: SynthLine = "110, 6, 12.5".parse().unwrap();
        assert_eq!(line.amplitude, 12.5);
        assert!("1,2".parse::<SynthLine>().is_err());

        let bad = SynthConfig {
            noise: -1.0,
            ..SynthConfig::default()
        };
        assert!(matches!(generate_spectrum(&bad), Err(SpectrumError::InvalidArgument(_))));
    }
}
