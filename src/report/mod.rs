//! Reporting utilities: header and fit summaries.
//!
//! Summaries are plain serializable values computed from a [`Spectrum`]; the
//! `format` submodule turns them into terminal text or JSON.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{FitResult, HeaderValue, SpectralHeader, Unit};
use crate::error::{Result, SpectrumError};
use crate::spectrum::Spectrum;

pub mod format;

pub use format::*;

/// One header axis as reported by `salsa info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSummary {
    pub index: usize,
    pub length: usize,
    pub ctype: Option<String>,
    pub crval: Option<f64>,
    pub cdelt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderSummary {
    pub object: Option<String>,
    pub telescope: Option<String>,
    pub date_obs: Option<NaiveDateTime>,
    pub axes: Vec<AxisSummary>,
    pub vlsr_kms: Option<f64>,
    pub flux_unit: Option<String>,
}

impl HeaderSummary {
    pub fn from_header(header: &SpectralHeader) -> Result<Self> {
        let naxis = header.count("NAXIS")?;
        let axes = (1..=naxis)
            .map(|i| {
                Ok(AxisSummary {
                    index: i,
                    length: header.count(&format!("NAXIS{i}"))?,
                    ctype: header.text(&format!("CTYPE{i}")).map(str::to_string),
                    crval: header.get(&format!("CRVAL{i}")).and_then(HeaderValue::as_f64),
                    cdelt: header.get(&format!("CDELT{i}")).and_then(HeaderValue::as_f64),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let date_obs = match header.text("DATE-OBS") {
            Some(raw) => Some(parse_date_obs(raw)?),
            None => None,
        };

        Ok(Self {
            object: header.text("OBJECT").map(str::to_string),
            telescope: header.text("TELESCOP").map(str::to_string),
            date_obs,
            axes,
            vlsr_kms: header.get("VELO-LSR").and_then(HeaderValue::as_f64),
            flux_unit: header.text("BUNIT").map(str::to_string),
        })
    }
}

/// Derived quantities of one fitted component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub mean: f64,
    pub sigma: f64,
    pub fwhm: f64,
    pub amplitude: f64,
    pub area: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitSummary {
    pub unit: Unit,
    pub unit_label: &'static str,
    pub flux_unit: Option<String>,
    pub channels: usize,
    pub baseline_degree: usize,
    pub baseline_points: usize,
    pub components: Vec<ComponentSummary>,
    /// RMS of `flux - baseline - superposition`; `None` without a baseline.
    pub residual_rms: Option<f64>,
}

impl FitSummary {
    pub fn new(spectrum: &Spectrum, fit: &FitResult, baseline_degree: usize, baseline_points: usize) -> Self {
        let components = fit
            .params
            .iter()
            .map(|c| ComponentSummary {
                mean: c.mean,
                sigma: c.sigma,
                fwhm: c.fwhm(),
                amplitude: c.amplitude,
                area: c.area(),
            })
            .collect();

        let residual_rms = spectrum.subtracted().map(|sub| {
            let sum_sq: f64 = sub
                .iter()
                .zip(&fit.superposition)
                .map(|(s, g)| (s - g).powi(2))
                .sum();
            (sum_sq / sub.len().max(1) as f64).sqrt()
        });

        Self {
            unit: fit.unit,
            unit_label: fit.unit.label(),
            flux_unit: spectrum.flux_unit().map(str::to_string),
            channels: spectrum.len(),
            baseline_degree,
            baseline_points,
            components,
            residual_rms,
        }
    }
}

/// Parse `DATE-OBS` in the forms FITS writers commonly use.
pub fn parse_date_obs(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SpectrumError::InvalidKeyword {
            key: "DATE-OBS".to_string(),
            reason: format!("unrecognized date '{raw}'"),
        })
}
