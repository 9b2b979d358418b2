//! Conversion between channel, frequency and radio LSR velocity along axis 1.
//!
//! Frequency values are scaled by the unit's SI magnitude. Velocity is always
//! derived from the unscaled frequency (Hz) relative to the reference frequency
//! `CRVAL1`, in the radio convention:
//!
//! ```text
//! v [km/s] = (-c * (f - CRVAL1) / CRVAL1 - VLSR) / 1000
//! f [Hz]   = -(v * 1000 + VLSR) * CRVAL1 / c + CRVAL1
//! ```
//!
//! with `VLSR` the header's `VELO-LSR` (km/s) converted to m/s.

use crate::coords::AxisModel;
use crate::domain::{SpectralHeader, Unit, UnitKind};
use crate::error::{Result, SpectrumError};

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

#[derive(Debug, Clone, PartialEq)]
pub struct UnitConverter {
    axis: AxisModel,
    /// LSR velocity offset in m/s.
    vlsr: f64,
}

impl UnitConverter {
    pub fn from_header(header: &SpectralHeader) -> Result<Self> {
        let axis = AxisModel::from_header(header, 1)?;
        if axis.crval == 0.0 {
            return Err(SpectrumError::InvalidKeyword {
                key: "CRVAL1".to_string(),
                reason: "reference frequency must be non-zero".to_string(),
            });
        }
        let vlsr = header.number("VELO-LSR")? * 1000.0;
        Ok(Self { axis, vlsr })
    }

    pub fn axis(&self) -> &AxisModel {
        &self.axis
    }

    pub fn len(&self) -> usize {
        self.axis.length
    }

    pub fn is_empty(&self) -> bool {
        self.axis.length == 0
    }

    /// LSR offset in km/s, as stored in the header.
    pub fn vlsr_kms(&self) -> f64 {
        self.vlsr / 1000.0
    }

    /// Parse a unit string, attaching the axis' `CTYPE1` to a failure.
    pub fn parse_unit(&self, unit: &str) -> Result<Unit> {
        unit.parse().map_err(|err| match err {
            SpectrumError::UnknownUnit { unit, .. } => SpectrumError::UnknownUnit {
                unit,
                ctype: self.axis.ctype.clone(),
            },
            other => other,
        })
    }

    /// Axis-1 coordinates expressed in `unit`.
    pub fn axis_values(&self, unit: Unit) -> Vec<f64> {
        match unit.kind {
            UnitKind::Channel => (0..self.axis.length).map(|k| k as f64).collect(),
            UnitKind::Frequency | UnitKind::Velocity => self
                .axis
                .coordinates()
                .into_iter()
                .map(|freq| self.from_frequency(freq, unit))
                .collect(),
        }
    }

    /// Convert `value` (in `unit`) to a frequency in Hz.
    pub fn to_frequency(&self, value: f64, unit: Unit) -> f64 {
        match unit.kind {
            UnitKind::Channel => self.axis.value_at(value),
            UnitKind::Frequency => value * unit.magnitude.factor(),
            UnitKind::Velocity => {
                let rest = self.axis.crval;
                -(value * 1000.0 + self.vlsr) * rest / SPEED_OF_LIGHT + rest
            }
        }
    }

    /// Convert a frequency in Hz to `unit`; inverse of [`UnitConverter::to_frequency`].
    pub fn from_frequency(&self, freq: f64, unit: Unit) -> f64 {
        match unit.kind {
            UnitKind::Channel => self.axis.pixel_of(freq),
            UnitKind::Frequency => freq / unit.magnitude.factor(),
            UnitKind::Velocity => {
                let rest = self.axis.crval;
                (-SPEED_OF_LIGHT * (freq - rest) / rest - self.vlsr) / 1000.0
            }
        }
    }
}
