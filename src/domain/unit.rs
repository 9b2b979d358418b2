//! Spectral-axis units.
//!
//! A unit string is parsed once at the boundary into a closed [`Unit`]:
//! a family (`chan*`, `freq*`, `vel*`, case-insensitive prefix match) plus an
//! SI magnitude that only applies to frequency (`-k`, `-m`, `-g` suffix).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpectrumError;

/// Coordinate family along the spectral axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Channel,
    Frequency,
    Velocity,
}

/// SI prefix applied to frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    #[default]
    None,
    Kilo,
    Mega,
    Giga,
}

impl Magnitude {
    /// Number of base units (Hz) per displayed unit.
    pub fn factor(self) -> f64 {
        match self {
            Magnitude::None => 1.0,
            Magnitude::Kilo => 1e3,
            Magnitude::Mega => 1e6,
            Magnitude::Giga => 1e9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub kind: UnitKind,
    pub magnitude: Magnitude,
}

impl Unit {
    pub const CHANNEL: Unit = Unit::new(UnitKind::Channel, Magnitude::None);
    pub const HZ: Unit = Unit::new(UnitKind::Frequency, Magnitude::None);
    pub const KHZ: Unit = Unit::new(UnitKind::Frequency, Magnitude::Kilo);
    pub const MHZ: Unit = Unit::new(UnitKind::Frequency, Magnitude::Mega);
    pub const GHZ: Unit = Unit::new(UnitKind::Frequency, Magnitude::Giga);
    pub const VELOCITY: Unit = Unit::new(UnitKind::Velocity, Magnitude::None);

    pub const fn new(kind: UnitKind, magnitude: Magnitude) -> Self {
        Self { kind, magnitude }
    }

    /// Axis label used in reports (`Hz`, `MHz`, `km/s`, ...).
    pub fn label(self) -> &'static str {
        match (self.kind, self.magnitude) {
            (UnitKind::Channel, _) => "channel",
            (UnitKind::Velocity, _) => "km/s",
            (UnitKind::Frequency, Magnitude::None) => "Hz",
            (UnitKind::Frequency, Magnitude::Kilo) => "kHz",
            (UnitKind::Frequency, Magnitude::Mega) => "MHz",
            (UnitKind::Frequency, Magnitude::Giga) => "GHz",
        }
    }
}

impl FromStr for Unit {
    type Err = SpectrumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SpectrumError::UnknownUnit {
            unit: s.to_string(),
            ctype: None,
        };
        let lower = s.trim().to_ascii_lowercase();

        if lower.starts_with("chan") {
            return Ok(Unit::CHANNEL);
        }
        if lower.starts_with("vel") {
            return Ok(Unit::VELOCITY);
        }
        if lower.starts_with("freq") {
            let magnitude = match lower.rsplit_once('-') {
                None => Magnitude::None,
                Some((_, "k")) => Magnitude::Kilo,
                Some((_, "m")) => Magnitude::Mega,
                Some((_, "g")) => Magnitude::Giga,
                Some(_) => return Err(unknown()),
            };
            return Ok(Unit::new(UnitKind::Frequency, magnitude));
        }
        Err(unknown())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match (self.kind, self.magnitude) {
            (UnitKind::Channel, _) => "chan",
            (UnitKind::Velocity, _) => "vel",
            (UnitKind::Frequency, Magnitude::None) => "freq",
            (UnitKind::Frequency, Magnitude::Kilo) => "freq-k",
            (UnitKind::Frequency, Magnitude::Mega) => "freq-m",
            (UnitKind::Frequency, Magnitude::Giga) => "freq-g",
        };
        f.write_str(s)
    }
}
