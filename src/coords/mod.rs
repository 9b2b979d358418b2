//! Spectral coordinates: the per-axis linear model and unit conversion on top of it.

pub mod axis;
pub mod convert;

pub use axis::*;
pub use convert::*;
