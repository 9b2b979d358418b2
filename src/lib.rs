//! `salsa-spectra` library crate.
//!
//! Coordinate model, unit conversion, baseline fitting and Gaussian
//! decomposition for single-dish radio spectra. The binary (`salsa`) is a thin
//! wrapper around this library so the core logic is testable without spawning
//! processes.

pub mod app;
pub mod cli;
pub mod coords;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod report;
pub mod spectrum;

#[cfg(test)]
mod testing;

pub use error::{Result, SpectrumError};
pub use spectrum::Spectrum;
