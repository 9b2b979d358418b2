//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the spectral header mapping (`SpectralHeader`, `HeaderValue`)
//! - the closed unit model (`Unit`, `UnitKind`, `Magnitude`)
//! - fit inputs and outputs (`ComponentLimit`, `GaussianComponent`, `FitResult`, ...)

pub mod header;
pub mod types;
pub mod unit;

pub use header::*;
pub use types::*;
pub use unit::*;
