//! Fitting stages.
//!
//! Responsibilities:
//!
//! - fit a polynomial baseline to picked samples and evaluate it over axis 1
//! - assemble initial guesses and bounds for N Gaussian components
//! - run the joint bounded fit and split the result into components

pub mod baseline;
pub mod gaussian;
pub mod seeds;

pub use baseline::*;
pub use gaussian::*;
pub use seeds::*;
