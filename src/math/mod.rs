//! Numeric collaborators: linear and bounded nonlinear least squares, Gaussian profiles.

pub mod gaussian;
pub mod lm;
pub mod ols;
pub mod poly;

pub use gaussian::*;
pub use lm::*;
pub use ols::*;
pub use poly::*;
