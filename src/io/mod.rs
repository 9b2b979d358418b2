//! Input/output helpers.
//!
//! - FITS primary-HDU read/write (`fits`)

pub mod fits;

pub use fits::*;
