//! Crate-wide error type.
//!
//! Every fallible operation returns `Result<T, SpectrumError>`. The binary maps
//! an error to a process exit code via [`SpectrumError::exit_code`]:
//!
//! - `2` bad input (arguments, header keywords, units, files)
//! - `3` data shape problems
//! - `4` fit failures reported by a solver

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = SpectrumError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SpectrumError {
    #[error("axis index {index} is out of range (valid: 1..={max})")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("{}", unknown_unit_message(.unit, .ctype.as_deref()))]
    UnknownUnit { unit: String, ctype: Option<String> },

    #[error("fit failed: {0}")]
    FitFailure(String),

    #[error("header keyword '{0}' is missing")]
    MissingKeyword(String),

    #[error("header keyword '{key}' is invalid: {reason}")]
    InvalidKeyword { key: String, reason: String },

    #[error("{what}: expected length {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid FITS data: {0}")]
    Fits(String),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    InvalidArgument(String),
}

impl SpectrumError {
    pub fn fit(message: impl Into<String>) -> Self {
        Self::FitFailure(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ShapeMismatch { .. } => 3,
            Self::FitFailure(_) => 4,
            _ => 2,
        }
    }
}

fn unknown_unit_message(unit: &str, ctype: Option<&str>) -> String {
    match ctype {
        Some(ctype) => format!("{ctype} cannot be converted to '{unit}'"),
        None => format!("unknown unit '{unit}' (expected chan*, freq*[-k|-m|-g] or vel*)"),
    }
}
