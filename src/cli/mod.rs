//! Command-line parsing for the spectrum tool.
//!
//! Argument parsing stays here; dispatch lives in `app`, the math in `fit` and
//! `math`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::SynthLine;
use crate::domain::{ComponentLimit, OutputFormat, SamplePoint};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salsa", version, about = "Single-dish radio spectrum baseline and Gaussian fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a summary of the spectrum header.
    Info(InfoArgs),
    /// Print axis 1 in the requested unit next to the flux, one channel per line.
    Axis(AxisArgs),
    /// Convert a scalar to frequency in Hz (or from Hz with --inverse).
    Convert(ConvertArgs),
    /// Fit a baseline to picked points, then decompose the residual into Gaussians.
    Fit(FitArgs),
    /// Write a synthetic 21 cm spectrum as FITS.
    Synth(SynthArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct InfoArgs {
    /// FITS file holding the spectrum.
    #[arg(value_name = "FITS")]
    pub file: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct AxisArgs {
    /// FITS file holding the spectrum.
    #[arg(value_name = "FITS")]
    pub file: PathBuf,

    /// Axis unit: chan, freq, freq-k, freq-m, freq-g or vel.
    #[arg(short = 'u', long, env = "SALSA_UNIT", default_value = "chan")]
    pub unit: String,
}

#[derive(Debug, Parser, Clone)]
pub struct ConvertArgs {
    /// FITS file holding the spectrum.
    #[arg(value_name = "FITS")]
    pub file: PathBuf,

    /// Unit of the value (or of the result with --inverse).
    #[arg(short = 'u', long, env = "SALSA_UNIT", default_value = "chan")]
    pub unit: String,

    /// Value to convert.
    #[arg(long, allow_negative_numbers = true)]
    pub value: f64,

    /// Treat the value as a frequency in Hz and convert it into --unit.
    #[arg(long)]
    pub inverse: bool,
}

/// Options for `salsa fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// FITS file holding the spectrum.
    #[arg(value_name = "FITS")]
    pub file: PathBuf,

    /// Unit of the picked points, limits and reported parameters.
    #[arg(short = 'u', long, env = "SALSA_UNIT", default_value = "chan")]
    pub unit: String,

    /// Baseline sample `x,y`; repeat for each picked point.
    #[arg(short = 'p', long = "point", value_name = "X,Y", allow_hyphen_values = true)]
    pub points: Vec<SamplePoint>,

    /// Baseline polynomial degree.
    #[arg(short = 'd', long, env = "SALSA_DEGREE", default_value_t = crate::fit::DEFAULT_BASELINE_DEGREE)]
    pub degree: usize,

    /// Number of Gaussian components.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub components: usize,

    /// Component box `xmin,xmax,ymin,ymax`; the i-th limit applies to component i.
    #[arg(short = 'l', long = "limit", value_name = "BOX", allow_hyphen_values = true)]
    pub limits: Vec<ComponentLimit>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Shorthand for `--format json`.
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Solver iteration budget (default: 200 * (parameters + 1)).
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Relative cost-reduction tolerance.
    #[arg(long, default_value_t = 1e-10)]
    pub ftol: f64,

    /// Relative step tolerance.
    #[arg(long, default_value_t = 1e-10)]
    pub xtol: f64,

    /// Gradient tolerance.
    #[arg(long, default_value_t = 1e-10)]
    pub gtol: f64,
}

/// Options for `salsa synth`.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Output FITS path.
    #[arg(short = 'o', long, value_name = "FITS")]
    pub out: PathBuf,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of channels.
    #[arg(long, default_value_t = 256)]
    pub channels: usize,

    /// Emission line `channel,sigma,amplitude`; repeat for more lines.
    #[arg(long = "line", value_name = "CHAN,SIGMA,AMP")]
    pub lines: Vec<SynthLine>,

    /// Noise standard deviation.
    #[arg(long, default_value_t = 0.2)]
    pub noise: f64,

    /// VELO-LSR header value in km/s.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub vlsr: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_args_parse_points_and_limits() {
        let cli = Cli::try_parse_from([
            "salsa", "fit", "spec.fits", "--unit", "vel", "-p", "-40,1.5", "-p", "40,1.7", "-n", "2", "--limit",
            "-10,-20,0,5", "--json",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.unit, "vel");
        assert_eq!(args.points, vec![SamplePoint { x: -40.0, y: 1.5 }, SamplePoint { x: 40.0, y: 1.7 }]);
        assert_eq!(args.components, 2);
        assert_eq!(args.limits, vec![ComponentLimit::new(-20.0, -10.0, 0.0, 5.0)]);
        assert!(args.json);
    }

    #[test]
    fn unit_is_resolved_after_loading() {
        // Unknown units get reported against the file's CTYPE1, not by the parser.
        let cli = Cli::try_parse_from(["salsa", "axis", "spec.fits", "--unit", "wavelength"]).unwrap();
        let Command::Axis(args) = cli.command else {
            panic!("expected axis");
        };
        assert_eq!(args.unit, "wavelength");
    }

    #[test]
    fn convert_accepts_negative_values() {
        let cli = Cli::try_parse_from(["salsa", "convert", "s.fits", "-u", "freq-m", "--value", "-3.5"]).unwrap();
        let Command::Convert(args) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.unit, "freq-m");
        assert_eq!(args.value, -3.5);
        assert!(!args.inverse);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
