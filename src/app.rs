//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - loads `.env` and installs the logger
//! - parses CLI arguments
//! - runs the requested command and prints its report

use chrono::Utc;
use clap::Parser;

use crate::cli::{AxisArgs, Command, ConvertArgs, FitArgs, InfoArgs, SynthArgs};
use crate::data::{SynthConfig, generate_spectrum};
use crate::domain::{FitConfig, OutputFormat, SolverConfig};
use crate::error::{Result, SpectrumError};
use crate::io::{read_fits, write_fits};
use crate::report::{
    HeaderSummary, format_axis_table, format_fit_summary, format_header_summary, to_json,
};

pub mod pipeline;

/// Entry point for the `salsa` binary.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Info(args) => handle_info(args),
        Command::Axis(args) => handle_axis(args),
        Command::Convert(args) => handle_convert(args),
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
    }
}

fn init_logging() {
    env_logger::Builder::from_env(logger_env())
        .format_timestamp(None)
        .try_init()
        .ok();
}

/// Filter from `SALSA_LOG`, `warn` when unset; style from `SALSA_LOG_STYLE`.
fn logger_env() -> env_logger::Env<'static> {
    env_logger::Env::new()
        .filter_or("SALSA_LOG", "warn")
        .write_style("SALSA_LOG_STYLE")
}

fn handle_info(args: InfoArgs) -> Result<()> {
    let image = read_fits(&args.file)?;
    let summary = HeaderSummary::from_header(&image.header)?;
    print!("{}", format_header_summary(&summary));
    Ok(())
}

fn handle_axis(args: AxisArgs) -> Result<()> {
    let spectrum = pipeline::load_spectrum(&args.file)?;
    let unit = spectrum.parse_unit(&args.unit)?;
    let axis = spectrum.axis(unit);
    print!("{}", format_axis_table(&axis, spectrum.flux()));
    Ok(())
}

fn handle_convert(args: ConvertArgs) -> Result<()> {
    let spectrum = pipeline::load_spectrum(&args.file)?;
    let unit = spectrum.parse_unit(&args.unit)?;
    if args.inverse {
        let value = spectrum.convert_from_frequency(args.value, unit);
        println!("{value} {}", unit.label());
    } else {
        let hz = spectrum.convert_to_frequency(args.value, unit);
        println!("{hz} Hz");
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<()> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    match config.output {
        OutputFormat::Text => print!("{}", format_fit_summary(&run.summary)),
        OutputFormat::Json => println!("{}", to_json(&run.summary)?),
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<()> {
    let defaults = SynthConfig::default();
    let config = SynthConfig {
        channels: args.channels,
        seed: args.seed,
        lines: if args.lines.is_empty() { defaults.lines } else { args.lines },
        noise: args.noise,
        vlsr_kms: args.vlsr,
        date_obs: Some(Utc::now().naive_utc()),
    };
    let synth = generate_spectrum(&config)?;
    write_fits(&args.out, &synth.header, &synth.flux, &[synth.flux.len()])?;
    println!("wrote {} channels to {}", synth.flux.len(), args.out.display());
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig> {
    for (name, tol) in [("ftol", args.ftol), ("xtol", args.xtol), ("gtol", args.gtol)] {
        if !(tol.is_finite() && tol > 0.0) {
            return Err(SpectrumError::InvalidArgument(format!(
                "{name} must be a positive number, got {tol}"
            )));
        }
    }

    Ok(FitConfig {
        input: args.file.clone(),
        unit: args.unit.clone(),
        baseline_points: args.points.clone(),
        degree: args.degree,
        components: args.components,
        limits: args.limits.clone(),
        solver: SolverConfig {
            max_iterations: args.max_iterations,
            ftol: args.ftol,
            xtol: args.xtol,
            gtol: args.gtol,
        },
        output: if args.json { OutputFormat::Json } else { args.format },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn fit_args(argv: &[&str]) -> FitArgs {
        let mut full = vec!["salsa", "fit", "spectrum.fits"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Fit(args) => args,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_flag_selects_json_output() {
        let config = fit_config_from_args(&fit_args(&["-u", "freq-m", "--json", "--max-iterations", "50"])).unwrap();
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.unit, "freq-m");
        assert_eq!(config.solver.max_iterations, Some(50));
        assert_eq!(config.solver.iteration_budget(3), 50);
    }

    #[test]
    fn defaults_follow_solver_config() {
        let config = fit_config_from_args(&fit_args(&["-u", "chan"])).unwrap();
        assert_eq!(config.solver, SolverConfig::default());
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.components, 1);
    }

    #[test]
    fn logger_defaults_to_warn() {
        if std::env::var_os("SALSA_LOG").is_some() {
            return;
        }
        let logger = env_logger::Builder::from_env(logger_env()).build();
        assert_eq!(logger.filter(), log::LevelFilter::Warn);
    }

    #[test]
    fn rejects_non_positive_tolerances() {
        assert!(fit_config_from_args(&fit_args(&["-u", "chan", "--ftol", "0"])).is_err());
        assert!(fit_config_from_args(&fit_args(&["-u", "chan", "--gtol", "1e-8"])).is_ok());
    }
}
