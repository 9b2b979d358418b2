//! Shared fit pipeline: FITS load -> baseline -> Gaussian decomposition.
//!
//! Kept apart from argument handling so the whole workflow is testable from a
//! plain [`FitConfig`].

use std::path::Path;

use crate::domain::{FitConfig, FitResult};
use crate::error::Result;
use crate::io::read_fits;
use crate::report::FitSummary;
use crate::spectrum::Spectrum;

/// All computed outputs of a single `salsa fit` run.
#[derive(Debug)]
pub struct RunOutput {
    pub spectrum: Spectrum,
    pub fit: FitResult,
    pub summary: FitSummary,
}

/// Load the spectrum from a FITS file.
pub fn load_spectrum(path: &Path) -> Result<Spectrum> {
    let image = read_fits(path)?;
    log::info!("loaded {} ({:?})", path.display(), image.shape);
    Spectrum::new(image.header, &image.data)
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput> {
    let spectrum = load_spectrum(&config.input)?;
    run_fit_on(spectrum, config)
}

/// Run baseline + decomposition on an already loaded spectrum.
pub fn run_fit_on(spectrum: Spectrum, config: &FitConfig) -> Result<RunOutput> {
    let mut spectrum = spectrum.with_solver_config(config.solver);
    let unit = spectrum.parse_unit(&config.unit)?;

    let (xs, ys): (Vec<f64>, Vec<f64>) = config.baseline_points.iter().map(|p| (p.x, p.y)).unzip();
    if spectrum.fit_baseline(&xs, &ys, unit, config.degree)?.is_none() {
        log::warn!("no baseline points given; skipping the Gaussian fit");
    }

    let fit = spectrum
        .fit_gaussian_on_baseline(unit, config.components, &config.limits)?
        .clone();
    let summary = FitSummary::new(&spectrum, &fit, config.degree, config.baseline_points.len());

    Ok(RunOutput {
        spectrum,
        fit,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SynthConfig, SynthLine, generate_spectrum};
    use crate::domain::{ComponentLimit, OutputFormat, SamplePoint, SolverConfig};
    use crate::error::SpectrumError;
    use crate::io::write_fits;

    fn config(points: Vec<SamplePoint>, limits: Vec<ComponentLimit>) -> FitConfig {
        FitConfig {
            input: "unused.fits".into(),
            unit: "chan".to_string(),
            baseline_points: points,
            degree: 2,
            components: limits.len(),
            limits,
            solver: SolverConfig::default(),
            output: OutputFormat::Text,
        }
    }

    #[test]
    fn synthetic_spectrum_end_to_end_through_fits() {
        let synth = generate_spectrum(&SynthConfig {
            channels: 200,
            seed: 3,
            lines: vec![
                SynthLine {
                    channel: 80.0,
                    sigma: 5.0,
                    amplitude: 10.0,
                },
                SynthLine {
                    channel: 110.0,
                    sigma: 8.0,
                    amplitude: 4.0,
                },
            ],
            noise: 0.0,
            ..SynthConfig::default()
        })
        .unwrap();

        let path = std::env::temp_dir().join(format!("salsa-pipeline-{}.fits", std::process::id()));
        write_fits(&path, &synth.header, &synth.flux, &[synth.flux.len()]).unwrap();

        let points = [0usize, 10, 20, 30, 40, 160, 170, 180, 190, 199]
            .iter()
            .map(|&k| SamplePoint {
                x: k as f64,
                y: synth.flux[k],
            })
            .collect();
        let limits = vec![
            ComponentLimit::new(75.0, 85.0, 0.0, 11.0),
            ComponentLimit::new(104.0, 116.0, 0.0, 5.0),
        ];
        let mut cfg = config(points, limits);
        cfg.input = path.clone();

        let out = run_fit(&cfg).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(out.fit.params.len(), 2);
        let a = out.fit.params[0];
        let b = out.fit.params[1];
        assert!((a.mean - 80.0).abs() < 1e-3, "{a:?}");
        assert!((a.amplitude - 10.0).abs() < 1e-3, "{a:?}");
        assert!((b.mean - 110.0).abs() < 1e-3, "{b:?}");
        assert!((b.sigma - 8.0).abs() < 1e-3, "{b:?}");
        assert!(out.summary.residual_rms.unwrap() < 1e-3);
        assert_eq!(out.summary.flux_unit.as_deref(), Some("K"));
    }

    #[test]
    fn no_points_gives_an_empty_fit() {
        let synth = generate_spectrum(&SynthConfig::default()).unwrap();
        let spectrum = Spectrum::new(synth.header, &synth.flux).unwrap();
        let out = run_fit_on(spectrum, &config(Vec::new(), vec![ComponentLimit::new(1.0, 2.0, 0.0, 1.0)])).unwrap();
        assert!(out.fit.is_empty());
        assert!(out.summary.residual_rms.is_none());
        assert!(out.spectrum.baseline().is_none());
    }

    #[test]
    fn unknown_unit_reports_the_file_axis_type() {
        let synth = generate_spectrum(&SynthConfig::default()).unwrap();
        let spectrum = Spectrum::new(synth.header, &synth.flux).unwrap();
        let mut cfg = config(vec![SamplePoint { x: 0.0, y: 1.0 }], Vec::new());
        cfg.unit = "wavelength".to_string();

        let err = run_fit_on(spectrum, &cfg).unwrap_err();
        assert!(matches!(err, SpectrumError::UnknownUnit { .. }));
        assert!(err.to_string().starts_with("FREQ cannot be converted"), "{err}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut cfg = config(Vec::new(), Vec::new());
        cfg.input = "/nonexistent/salsa.fits".into();
        let err = run_fit(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
