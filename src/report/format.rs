//! Terminal and JSON formatting of summaries.
//!
//! Formatting lives here so the fitting code stays free of presentation and
//! output changes stay localized.

use serde::Serialize;

use crate::error::{Result, SpectrumError};
use crate::report::{FitSummary, HeaderSummary};

pub fn format_header_summary(summary: &HeaderSummary) -> String {
    let mut out = String::new();

    out.push_str("=== salsa - spectrum header ===\n");
    out.push_str(&format!("Object: {}\n", summary.object.as_deref().unwrap_or("-")));
    out.push_str(&format!("Telescope: {}\n", summary.telescope.as_deref().unwrap_or("-")));
    match summary.date_obs {
        Some(date) => out.push_str(&format!("Observed: {}\n", date.format("%Y-%m-%d %H:%M:%S"))),
        None => out.push_str("Observed: -\n"),
    }
    match summary.vlsr_kms {
        Some(v) => out.push_str(&format!("VLSR: {v:.3} km/s\n")),
        None => out.push_str("VLSR: -\n"),
    }
    out.push_str(&format!("Flux unit: {}\n", summary.flux_unit.as_deref().unwrap_or("-")));

    out.push_str("\nAxes:\n");
    for axis in &summary.axes {
        out.push_str(&format!(
            "  {:>2}  n={:<6} {:<8} crval={:<20} cdelt={}\n",
            axis.index,
            axis.length,
            axis.ctype.as_deref().unwrap_or("-"),
            fmt_opt(axis.crval),
            fmt_opt(axis.cdelt),
        ));
    }
    out
}

pub fn format_fit_summary(summary: &FitSummary) -> String {
    let mut out = String::new();
    let x = summary.unit_label;
    let y = summary.flux_unit.as_deref().unwrap_or("flux");

    out.push_str("=== salsa - spectrum fit ===\n");
    out.push_str(&format!("Channels: {} | x unit: {x} | y unit: {y}\n", summary.channels));
    out.push_str(&format!(
        "Baseline: degree {} from {} point(s)\n",
        summary.baseline_degree, summary.baseline_points
    ));

    if summary.components.is_empty() {
        out.push_str("\nNo Gaussian components fitted.\n");
    } else {
        out.push_str(&format!(
            "\n{:>3}  {:>16} {:>14} {:>14} {:>12} {:>14}\n",
            "#",
            format!("mean [{x}]"),
            "sigma",
            "FWHM",
            format!("amp [{y}]"),
            "area"
        ));
        for (i, c) in summary.components.iter().enumerate() {
            out.push_str(&format!(
                "{:>3}  {:>16.6} {:>14.6} {:>14.6} {:>12.4} {:>14.6}\n",
                i + 1,
                c.mean,
                c.sigma,
                c.fwhm,
                c.amplitude,
                c.area
            ));
        }
    }

    if let Some(rms) = summary.residual_rms {
        out.push_str(&format!("\nResidual RMS: {rms:.6} {y}\n"));
    }
    out
}

/// Tab-separated `axis<TAB>flux` rows.
pub fn format_axis_table(axis: &[f64], flux: &[f64]) -> String {
    let mut out = String::with_capacity(axis.len() * 32);
    for (x, f) in axis.iter().zip(flux) {
        out.push_str(&format!("{x}\t{f}\n"));
    }
    out
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| SpectrumError::InvalidArgument(format!("JSON serialization failed: {e}")))
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|v| format!("{v}")).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Unit;
    use crate::report::ComponentSummary;
    use crate::testing::hi_header;

    fn summary() -> FitSummary {
        FitSummary {
            unit: Unit::VELOCITY,
            unit_label: "km/s",
            flux_unit: Some("K".to_string()),
            channels: 100,
            baseline_degree: 2,
            baseline_points: 8,
            components: vec![ComponentSummary {
                mean: -12.5,
                sigma: 3.0,
                fwhm: 7.06,
                amplitude: 4.0,
                area: 30.08,
            }],
            residual_rms: Some(0.05),
        }
    }

    #[test]
    fn fit_summary_mentions_units_and_components() {
        let text = format_fit_summary(&summary());
        assert!(text.contains("x unit: km/s"));
        assert!(text.contains("mean [km/s]"));
        assert!(text.contains("amp [K]"));
        assert!(text.contains("-12.500000"));
        assert!(text.contains("Residual RMS: 0.050000 K"));
    }

    #[test]
    fn empty_fit_is_reported() {
        let mut s = summary();
        s.components.clear();
        s.residual_rms = None;
        let text = format_fit_summary(&s);
        assert!(text.contains("No Gaussian components fitted."));
        assert!(!text.contains("Residual RMS"));
    }

    #[test]
    fn header_summary_text() {
        let text = format_header_summary(&HeaderSummary::from_header(&hi_header()).unwrap());
        assert!(text.contains("VLSR: 5.000 km/s"));
        assert!(text.contains("FREQ"));
        assert!(text.contains("crval=1420000000"));
    }

    #[test]
    fn json_uses_lowercase_unit_kinds() {
        let json = to_json(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["unit"]["kind"], "velocity");
        assert_eq!(value["components"][0]["mean"], -12.5);
    }

    #[test]
    fn axis_table_rows() {
        assert_eq!(format_axis_table(&[1.0, 2.5], &[0.5, -1.0]), "1\t0.5\n2.5\t-1\n");
    }
}
