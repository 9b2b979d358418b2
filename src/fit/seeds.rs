//! Initial guesses and bounds for the Gaussian components.
//!
//! Default seed (every component without a user limit):
//!
//! - mean: guess = axis mean, bounds = `[axis min, axis max]`
//! - sigma: guess = range / 2, bounds = `[0, range]`
//! - amplitude: guess = residual max, bounds = `[0.5 * residual min, 2 * residual max]`
//!
//! A [`ComponentLimit`] `(x_min, x_max, y_min, y_max)` replaces the seed of the
//! component at the same index:
//!
//! - mean: guess = `(x_min + x_max) / 2`, bounds = `[x_min, x_max]`
//! - sigma: guess = `x_max - x_min`, bounds = `[0, 2 * (x_max - x_min)]`
//! - amplitude: guess = `y_max`, bounds = `[y_min, 2 * y_max]`
//!
//! Note the sigma bound is one range wide by default but two ranges wide under a limit.

use crate::domain::{ComponentLimit, ComponentSeed, GaussianComponent};

/// Extent of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl SeriesStats {
    /// `None` for an empty series.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { min, max, mean })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Seed used for components without a user limit.
pub fn default_seed(axis: &SeriesStats, residual: &SeriesStats) -> ComponentSeed {
    let range = axis.range();
    ComponentSeed {
        guess: GaussianComponent::new(axis.mean, range / 2.0, residual.max),
        lower: GaussianComponent::new(axis.min, 0.0, 0.5 * residual.min),
        upper: GaussianComponent::new(axis.max, range, 2.0 * residual.max),
    }
}

/// Seed derived from a user limit box.
pub fn limit_seed(limit: &ComponentLimit) -> ComponentSeed {
    let width = limit.x_max - limit.x_min;
    ComponentSeed {
        guess: GaussianComponent::new((limit.x_min + limit.x_max) / 2.0, width, limit.y_max),
        lower: GaussianComponent::new(limit.x_min, 0.0, limit.y_min),
        upper: GaussianComponent::new(limit.x_max, 2.0 * width, 2.0 * limit.y_max),
    }
}

/// Seeds for `n` components: limits apply index-wise, the rest use the default.
/// Limits beyond `n` are ignored.
pub fn assemble_seeds(
    axis: &SeriesStats,
    residual: &SeriesStats,
    n: usize,
    limits: &[ComponentLimit],
) -> Vec<ComponentSeed> {
    if limits.len() > n {
        log::warn!(
            "{} component limits given for {n} components; ignoring the extra {}",
            limits.len(),
            limits.len() - n
        );
    }
    let fallback = default_seed(axis, residual);
    (0..n)
        .map(|i| limits.get(i).map(limit_seed).unwrap_or(fallback))
        .collect()
}

/// Flattened solver vectors `(initial, lower, upper)`, ordered mean, sigma, amp per component.
pub fn flatten(seeds: &[ComponentSeed]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut initial = Vec::with_capacity(seeds.len() * 3);
    let mut lower = Vec::with_capacity(seeds.len() * 3);
    let mut upper = Vec::with_capacity(seeds.len() * 3);
    for seed in seeds {
        initial.extend(seed.guess.to_array());
        lower.extend(seed.lower.to_array());
        upper.extend(seed.upper.to_array());
    }
    (initial, lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(min: f64, max: f64, mean: f64) -> SeriesStats {
        SeriesStats { min, max, mean }
    }

    #[test]
    fn series_stats() {
        let s = SeriesStats::of(&[3.0, -1.0, 4.0]).unwrap();
        assert_eq!(s.min, -1.0);
        assert_eq!(s.max, 4.0);
        assert_eq!(s.mean, 2.0);
        assert_eq!(s.range(), 5.0);
        assert!(SeriesStats::of(&[]).is_none());
    }

    #[test]
    fn default_seed_uses_axis_and_residual_extrema() {
        let seed = default_seed(&stats(-100.0, 100.0, 0.0), &stats(-0.2, 4.0, 0.5));
        assert_eq!(seed.guess, GaussianComponent::new(0.0, 100.0, 4.0));
        assert_eq!(seed.lower, GaussianComponent::new(-100.0, 0.0, -0.1));
        assert_eq!(seed.upper, GaussianComponent::new(100.0, 200.0, 8.0));
    }

    #[test]
    fn limits_override_index_wise_independent_of_data() {
        let limits = [
            ComponentLimit::new(10.0, 20.0, 1.0, 5.0),
            ComponentLimit::new(30.0, 40.0, 2.0, 6.0),
        ];
        let axis = stats(0.0, 99.0, 49.5);
        let residual = stats(-3.0, 50.0, 1.0);
        let seeds = assemble_seeds(&axis, &residual, 3, &limits);
        assert_eq!(seeds.len(), 3);

        assert_eq!(seeds[0].guess, GaussianComponent::new(15.0, 10.0, 5.0));
        assert_eq!(seeds[0].lower, GaussianComponent::new(10.0, 0.0, 1.0));
        assert_eq!(seeds[0].upper, GaussianComponent::new(20.0, 20.0, 10.0));

        assert_eq!(seeds[1].guess, GaussianComponent::new(35.0, 10.0, 6.0));
        assert_eq!(seeds[1].lower, GaussianComponent::new(30.0, 0.0, 2.0));
        assert_eq!(seeds[1].upper, GaussianComponent::new(40.0, 20.0, 12.0));

        assert_eq!(seeds[2], default_seed(&axis, &residual));
    }

    #[test]
    fn extra_limits_are_ignored() {
        let limits = [ComponentLimit::new(1.0, 2.0, 0.0, 1.0); 3];
        let seeds = assemble_seeds(&stats(0.0, 10.0, 5.0), &stats(0.0, 1.0, 0.5), 1, &limits);
        assert_eq!(seeds.len(), 1);
    }

    #[test]
    fn flatten_orders_mean_sigma_amp() {
        let seeds = [limit_seed(&ComponentLimit::new(10.0, 20.0, 1.0, 5.0))];
        let (initial, lower, upper) = flatten(&seeds);
        assert_eq!(initial, vec![15.0, 10.0, 5.0]);
        assert_eq!(lower, vec![10.0, 0.0, 1.0]);
        assert_eq!(upper, vec![20.0, 20.0, 10.0]);
    }
}
