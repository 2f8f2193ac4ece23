//! P-P Calibration Aggregator
//!
//! For every run, finds the smallest symmetric credible interval of the
//! posterior samples that contains the injected true value, and turns the
//! per-level counts into an empirical CDF over credible levels.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CalibrationError, Result};
use crate::quantile::{quantile_sorted, sorted_samples};

/// Number of credible levels used when the caller has no preference.
pub const DEFAULT_BINS: usize = 11;

/// Result of aggregating a set of runs into a P-P curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCurve {
    /// Credible levels, equally spaced over [0, 1] (x-axis of the plot)
    pub bins: Vec<f64>,
    /// Cumulative fraction of runs enclosed at or below each level
    pub cdf: Vec<f64>,
    /// Runs whose smallest enclosing interval is exactly at each level
    pub counts: Vec<usize>,
    /// Total number of runs supplied
    pub n_runs: usize,
    /// Runs whose true value lay outside even the widest interval.
    /// These runs are in no bin, so `cdf` ends below 1.0 when this is non-zero.
    pub dropped_runs: usize,
}

impl CalibrationCurve {
    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    /// Runs that landed in some bin.
    pub fn counted_runs(&self) -> usize {
        self.n_runs - self.dropped_runs
    }
}

/// `n_bins` equally spaced levels over [0, 1], both ends included.
pub fn bin_levels(n_bins: usize) -> Vec<f64> {
    match n_bins {
        0 => Vec::new(),
        1 => vec![0.0],
        n => {
            let step = 1.0 / (n - 1) as f64;
            (0..n)
                .map(|j| if j == n - 1 { 1.0 } else { j as f64 * step })
                .collect()
        }
    }
}

/// Build the P-P curve for one parameter.
///
/// `samples[i]` holds the posterior samples of run `i` and `truths[i]` the
/// value injected for that run. Runs may have different sample counts.
pub fn pp_cdf<S: AsRef<[f64]>>(
    samples: &[S],
    truths: &[f64],
    n_bins: usize,
) -> Result<CalibrationCurve> {
    if n_bins == 0 {
        return Err(CalibrationError::InvalidArgument(
            "number of bins must be positive".to_string(),
        ));
    }
    if samples.is_empty() {
        return Err(CalibrationError::InsufficientData(
            "at least one run is required".to_string(),
        ));
    }
    if samples.len() != truths.len() {
        return Err(CalibrationError::InvalidArgument(format!(
            "{} sample sets but {} true values",
            samples.len(),
            truths.len()
        )));
    }
    if let Some(run) = samples.iter().position(|s| s.as_ref().is_empty()) {
        return Err(CalibrationError::InvalidArgument(format!(
            "run {run} has no samples"
        )));
    }

    let n_runs = samples.len();
    let bins = bin_levels(n_bins);
    let mut counts = vec![0usize; n_bins];
    let mut dropped_runs = 0usize;

    for (run, (chain, &truth)) in samples.iter().zip(truths).enumerate() {
        let chain = chain.as_ref();
        // Any NaN makes every percentile NaN, so no interval can enclose the truth.
        if chain.iter().any(|v| v.is_nan()) {
            warn!(run, truth, "Samples contain NaN, run not counted");
            dropped_runs += 1;
            continue;
        }

        let sorted = sorted_samples(chain);
        match smallest_enclosing_level(&sorted, truth, &bins) {
            Some(level) => counts[level] += 1,
            None => {
                warn!(
                    run,
                    truth,
                    min = sorted.first().copied().unwrap_or(f64::NAN),
                    max = sorted.last().copied().unwrap_or(f64::NAN),
                    "True value outside the widest credible interval, run not counted"
                );
                dropped_runs += 1;
            }
        }
    }

    let mut running = 0usize;
    let cdf = counts
        .iter()
        .map(|&c| {
            running += c;
            running as f64 / n_runs as f64
        })
        .collect();

    debug!(n_runs, n_bins, dropped_runs, "Aggregated P-P calibration curve");

    Ok(CalibrationCurve {
        bins,
        cdf,
        counts,
        n_runs,
        dropped_runs,
    })
}

/// Symmetric credible interval at level `p` of a sorted sample set.
///
/// Tail fractions go through percent and back so that a truth sitting
/// exactly on an interpolated bound rounds the same way a percentile call does.
fn credible_interval(sorted: &[f64], p: f64) -> (f64, f64) {
    (
        quantile_sorted(sorted, (1.0 - p) / 2.0 * 100.0 / 100.0),
        quantile_sorted(sorted, (1.0 + p) / 2.0 * 100.0 / 100.0),
    )
}

/// Index of the first level whose interval contains `truth`.
///
/// Intervals grow with the level, so containment is monotone and a
/// binary search finds the same level a linear scan would.
fn smallest_enclosing_level(sorted: &[f64], truth: f64, levels: &[f64]) -> Option<usize> {
    let encloses = |p: f64| {
        let (lower, upper) = credible_interval(sorted, p);
        lower <= truth && truth <= upper
    };
    let idx = levels.partition_point(|&p| !encloses(p));
    (idx < levels.len()).then_some(idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn grid_run() -> Vec<f64> {
        (0..=100).map(f64::from).collect()
    }

    #[test]
    fn test_bin_levels_match_linspace() {
        assert_eq!(bin_levels(5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(bin_levels(1), vec![0.0]);
        assert!(bin_levels(0).is_empty());

        let eleven = bin_levels(DEFAULT_BINS);
        assert_eq!(eleven.len(), 11);
        assert_relative_eq!(eleven[3], 0.3, epsilon = 1e-15);
        assert_eq!(eleven[10], 1.0);
    }

    #[test]
    fn test_truth_at_median_fills_first_bin() {
        let samples = vec![grid_run(); 4];
        let truths = [50.0; 4];

        let curve = pp_cdf(&samples, &truths, 5).unwrap();

        assert_eq!(curve.bins, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(curve.cdf, vec![1.0; 5]);
        assert_eq!(curve.counts, vec![4, 0, 0, 0, 0]);
        assert_eq!(curve.dropped_runs, 0);
    }

    #[test]
    fn test_runs_land_in_smallest_enclosing_level() {
        let samples = vec![grid_run(); 4];
        // 75 is the upper edge of the 50% interval, 90 and 10 need the full range,
        // 101 is outside every interval.
        let truths = [50.0, 75.0, 90.0, 101.0];

        let curve = pp_cdf(&samples, &truths, 5).unwrap();

        assert_eq!(curve.counts, vec![1, 0, 1, 0, 1]);
        assert_eq!(curve.dropped_runs, 1);
        assert_eq!(curve.counted_runs(), 3);
        assert_eq!(curve.cdf, vec![0.25, 0.25, 0.5, 0.5, 0.75]);
    }

    #[test]
    fn test_lower_tail_is_symmetric_with_upper_tail() {
        let samples = vec![grid_run(); 2];
        let curve = pp_cdf(&samples, &[25.0, 75.0], 5).unwrap();
        assert_eq!(curve.counts, vec![0, 0, 2, 0, 0]);
    }

    #[test]
    fn test_unequal_run_lengths() {
        let samples = vec![vec![0.0, 1.0, 2.0], grid_run()];
        let curve = pp_cdf(&samples, &[1.0, 50.0], 3).unwrap();
        assert_eq!(curve.counts, vec![2, 0, 0]);
        assert_eq!(curve.cdf, vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_binary_search_agrees_with_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let levels = bin_levels(DEFAULT_BINS);

        for _ in 0..200 {
            let chain: Vec<f64> = (0..rng.gen_range(1..60)).map(|_| rng.gen::<f64>()).collect();
            let sorted = sorted_samples(&chain);
            let truth = rng.gen_range(-0.1..1.1);

            let linear = levels.iter().position(|&p| {
                let (lo, hi) = credible_interval(&sorted, p);
                lo <= truth && truth <= hi
            });
            assert_eq!(smallest_enclosing_level(&sorted, truth, &levels), linear);
        }
    }

    #[test]
    fn test_cdf_is_monotone_and_bounded() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<Vec<f64>> = (0..50)
            .map(|_| (0..200).map(|_| rng.gen::<f64>()).collect())
            .collect();
        let truths: Vec<f64> = (0..50).map(|_| rng.gen::<f64>()).collect();

        let curve = pp_cdf(&samples, &truths, DEFAULT_BINS).unwrap();

        assert!(curve.cdf.windows(2).all(|w| w[0] <= w[1]));
        assert!(curve.cdf.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(curve.counts.iter().sum::<usize>() + curve.dropped_runs, 50);
        assert_relative_eq!(
            curve.cdf[DEFAULT_BINS - 1],
            curve.counted_runs() as f64 / 50.0
        );
    }

    #[test]
    fn test_nan_samples_drop_the_run() {
        let mut with_nan = grid_run();
        with_nan[10] = -f64::NAN;
        let samples = vec![grid_run(), with_nan];

        let curve = pp_cdf(&samples, &[50.0, 50.0], 5).unwrap();

        assert_eq!(curve.counts, vec![1, 0, 0, 0, 0]);
        assert_eq!(curve.dropped_runs, 1);
        assert_eq!(curve.cdf, vec![0.5; 5]);
    }

    #[test]
    fn test_truth_on_interpolated_bound_uses_percentile_rounding() {
        // With 21 levels, the 95% lower tail is 0.024999999999999963 once
        // expressed as a percentile, one ulp below the direct fraction.
        let levels = bin_levels(21);
        let (lower, _) = credible_interval(&[0.0, 1.0], levels[19]);
        assert_eq!(lower, 0.024999999999999963);

        let curve = pp_cdf(&[vec![0.0, 1.0]], &[0.024999999999999963], 21).unwrap();
        assert_eq!(curve.counts[19], 1);
        assert_eq!(curve.dropped_runs, 0);
    }

    #[test]
    fn test_invalid_arguments() {
        let samples = vec![grid_run()];

        assert!(matches!(
            pp_cdf(&samples, &[1.0], 0),
            Err(CalibrationError::InvalidArgument(_))
        ));
        assert!(matches!(
            pp_cdf(&samples, &[1.0, 2.0], 5),
            Err(CalibrationError::InvalidArgument(_))
        ));
        assert!(matches!(
            pp_cdf::<Vec<f64>>(&[], &[], 5),
            Err(CalibrationError::InsufficientData(_))
        ));
        assert!(matches!(
            pp_cdf(&[grid_run(), Vec::new()], &[1.0, 2.0], 5),
            Err(CalibrationError::InvalidArgument(_))
        ));
    }
}
