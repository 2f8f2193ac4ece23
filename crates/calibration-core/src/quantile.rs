//! Empirical quantiles with linear interpolation between order statistics.
//!
//! Matches the default ("linear") method of the usual statistical
//! percentile functions: the virtual index of quantile `q` over `n`
//! sorted samples is `q * (n - 1)`, and values between two order
//! statistics are interpolated.

use std::cmp::Ordering;

/// Copy and sort samples ascending. NaNs of either sign sort to the end
/// instead of panicking.
pub fn sorted_samples(samples: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = samples
        .iter()
        .map(|&v| if v.is_nan() { v.abs() } else { v })
        .collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Quantile `q` (in `[0, 1]`, clamped) of an already sorted slice.
///
/// Returns NaN for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let last = sorted.len() - 1;
    let rank = q.clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = rank - lo as f64;

    if lo >= last || frac == 0.0 {
        return sorted[lo.min(last)];
    }
    lerp(sorted[lo], sorted[hi], frac)
}

/// Percentile (0..=100) of unsorted samples.
pub fn percentile(samples: &[f64], pct: f64) -> f64 {
    let sorted = sorted_samples(samples);
    quantile_sorted(&sorted, pct / 100.0)
}

// Interpolate from whichever end is closer to keep the result inside [a, b].
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    match t.partial_cmp(&0.5) {
        Some(Ordering::Less) => a + diff * t,
        _ => b - diff * (1.0 - t),
    }
}
