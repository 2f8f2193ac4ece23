//! Binomial confidence bands for a P-P curve under perfect calibration.
//!
//! If the inference is calibrated, the number of runs enclosed at level
//! `p` is Binomial(n, p), so the enclosed fraction has mean `p` and
//! standard deviation `sqrt(p (1 - p) / n)`.

use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, Result};

/// Upper and lower `sigma` offsets around the diagonal, one value per bin edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub sigma: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Expected enclosed fraction plus `sigma` standard deviations at each of
/// the `nb + 1` bin edges `i / nb`.
///
/// Call with `+sigma` and `-sigma` for the two sides of a band.
pub fn cdf_stds(nb: usize, n_sample: usize, sigma: f64) -> Result<Vec<f64>> {
    if nb == 0 {
        return Err(CalibrationError::InvalidArgument(
            "number of bins must be positive".to_string(),
        ));
    }
    if n_sample == 0 {
        return Err(CalibrationError::InvalidArgument(
            "sample count must be positive".to_string(),
        ));
    }

    let n = n_sample as f64;
    Ok((0..=nb)
        .map(|i| {
            let p = i as f64 / nb as f64;
            p + sigma * (p * (1.0 - p) / n).sqrt()
        })
        .collect())
}

/// Both sides of the `sigma` band.
pub fn confidence_band(nb: usize, n_sample: usize, sigma: f64) -> Result<ConfidenceBand> {
    let sigma = sigma.abs();
    Ok(ConfidenceBand {
        sigma,
        lower: cdf_stds(nb, n_sample, -sigma)?,
        upper: cdf_stds(nb, n_sample, sigma)?,
    })
}
