//! Calibration Core
//!
//! Aggregates posterior samples from repeated inference runs into the
//! empirical CDF of a P-P plot, and provides the analytic binomial bands
//! that a perfectly calibrated process would stay within.

pub mod aggregator;
pub mod bands;
pub mod error;
pub mod quantile;

pub use aggregator::{bin_levels, pp_cdf, CalibrationCurve, DEFAULT_BINS};
pub use bands::{cdf_stds, confidence_band, ConfidenceBand};
pub use error::*;
pub use quantile::{percentile, quantile_sorted, sorted_samples};
