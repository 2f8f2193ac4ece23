//! Calibration Plot
//!
//! Builds P-P calibration figures from the output of `calibration-core`.
//! A [`Figure`] is plain data; drawing it onto a `plotters` backend or
//! into an SVG string is a separate, explicit step.

pub mod error;
pub mod figure;
pub mod options;
pub mod render;

pub use error::PlotError;
pub use figure::{make_plots, make_plots_for, Axis, Figure, Layer};
pub use options::{PlotOptions, PlotStyle, RgbColor};
