//! P-P figure construction
//!
//! Turns bin levels and an empirical CDF into a declarative [`Figure`]:
//! binomial bands, optional direct-draw references, optional diagonal and
//! the curve itself, in drawing order.

use calibration_core::{bin_levels, cdf_stds, CalibrationCurve};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlotError;
use crate::options::{PlotOptions, PlotStyle, RgbColor};

/// One drawable element of a P-P figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Layer {
    /// Filled region between the `-sigma` and `+sigma` bands, as a closed polygon
    SigmaBand {
        sigma: f64,
        polygon: Vec<(f64, f64)>,
        color: RgbColor,
        alpha: f64,
    },
    /// CDF of a direct draw from U[0, 1]
    DirectDraw {
        points: Vec<(f64, f64)>,
        color: RgbColor,
        alpha: f64,
    },
    /// Dashed y = x reference
    Diagonal {
        points: Vec<(f64, f64)>,
        color: RgbColor,
        alpha: f64,
    },
    EmpiricalCdf {
        points: Vec<(f64, f64)>,
        color: RgbColor,
        width: u32,
    },
}

impl Layer {
    pub fn is_curve(&self) -> bool {
        !matches!(self, Layer::SigmaBand { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub label: String,
    pub range: (f64, f64),
    pub ticks: Vec<f64>,
}

impl Axis {
    fn unit(label: &str) -> Self {
        Self {
            label: label.to_string(),
            range: (0.0, 1.0),
            ticks: (0..=10).map(|i| i as f64 / 10.0).collect(),
        }
    }
}

/// A fully specified P-P plot, ready to be drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub style: PlotStyle,
    layers: Vec<Layer>,
}

impl Figure {
    /// Layers in drawing order, back to front.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of line layers, including references.
    pub fn curve_count(&self) -> usize {
        self.layers.iter().filter(|l| l.is_curve()).count()
    }

    pub fn empirical_cdf(&self) -> Option<&[(f64, f64)]> {
        self.layers.iter().find_map(|l| match l {
            Layer::EmpiricalCdf { points, .. } => Some(points.as_slice()),
            _ => None,
        })
    }
}

/// Build the P-P figure for one parameter.
///
/// `bins` and `cdf` come from the aggregator, `n_runs` is the number of
/// runs that produced them and sets the band widths.
pub fn make_plots(
    bins: &[f64],
    cdf: &[f64],
    n_runs: usize,
    param_name: &str,
    options: &PlotOptions,
) -> Result<Figure, PlotError> {
    if bins.is_empty() {
        return Err(PlotError::InvalidArgument("no bins to plot".to_string()));
    }
    if bins.len() != cdf.len() {
        return Err(PlotError::InvalidArgument(format!(
            "{} bins but {} CDF values",
            bins.len(),
            cdf.len()
        )));
    }
    if n_runs == 0 {
        return Err(PlotError::InvalidArgument(
            "run count must be positive".to_string(),
        ));
    }

    let n_bins = bins.len();
    let style = &options.style;
    let mut layers = Vec::new();

    if options.sigmas {
        let edges = bin_levels(n_bins + 1);
        for (index, &sigma) in options.sigma_levels.iter().enumerate() {
            let upper = cdf_stds(n_bins, n_runs, sigma)?;
            let lower = cdf_stds(n_bins, n_runs, -sigma)?;

            // Bands span horizontally at each edge height.
            let polygon = upper
                .iter()
                .zip(&edges)
                .map(|(&x, &y)| (x, y))
                .chain(lower.iter().zip(&edges).rev().map(|(&x, &y)| (x, y)))
                .collect();

            layers.push(Layer::SigmaBand {
                sigma,
                polygon,
                color: style.band_color,
                alpha: PlotOptions::band_alpha(index),
            });
        }
    }

    if options.direct_draw {
        let count = options.direct_draws;
        let draws = match options.seed {
            Some(seed) => direct_draws(&mut StdRng::seed_from_u64(seed), count, n_runs, n_bins),
            None => direct_draws(&mut rand::thread_rng(), count, n_runs, n_bins),
        };
        layers.extend(draws.into_iter().map(|points| Layer::DirectDraw {
            points,
            color: style.direct_draw_color,
            alpha: style.direct_draw_alpha,
        }));
    }

    if options.diag {
        layers.push(Layer::Diagonal {
            points: vec![(0.0, 0.0), (1.0, 1.0)],
            color: style.diag_color,
            alpha: style.diag_alpha,
        });
    }

    layers.push(Layer::EmpiricalCdf {
        points: bins.iter().copied().zip(cdf.iter().copied()).collect(),
        color: style.curve_color,
        width: style.curve_width,
    });

    debug!(
        param = param_name,
        n_bins,
        n_runs,
        layers = layers.len(),
        "Built P-P figure"
    );

    Ok(Figure {
        title: param_name.to_string(),
        x_axis: Axis::unit("p"),
        y_axis: Axis::unit("P(p)"),
        style: style.clone(),
        layers,
    })
}

/// Figure for an aggregated curve.
pub fn make_plots_for(
    curve: &CalibrationCurve,
    param_name: &str,
    options: &PlotOptions,
) -> Result<Figure, PlotError> {
    make_plots(&curve.bins, &curve.cdf, curve.n_runs, param_name, options)
}

/// CDFs of `count` direct draws of `n_runs` uniforms from U[0, 1].
fn direct_draws<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    n_runs: usize,
    n_bins: usize,
) -> Vec<Vec<(f64, f64)>> {
    (0..count)
        .map(|_| {
            let draw: Vec<f64> = (0..n_runs).map(|_| rng.gen()).collect();
            histogram_cdf(&draw, n_bins)
        })
        .collect()
}

/// Normalised cumulative histogram of `values` over `n_bins` equal bins
/// spanning the values' own `[min, max]`, placed at the bin midpoints.
///
/// When every value is the same the range widens to `value ± 0.5`. The
/// minimum always lands in the first bin and the maximum in the last.
fn histogram_cdf(values: &[f64], n_bins: usize) -> Vec<(f64, f64)> {
    if values.is_empty() || n_bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let step = (hi - lo) / n_bins as f64;
    let edges: Vec<f64> = (0..=n_bins)
        .map(|k| if k == n_bins { hi } else { lo + k as f64 * step })
        .collect();

    let mut hist = vec![0usize; n_bins];
    for &v in values {
        let mut idx = (((v - lo) / (hi - lo)) * n_bins as f64) as usize;
        idx = idx.min(n_bins - 1);
        // Settle rounding against the actual edges.
        if idx > 0 && v < edges[idx] {
            idx -= 1;
        } else if idx + 1 < n_bins && v >= edges[idx + 1] {
            idx += 1;
        }
        hist[idx] += 1;
    }

    let mut running = 0usize;
    edges
        .windows(2)
        .zip(&hist)
        .map(|(edge, &h)| {
            running += h;
            ((edge[0] + edge[1]) / 2.0, running as f64 / values.len() as f64)
        })
        .collect()
}
