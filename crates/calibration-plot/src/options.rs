//! Rendering configuration, passed explicitly to every figure.

use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const SLATE_GRAY: Self = Self::new(112, 128, 144);
    pub const LIGHT_BLUE: Self = Self::new(173, 216, 230);
    pub const INDIGO: Self = Self::new(75, 0, 130);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_plotters(self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

/// Colors, opacities and fonts of a P-P figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub band_color: RgbColor,
    pub direct_draw_color: RgbColor,
    pub direct_draw_alpha: f64,
    pub diag_color: RgbColor,
    pub diag_alpha: f64,
    pub curve_color: RgbColor,
    pub curve_width: u32,
    pub grid_color: RgbColor,
    /// Opacity of the grid, which is always drawn below the data
    pub grid_alpha: f64,
    pub font_family: String,
    pub title_font_size: u32,
    pub label_font_size: u32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            band_color: RgbColor::SLATE_GRAY,
            direct_draw_color: RgbColor::LIGHT_BLUE,
            direct_draw_alpha: 0.5,
            diag_color: RgbColor::RED,
            diag_alpha: 0.5,
            curve_color: RgbColor::INDIGO,
            curve_width: 2,
            grid_color: RgbColor::BLACK,
            grid_alpha: 0.1,
            font_family: "sans-serif".to_string(),
            title_font_size: 24,
            label_font_size: 16,
        }
    }
}

/// What to draw on a P-P figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotOptions {
    /// Shade the analytic binomial bands
    pub sigmas: bool,
    /// Overlay CDFs of direct draws from U[0, 1]
    pub direct_draw: bool,
    /// Draw the y = x reference line
    pub diag: bool,
    /// Band widths in standard deviations, narrowest first
    pub sigma_levels: Vec<f64>,
    /// Number of direct-draw reference curves
    pub direct_draws: usize,
    /// Seed for the direct draws; the thread RNG is used when unset
    pub seed: Option<u64>,
    pub style: PlotStyle,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            sigmas: true,
            direct_draw: false,
            diag: false,
            sigma_levels: vec![1.0, 2.0, 3.0],
            direct_draws: 100,
            seed: None,
            style: PlotStyle::default(),
        }
    }
}

impl PlotOptions {
    /// Options with every optional layer turned off.
    pub fn curve_only() -> Self {
        Self {
            sigmas: false,
            ..Self::default()
        }
    }

    /// Opacity of the `index`-th band: each wider band is drawn fainter.
    pub fn band_alpha(index: usize) -> f64 {
        (1.0 - index as f64 * 0.3).clamp(0.05, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let options = PlotOptions::default();
        assert!(options.sigmas);
        assert!(!options.direct_draw);
        assert!(!options.diag);
        assert_eq!(options.sigma_levels, vec![1.0, 2.0, 3.0]);
        assert_eq!(options.style.curve_color, RgbColor::INDIGO);
        assert_eq!(options.style.grid_color, RgbColor::BLACK);
    }

    #[test]
    fn test_band_alpha_fades() {
        assert_relative_eq!(PlotOptions::band_alpha(0), 1.0);
        assert_relative_eq!(PlotOptions::band_alpha(1), 0.7);
        assert_relative_eq!(PlotOptions::band_alpha(2), 0.4, epsilon = 1e-12);
        assert_relative_eq!(PlotOptions::band_alpha(9), 0.05);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let options: PlotOptions =
            serde_json::from_str(
                r#"{ "diag": true, "seed": 3, "style": { "curve_width": 4, "grid_color": { "r": 10, "g": 20, "b": 30 } } }"#,
            )
            .unwrap();

        assert!(options.diag);
        assert!(options.sigmas);
        assert_eq!(options.seed, Some(3));
        assert_eq!(options.style.curve_width, 4);
        assert_eq!(options.style.grid_color, RgbColor::new(10, 20, 30));
        assert_eq!(options.style.font_family, "sans-serif");
    }
}
