//! Drawing a [`Figure`] with plotters.

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{render_err, PlotError};
use crate::figure::{Figure, Layer};

const DASH_LENGTH: f64 = 0.02;
const DASH_GAP: f64 = 0.012;

impl Figure {
    /// Draw onto any plotters drawing area. Presenting the area is left to the caller.
    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), PlotError> {
        let style = &self.style;
        let family = style.font_family.as_str();

        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .caption(&self.title, (family, f64::from(style.title_font_size)))
            .x_label_area_size(45)
            .y_label_area_size(55)
            .build_cartesian_2d(
                self.x_axis.range.0..self.x_axis.range.1,
                self.y_axis.range.0..self.y_axis.range.1,
            )
            .map_err(render_err)?;

        // Mesh first so the grid sits below every layer.
        chart
            .configure_mesh()
            .x_desc(self.x_axis.label.as_str())
            .y_desc(self.y_axis.label.as_str())
            .axis_desc_style((family, f64::from(style.label_font_size)))
            .x_labels(self.x_axis.ticks.len())
            .y_labels(self.y_axis.ticks.len())
            .x_label_formatter(&|v: &f64| format!("{v:.1}"))
            .y_label_formatter(&|v: &f64| format!("{v:.1}"))
            .bold_line_style(style.grid_color.to_plotters().mix(style.grid_alpha))
            .light_line_style(TRANSPARENT)
            .draw()
            .map_err(render_err)?;

        for layer in self.layers() {
            match layer {
                Layer::SigmaBand {
                    polygon,
                    color,
                    alpha,
                    ..
                } => {
                    let fill = color.to_plotters().mix(*alpha).filled();
                    chart
                        .draw_series(std::iter::once(Polygon::new(polygon.clone(), fill)))
                        .map_err(render_err)?;
                }
                Layer::DirectDraw {
                    points,
                    color,
                    alpha,
                } => {
                    chart
                        .draw_series(LineSeries::new(
                            points.iter().copied(),
                            color.to_plotters().mix(*alpha),
                        ))
                        .map_err(render_err)?;
                }
                Layer::Diagonal {
                    points,
                    color,
                    alpha,
                } => {
                    let stroke = color.to_plotters().mix(*alpha).stroke_width(2);
                    chart
                        .draw_series(
                            dash_segments(points, DASH_LENGTH, DASH_GAP)
                                .into_iter()
                                .map(|dash| PathElement::new(dash, stroke)),
                        )
                        .map_err(render_err)?;
                }
                Layer::EmpiricalCdf {
                    points,
                    color,
                    width,
                } => {
                    chart
                        .draw_series(LineSeries::new(
                            points.iter().copied(),
                            color.to_plotters().stroke_width(*width),
                        ))
                        .map_err(render_err)?;
                }
            }
        }

        Ok(())
    }

    /// Render into an in-memory SVG document.
    pub fn to_svg(&self, width: u32, height: u32) -> Result<String, PlotError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(render_err)?;
        }
        Ok(svg)
    }
}

/// Split a polyline into dashes of `dash` length separated by `gap`, in data units.
fn dash_segments(points: &[(f64, f64)], dash: f64, gap: f64) -> Vec<Vec<(f64, f64)>> {
    let mut dashes = Vec::new();
    if dash <= 0.0 {
        return dashes;
    }

    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let length = (x1 - x0).hypot(y1 - y0);
        if length == 0.0 {
            continue;
        }
        let at = |t: f64| (x0 + (x1 - x0) * t / length, y0 + (y1 - y0) * t / length);

        let mut start = 0.0;
        while start < length {
            let end = (start + dash).min(length);
            dashes.push(vec![at(start), at(end)]);
            start = end + gap.max(0.0);
        }
    }
    dashes
}
