//! Plotters-powered trend chart widget for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// The widget is intentionally data-driven: all series and bounds are computed
/// outside the render call. When the y axis is logarithmic the caller passes
/// log10-transformed values together with a `fmt_y` that maps them back to
/// case counts, so `render()` itself stays scale-agnostic.
pub struct TrendChart<'a> {
    /// Line series for the projected cumulative curve.
    pub projection: &'a [(f64, f64)],
    /// Line series for the observed cumulative counts (overlaid on the
    /// projection where the two overlap).
    pub observed: &'a [(f64, f64)],
    /// Scatter series for the annotated marker days.
    pub markers: &'a [(f64, f64)],
    /// X bounds (days since the first confirmed case).
    pub x_bounds: [f64; 2],
    /// Y bounds (cases, or log10 cases on a log axis).
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: String,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for TrendChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        // `plotters-ratatui-backend` draws Plotters primitives via Ratatui's
        // `Canvas` widget, which ultimately writes to the terminal buffer.
        //
        // We delegate rendering to the crate-provided widget helper to avoid
        // coupling our code to its internal backend types.
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels.
            //
            // We disable the mesh lines to reduce visual clutter in low-resolution
            // terminal rendering; the axes + labels carry enough information for
            // an epidemic-curve screen.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(&self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // Series styling: keep the palette high-contrast for terminal
            // readability. Red for the extrapolated trend matches the original
            // chart convention; observed counts stay white.
            let projection_color = RGBColor(255, 0, 0); // red
            let observed_color = WHITE;
            let marker_color = RGBColor(255, 255, 0); // yellow

            // 1) Projected trend line, drawn first so observed data wins where
            //    they overlap.
            chart.draw_series(LineSeries::new(
                self.projection.iter().copied(),
                &projection_color,
            ))?;

            // 2) Observed cumulative counts.
            chart.draw_series(LineSeries::new(
                self.observed.iter().copied(),
                &observed_color,
            ))?;

            // 3) Marker-day highlights.
            //
            // We intentionally avoid `Circle` markers here. The underlying
            // `plotters-ratatui-backend` currently maps circle radii incorrectly
            // (pixel radius -> normalized canvas units), producing huge circles.
            //
            // A colored `Pixel` gives a clean "dot" highlight that looks good in
            // terminals and reliably overrides the projection/observed lines.
            chart.draw_series(
                self.markers
                    .iter()
                    .map(|&(x, y)| Pixel::new((x, y), marker_color)),
            )?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
