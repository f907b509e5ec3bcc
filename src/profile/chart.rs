//! Static fan-profile chart: duty (%) against temperature (°C).

use super::curve::{ProfileCurve, ProfileLimits};
use crate::color::Rgba;
use crate::error::Result;
use crate::framebuffer::Framebuffer;
use crate::output::{PngEncoder, SvgCanvas};
use crate::render::{Canvas, RasterCanvas};
use crate::scale::LinearScale;
use batuta_common::display::WithDimensions;
use std::f32::consts::{FRAC_PI_2, TAU};
use std::path::Path;

/// Default chart width.
pub const DEFAULT_WIDTH: u32 = 400;

/// Default chart height.
pub const DEFAULT_HEIGHT: u32 = 300;

/// Default plot color.
pub const PLOT_COLOR: Rgba = Rgba::new(0x76, 0xb9, 0x00, 255);

/// Grid lines (and labels) per axis, not counting the origin.
const GRID_DIVISIONS: u16 = 5;

const MARGIN_LEFT: f32 = 60.0;
const MARGIN_BOTTOM: f32 = 40.0;
const MARGIN_TOP: f32 = 20.0;
const MARGIN_RIGHT: f32 = 20.0;

const GRID_LINE_WIDTH: f32 = 0.5;
const GRID_ALPHA: f32 = 0.5;
const GRID_DASH: [f32; 2] = [1.0, 1.0];
const AXIS_LINE_WIDTH: f32 = 2.0;
const TICK_FONT_SIZE: f32 = 10.0;
const AXIS_FONT_SIZE: f32 = 12.0;
const PLOT_LINE_WIDTH: f32 = 3.0;
const MARKER_RADIUS: f32 = 5.0;
const HYSTERESIS_LINE_WIDTH: f32 = 1.0;
const HYSTERESIS_DASH: [f32; 2] = [5.0, 5.0];

/// Plot rectangle derived from the chart size.
#[derive(Debug, Clone, Copy)]
struct Layout {
    width: f32,
    height: f32,
    chart_width: f32,
    bottom: f32,
    inner_bottom: f32,
    inner_height: f32,
}

impl Layout {
    fn new(width: u32, height: u32) -> Option<Self> {
        let (width, height) = (width as f32, height as f32);
        let chart_width = width - MARGIN_LEFT - MARGIN_RIGHT;
        let chart_height = height - MARGIN_BOTTOM - MARGIN_TOP;
        if chart_width <= 0.0 || chart_height <= 0.0 {
            return None;
        }
        let padding = chart_height / 30.0;
        let bottom = height - MARGIN_BOTTOM;
        Some(Self {
            width,
            height,
            chart_width,
            bottom,
            inner_bottom: bottom - padding,
            inner_height: chart_height - 2.0 * padding,
        })
    }

    fn right(&self) -> f32 {
        self.width - MARGIN_RIGHT
    }
}

/// Fan profile chart with an optional hysteresis overlay.
///
/// Unlike the strip charts this is redrawn from scratch on every
/// [`render`](Self::render); there is no cache.
#[derive(Debug, Clone)]
pub struct ProfileChart {
    width: u32,
    height: u32,
    limits: ProfileLimits,
    curve: ProfileCurve,
    hysteresis: i32,
    plot_color: Rgba,
    foreground: Rgba,
    background: Rgba,
}

impl Default for ProfileChart {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl ProfileChart {
    /// Empty chart of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            limits: ProfileLimits::default(),
            curve: ProfileCurve::new(),
            hysteresis: 0,
            plot_color: PLOT_COLOR,
            foreground: Rgba::BLACK,
            background: Rgba::WHITE,
        }
    }

    /// Use different axis limits.
    #[must_use]
    pub fn with_limits(mut self, limits: ProfileLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the curve color.
    #[must_use]
    pub fn with_plot_color(mut self, color: Rgba) -> Self {
        self.plot_color = color;
        self
    }

    /// Set the grid, axis and label color.
    #[must_use]
    pub fn with_foreground(mut self, color: Rgba) -> Self {
        self.foreground = color;
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn with_background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Replace the plotted curve and hysteresis (°C).
    pub fn set_data(&mut self, curve: &ProfileCurve, hysteresis: i32) {
        self.curve = curve.clone();
        self.hysteresis = hysteresis;
    }

    /// Chart size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Paint the whole chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleDomain`](crate::Error::ScaleDomain) when the
    /// limits describe an empty temperature or duty range.
    pub fn render(&self, canvas: &mut dyn Canvas) -> Result<()> {
        canvas.new_path();
        canvas.set_source(self.background);
        canvas.rectangle(0.0, 0.0, self.width as f32, self.height as f32);
        canvas.fill();

        let Some(layout) = Layout::new(self.width, self.height) else {
            return Ok(());
        };

        self.draw_grid(canvas, &layout);
        self.draw_axes(canvas, &layout);
        self.draw_data(canvas, &layout)
    }

    // ========================================================================
    // Chart furniture
    // ========================================================================

    fn draw_grid(&self, canvas: &mut dyn Canvas, layout: &Layout) {
        let divisions = f32::from(GRID_DIVISIONS);
        let temp_step = (self.limits.max_temp - self.limits.min_temp) / i32::from(GRID_DIVISIONS);
        let duty_step = (self.limits.max_duty - self.limits.min_duty) / i32::from(GRID_DIVISIONS);

        canvas.save();
        canvas.set_source(self.foreground.with_alpha_f32(GRID_ALPHA));
        canvas.set_line_width(GRID_LINE_WIDTH);
        canvas.set_font_size(TICK_FONT_SIZE);

        let h_segment = layout.chart_width / divisions;
        for i in 0..=GRID_DIVISIONS {
            // The leftmost line doubles as the y axis and stays solid.
            let dash: &[f32] = if i == 0 { &[] } else { &GRID_DASH };
            canvas.set_dash(dash);
            let x = MARGIN_LEFT + f32::from(i) * h_segment;
            canvas.move_to(x, MARGIN_TOP);
            canvas.line_to(x, layout.bottom);
            canvas.stroke();

            let label = format!("{}°C", self.limits.min_temp + i32::from(i) * temp_step);
            let ext = canvas.text_extents(&label);
            label_at(canvas, x - ext.width / 2.0, layout.bottom + 15.0, &label);
        }

        canvas.set_dash(&[]);
        canvas.move_to(MARGIN_LEFT, layout.bottom);
        canvas.line_to(layout.right(), layout.bottom);
        canvas.stroke();

        let v_segment = layout.inner_height / divisions;
        canvas.set_dash(&GRID_DASH);
        for i in 0..=GRID_DIVISIONS {
            let y = layout.inner_bottom - f32::from(i) * v_segment;
            canvas.move_to(MARGIN_LEFT, y);
            canvas.line_to(layout.right(), y);
            canvas.stroke();

            let label = format!("{}%", self.limits.min_duty + i32::from(i) * duty_step);
            let ext = canvas.text_extents(&label);
            label_at(canvas, MARGIN_LEFT - ext.width - 5.0, y + ext.height / 2.0, &label);
        }

        canvas.restore();
    }

    fn draw_axes(&self, canvas: &mut dyn Canvas, layout: &Layout) {
        canvas.save();
        canvas.set_source(self.foreground);
        canvas.set_dash(&[]);
        canvas.set_line_width(AXIS_LINE_WIDTH);

        canvas.move_to(MARGIN_LEFT, layout.bottom);
        canvas.line_to(layout.right(), layout.bottom);
        canvas.stroke();

        canvas.move_to(MARGIN_LEFT, MARGIN_TOP);
        canvas.line_to(MARGIN_LEFT, layout.bottom);
        canvas.stroke();

        canvas.set_font_size(AXIS_FONT_SIZE);
        let ext = canvas.text_extents("Temperature");
        label_at(
            canvas,
            layout.width / 2.0 - ext.width / 2.0,
            layout.height - 5.0,
            "Temperature",
        );

        let ext = canvas.text_extents("Duty");
        canvas.save();
        canvas.translate(15.0, layout.height / 2.0);
        canvas.rotate(-FRAC_PI_2);
        label_at(canvas, -ext.width / 2.0, 0.0, "Duty");
        canvas.restore();

        canvas.restore();
    }

    // ========================================================================
    // Data
    // ========================================================================

    fn draw_data(&self, canvas: &mut dyn Canvas, layout: &Layout) -> Result<()> {
        if self.curve.len() < 2 {
            return Ok(());
        }

        let x = LinearScale::new(
            (f64::from(self.limits.min_temp), f64::from(self.limits.max_temp)),
            (f64::from(MARGIN_LEFT), f64::from(MARGIN_LEFT + layout.chart_width)),
        )?;
        let y = LinearScale::new(
            (f64::from(self.limits.min_duty), f64::from(self.limits.max_duty)),
            (
                f64::from(layout.inner_bottom),
                f64::from(layout.inner_bottom - layout.inner_height),
            ),
        )?;
        let project = |&(t, d): &(i32, i32)| (x.scale_f32(f64::from(t)), y.scale_f32(f64::from(d)));
        let plotted: Vec<(f32, f32)> = self.curve.points().iter().map(project).collect();

        canvas.save();
        canvas.set_source(self.plot_color);
        canvas.set_dash(&[]);
        canvas.set_line_width(PLOT_LINE_WIDTH);
        polyline(canvas, &plotted);
        canvas.stroke();

        for &(px, py) in &plotted {
            canvas.arc(px, py, MARKER_RADIUS, 0.0, TAU);
            canvas.fill();
        }

        if self.hysteresis > 0 {
            let shifted: Vec<(f32, f32)> = self
                .curve
                .hysteresis_points(self.hysteresis)
                .iter()
                .map(project)
                .collect();
            if shifted.len() >= 2 {
                canvas.set_line_width(HYSTERESIS_LINE_WIDTH);
                canvas.set_dash(&HYSTERESIS_DASH);
                polyline(canvas, &shifted);
                canvas.stroke();
                canvas.set_dash(&[]);
            }
        }

        canvas.restore();
        Ok(())
    }

    // ========================================================================
    // Export
    // ========================================================================

    /// Render into a new framebuffer of the chart size.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero-sized chart or invalid limits.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width, self.height)?;
        let mut canvas = RasterCanvas::new(&mut fb);
        self.render(&mut canvas)?;
        Ok(fb)
    }

    /// Render as an SVG document.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid limits.
    pub fn to_svg(&self) -> Result<String> {
        let mut canvas = SvgCanvas::new(self.width, self.height);
        self.render(&mut canvas)?;
        Ok(canvas.finish().render())
    }

    /// Render and write as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error when rendering, encoding or writing fails.
    pub fn write_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        PngEncoder::write_to_file(&self.to_framebuffer()?, path)
    }
}

impl WithDimensions for ProfileChart {
    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

fn label_at(canvas: &mut dyn Canvas, x: f32, y: f32, text: &str) {
    canvas.move_to(x, y);
    canvas.show_text(text);
    canvas.new_path();
}

fn polyline(canvas: &mut dyn Canvas, points: &[(f32, f32)]) {
    let mut iter = points.iter();
    if let Some(&(x, y)) = iter.next() {
        canvas.move_to(x, y);
    }
    for &(x, y) in iter {
        canvas.line_to(x, y);
    }
}
