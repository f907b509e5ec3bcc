//! Series renderers.
//!
//! A renderer paints one value column of a [`TimeSeriesTable`] into a target
//! rectangle of a [`Canvas`], mapping the table's time window onto the x axis
//! and the value window onto the (inverted) y axis. Consecutive samples are
//! joined by cubic Beziers whose control points sit half a sample spacing to
//! the right of the previous point, which gives a smooth monotone-looking curve
//! without overshoot in y.

use crate::clock::Clock;
use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::model::TimeSeriesTable;
use crate::render::Canvas;
use crate::scale::LinearScale;
use std::fmt;

/// Time and value window a renderer paints against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderWindow {
    /// Left edge timestamp (microseconds).
    pub begin_time: i64,
    /// Right edge timestamp (microseconds).
    pub end_time: i64,
    /// Value mapped to the bottom edge.
    pub y_begin: f64,
    /// Value mapped to the top edge.
    pub y_end: f64,
}

impl RenderWindow {
    /// Create a window.
    #[must_use]
    pub const fn new(begin_time: i64, end_time: i64, y_begin: f64, y_end: f64) -> Self {
        Self {
            begin_time,
            end_time,
            y_begin,
            y_end,
        }
    }

    /// Window ending at the table's newest sample (or the clock when empty),
    /// spanning its timespan, with the value bounds truncated to integers.
    #[must_use]
    pub fn for_table(table: &TimeSeriesTable, clock: &dyn Clock) -> Self {
        let end_time = table.end_time(clock);
        Self {
            begin_time: end_time.saturating_sub(table.timespan()),
            end_time,
            y_begin: table.value_min().trunc(),
            y_end: table.value_max().trunc(),
        }
    }
}

/// Paints one series against a time/value window.
pub trait Renderer: fmt::Debug {
    /// Paint into `area` of `canvas`.
    ///
    /// Tables with fewer than two rows produce no canvas calls at all.
    ///
    /// # Errors
    ///
    /// Returns an error when the configured column does not exist.
    fn render(
        &self,
        table: &TimeSeriesTable,
        window: &RenderWindow,
        canvas: &mut dyn Canvas,
        area: Rect,
    ) -> Result<()>;
}

// ============================================================================
// Curve fitting
// ============================================================================

/// Sample positions in device space plus the Bezier control offset.
struct Curve {
    points: Vec<Point>,
    chunk: f32,
}

impl Curve {
    /// Project every row of `column`. `None` when there is nothing to draw.
    fn fit(
        table: &TimeSeriesTable,
        column: usize,
        window: &RenderWindow,
        area: Rect,
    ) -> Result<Option<Self>> {
        // Validate the column before anything else so a bad index is always
        // reported, even for an empty table.
        table.column(column)?;
        if table.len() < 2 || area.is_empty() {
            return Ok(None);
        }

        let x_scale = LinearScale::new(
            (window.begin_time as f64, window.end_time as f64),
            (f64::from(area.x), f64::from(area.right())),
        );
        let y_scale = LinearScale::new(
            (window.y_begin, window.y_end),
            (f64::from(area.bottom()), f64::from(area.y)),
        );
        let (Ok(x_scale), Ok(y_scale)) = (x_scale, y_scale) else {
            log::trace!("degenerate render window {window:?}, skipping");
            return Ok(None);
        };

        let mut points = Vec::with_capacity(table.len());
        let mut cursor = table.first_cursor();
        while cursor.advance() {
            points.push(Point::new(
                x_scale.scale_f32(cursor.timestamp()? as f64),
                y_scale.scale_f32(cursor.read(column)?),
            ));
        }

        let chunk = match table.capacity() {
            0 | 1 => 0.0,
            capacity => area.width / (capacity - 1) as f32 / 2.0,
        };
        Ok(Some(Self { points, chunk }))
    }

    /// Extend the current path with a curve from `from` through `rest`.
    fn trace(&self, canvas: &mut dyn Canvas, from: Point, rest: &[Point]) {
        let mut last = from;
        for &p in rest {
            canvas.curve_to(last.x + self.chunk, last.y, last.x + self.chunk, p.y, p.x, p.y);
            last = p;
        }
    }
}

// ============================================================================
// Line renderer
// ============================================================================

/// Smoothed line through every sample of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRenderer {
    column: usize,
    line_width: f32,
    color: Option<Rgba>,
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl LineRenderer {
    /// Default stroke width.
    pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

    /// Line renderer for `column`, stroked with the canvas' current source.
    #[must_use]
    pub fn new(column: usize) -> Self {
        Self {
            column,
            line_width: Self::DEFAULT_LINE_WIDTH,
            color: None,
        }
    }

    /// Set the stroke width.
    #[must_use]
    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set an explicit stroke color.
    #[must_use]
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    /// Column this renderer paints.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }
}

impl Renderer for LineRenderer {
    fn render(
        &self,
        table: &TimeSeriesTable,
        window: &RenderWindow,
        canvas: &mut dyn Canvas,
        area: Rect,
    ) -> Result<()> {
        let Some(curve) = Curve::fit(table, self.column, window, area)? else {
            return Ok(());
        };
        let Some((&first, rest)) = curve.points.split_first() else {
            return Ok(());
        };

        canvas.save();
        canvas.new_path();
        canvas.move_to(first.x, first.y);
        curve.trace(canvas, first, rest);
        canvas.set_line_width(self.line_width);
        if let Some(color) = self.color {
            canvas.set_source(color);
        }
        canvas.stroke();
        canvas.restore();
        Ok(())
    }
}

// ============================================================================
// Stacked renderer
// ============================================================================

/// Filled area under a smoothed curve of one column.
///
/// The area starts on the bottom edge under the first sample and rises to the
/// following samples, so the oldest sample only anchors the left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedRenderer {
    column: usize,
    line_width: f32,
    stroke_color: Rgba,
    fill_color: Rgba,
}

impl Default for StackedRenderer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl StackedRenderer {
    /// Default outline width.
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;

    /// Stacked renderer for `column` in neutral gray.
    #[must_use]
    pub fn new(column: usize) -> Self {
        Self {
            column,
            line_width: Self::DEFAULT_LINE_WIDTH,
            stroke_color: Rgba::GRAY,
            fill_color: Rgba::GRAY.with_alpha_f32(0.5),
        }
    }

    /// Set the outline width.
    #[must_use]
    pub fn line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Set the outline color.
    #[must_use]
    pub fn stroke_color(mut self, color: Rgba) -> Self {
        self.stroke_color = color;
        self
    }

    /// Set the area color.
    #[must_use]
    pub fn fill_color(mut self, color: Rgba) -> Self {
        self.fill_color = color;
        self
    }

    /// Column this renderer paints.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }
}

impl Renderer for StackedRenderer {
    fn render(
        &self,
        table: &TimeSeriesTable,
        window: &RenderWindow,
        canvas: &mut dyn Canvas,
        area: Rect,
    ) -> Result<()> {
        let Some(curve) = Curve::fit(table, self.column, window, area)? else {
            return Ok(());
        };
        let Some((first, rest)) = curve.points.split_first() else {
            return Ok(());
        };
        let bottom = area.bottom();
        let start = Point::new(first.x, bottom);

        canvas.save();
        canvas.new_path();
        canvas.move_to(start.x, start.y);
        curve.trace(canvas, start, rest);
        let outline = canvas.copy_path();

        // Area: down to the bottom edge, back along it, filled.
        let last_x = rest.last().map_or(start.x, |p| p.x);
        canvas.set_line_width(self.line_width);
        canvas.set_source(self.fill_color);
        canvas.line_to(last_x, bottom);
        canvas.stroke_preserve();
        canvas.close_path();
        canvas.fill();

        canvas.append_path(&outline);
        canvas.set_source(self.stroke_color);
        canvas.stroke();
        canvas.restore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Error;
    use crate::render::{PathSegment, RecordingCanvas};

    fn table(rows: &[(i64, f64)], capacity: usize) -> TimeSeriesTable {
        let mut table = TimeSeriesTable::new(&["v"], capacity).unwrap();
        for &(t, v) in rows {
            table.append(t, &[v]).unwrap();
        }
        table
    }

    fn window() -> RenderWindow {
        RenderWindow::new(0, 100, 0.0, 100.0)
    }

    #[test]
    fn test_window_for_table() {
        let clock = ManualClock::new(5_000);
        let t = table(&[], 4).with_bounds(0.7, 99.9).unwrap().with_timespan(1_000).unwrap();
        let w = RenderWindow::for_table(&t, &clock);
        assert_eq!(w, RenderWindow::new(4_000, 5_000, 0.0, 99.0));
    }

    #[test]
    fn test_window_for_table_saturates_at_time_origin() {
        let clock = ManualClock::new(i64::MIN + 10);
        let t = table(&[], 4).with_timespan(1_000).unwrap();
        let w = RenderWindow::for_table(&t, &clock);
        assert_eq!(w.begin_time, i64::MIN);
        assert_eq!(w.end_time, i64::MIN + 10);
    }

    #[test]
    fn test_too_few_rows_draw_nothing() {
        for rows in [&[][..], &[(50, 10.0)][..]] {
            let t = table(rows, 4);
            let mut canvas = RecordingCanvas::new(100, 100);
            LineRenderer::new(0)
                .render(&t, &window(), &mut canvas, Rect::from_size(100, 100))
                .unwrap();
            StackedRenderer::new(0)
                .render(&t, &window(), &mut canvas, Rect::from_size(100, 100))
                .unwrap();
            assert!(canvas.ops().is_empty());
            assert_eq!(canvas.path_op_count(), 0);
        }
    }

    #[test]
    fn test_bad_column_is_reported() {
        let t = table(&[(0, 1.0), (10, 2.0)], 4);
        let mut canvas = RecordingCanvas::new(100, 100);
        let err = LineRenderer::new(3)
            .render(&t, &window(), &mut canvas, Rect::from_size(100, 100))
            .unwrap_err();
        assert!(matches!(err, Error::ColumnOutOfRange { index: 3, .. }));
    }

    #[test]
    fn test_line_curve_geometry() {
        // capacity 3 over a 100 px wide area: chunk = 100 / 2 / 2 = 25
        let t = table(&[(0, 0.0), (50, 50.0), (100, 100.0)], 3);
        let mut canvas = RecordingCanvas::new(100, 100);
        LineRenderer::new(0)
            .color(Rgba::RED)
            .render(&t, &window(), &mut canvas, Rect::from_size(100, 100))
            .unwrap();

        let (path, style) = canvas.strokes().next().unwrap();
        assert_eq!(style.color, Rgba::RED);
        assert!((style.width - 2.0).abs() < f32::EPSILON);
        assert_eq!(path.segments()[0], PathSegment::MoveTo(Point::new(0.0, 100.0)));
        assert_eq!(
            path.segments()[1],
            PathSegment::CurveTo(
                Point::new(25.0, 100.0),
                Point::new(25.0, 50.0),
                Point::new(50.0, 50.0)
            )
        );
        assert_eq!(canvas.curve_count(), 2);
    }

    #[test]
    fn test_line_restores_canvas_state() {
        let t = table(&[(0, 0.0), (100, 100.0)], 2);
        let mut canvas = RecordingCanvas::new(100, 100);
        canvas.set_source(Rgba::BLUE);
        LineRenderer::new(0)
            .color(Rgba::RED)
            .line_width(4.0)
            .render(&t, &window(), &mut canvas, Rect::from_size(100, 100))
            .unwrap();
        assert_eq!(canvas.context().state().source, Rgba::BLUE);
        assert!(canvas.context().path().is_empty());
    }

    #[test]
    fn test_area_offset() {
        let t = table(&[(0, 0.0), (100, 100.0)], 2);
        let mut canvas = RecordingCanvas::new(200, 200);
        LineRenderer::new(0)
            .render(&t, &window(), &mut canvas, Rect::new(10.0, 20.0, 100.0, 50.0))
            .unwrap();
        let (path, _) = canvas.strokes().next().unwrap();
        assert_eq!(path.segments()[0], PathSegment::MoveTo(Point::new(10.0, 70.0)));
    }

    #[test]
    fn test_stacked_fill_then_outline() {
        let t = table(&[(0, 20.0), (50, 50.0), (100, 80.0)], 3);
        let mut canvas = RecordingCanvas::new(100, 100);
        StackedRenderer::new(0)
            .fill_color(Rgba::GREEN.with_alpha(128))
            .stroke_color(Rgba::GREEN)
            .line_width(1.5)
            .render(&t, &window(), &mut canvas, Rect::from_size(100, 100))
            .unwrap();

        let strokes: Vec<_> = canvas.strokes().collect();
        let fills: Vec<_> = canvas.fills().collect();
        assert_eq!(strokes.len(), 2);
        assert_eq!(fills.len(), 1);

        // Area starts on the bottom edge under the first sample and is closed.
        let (area, fill_color) = fills[0];
        assert_eq!(fill_color, Rgba::GREEN.with_alpha(128));
        assert_eq!(area.segments()[0], PathSegment::MoveTo(Point::new(0.0, 100.0)));
        assert_eq!(area.segments().last(), Some(&PathSegment::Close));
        assert!(area
            .segments()
            .contains(&PathSegment::LineTo(Point::new(100.0, 100.0))));

        // Outline is the curve alone, in its own color.
        let (outline, style) = strokes[1];
        assert_eq!(style.color, Rgba::GREEN);
        assert_eq!(outline.len(), 3);
        assert!((style.width - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_stacked_defaults() {
        let r = StackedRenderer::default();
        assert_eq!(r.stroke_color, Rgba::GRAY);
        assert_eq!(r.fill_color.a, 128);
        assert!((r.line_width - 1.0).abs() < f32::EPSILON);
        assert_eq!(r.column(), 0);
    }

    #[test]
    fn test_degenerate_value_window_draws_nothing() {
        let t = table(&[(0, 0.2), (100, 0.4)], 2);
        let mut canvas = RecordingCanvas::new(100, 100);
        LineRenderer::new(0)
            .render(&t, &RenderWindow::new(0, 100, 0.0, 0.0), &mut canvas, Rect::from_size(100, 100))
            .unwrap();
        assert!(canvas.ops().is_empty());
    }
}
