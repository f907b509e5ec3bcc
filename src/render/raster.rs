//! [`Canvas`] backend that rasterizes into a [`Framebuffer`].

use super::canvas::{Canvas, Context, StrokeStyle, TextStyle};
use super::font;
use super::path::Path;
use super::primitives::{disc_contour, draw_line_aa, fill_polygon, segment_contour};
use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::{Affine, Point};

/// Strokes at or below this width are drawn as anti-aliased hairlines.
const HAIRLINE_WIDTH: f32 = 1.0;

/// Canvas drawing into a borrowed framebuffer.
#[derive(Debug)]
pub struct RasterCanvas<'a> {
    fb: &'a mut Framebuffer,
    ctx: Context,
}

impl<'a> RasterCanvas<'a> {
    /// Wrap a framebuffer with a fresh drawing context.
    pub fn new(fb: &'a mut Framebuffer) -> Self {
        Self {
            fb,
            ctx: Context::new(),
        }
    }

    /// The target framebuffer.
    #[must_use]
    pub fn framebuffer(&self) -> &Framebuffer {
        &*self.fb
    }
}

impl Canvas for RasterCanvas<'_> {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    fn size(&self) -> (u32, u32) {
        (self.fb.width(), self.fb.height())
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        if style.width <= 0.0 || style.color.a == 0 {
            return;
        }

        let mut runs = Vec::new();
        for polyline in path.flatten() {
            let mut points = polyline.points;
            if polyline.closed {
                if let Some(&first) = points.first() {
                    points.push(first);
                }
            }
            if style.dash.is_empty() {
                runs.push(points);
            } else {
                runs.extend(dash_polyline(&points, &style.dash));
            }
        }

        if style.width <= HAIRLINE_WIDTH {
            let color = style.color.with_alpha_f32(style.color.alpha_f32() * style.width);
            for run in &runs {
                for pair in run.windows(2) {
                    draw_line_aa(self.fb, pair[0].x, pair[0].y, pair[1].x, pair[1].y, color);
                }
            }
            return;
        }

        let half = style.width / 2.0;
        let mut contours = Vec::new();
        for run in &runs {
            for pair in run.windows(2) {
                let quad = segment_contour(pair[0], pair[1], half);
                if !quad.is_empty() {
                    contours.push(quad);
                }
            }
            // Round joins between consecutive segments.
            if run.len() > 2 {
                for &joint in &run[1..run.len() - 1] {
                    contours.push(disc_contour(joint, half));
                }
            }
        }
        fill_polygon(self.fb, &contours, style.color);
    }

    fn fill_path(&mut self, path: &Path, color: Rgba) {
        let contours: Vec<Vec<Point>> = path.flatten().into_iter().map(|p| p.points).collect();
        fill_polygon(self.fb, &contours, color);
    }

    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        let cell = font::cell_size(style.font_size);
        if cell <= 0.0 || style.color.a == 0 {
            return;
        }
        let transform = Affine::IDENTITY
            .translated(origin.x, origin.y)
            .rotated(style.rotation);

        let mut contours = Vec::new();
        for (index, c) in text.chars().enumerate() {
            let left = font::char_offset_cells(index);
            for (col, row) in font::lit_cells(c) {
                let x = (left + col as f32) * cell;
                // Row 0 is the cap line; the last row sits on the baseline.
                let y = (row as f32 - font::GLYPH_ROWS as f32) * cell;
                contours.push(
                    [(x, y), (x + cell, y), (x + cell, y + cell), (x, y + cell)]
                        .iter()
                        .map(|&(px, py)| transform.apply(Point::new(px, py)))
                        .collect(),
                );
            }
        }
        fill_polygon(self.fb, &contours, style.color);
    }

    fn clear(&mut self) {
        self.fb.clear(Rgba::TRANSPARENT);
    }
}

/// Split a polyline into the "on" runs of a dash pattern.
///
/// The pattern restarts at the beginning of every polyline.
fn dash_polyline(points: &[Point], pattern: &[f32]) -> Vec<Vec<Point>> {
    if pattern.iter().all(|&d| d <= 0.0) {
        return vec![points.to_vec()];
    }

    let mut runs = Vec::new();
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut on = true;
    let mut current: Vec<Point> = points.first().map(|&p| vec![p]).unwrap_or_default();

    for pair in points.windows(2) {
        let (mut from, to) = (pair[0], pair[1]);
        let mut seg_len = from.distance(to);
        while seg_len > 0.0 {
            if remaining > seg_len {
                remaining -= seg_len;
                if on {
                    current.push(to);
                }
                break;
            }
            let split = from.lerp(to, remaining / seg_len);
            seg_len -= remaining;
            from = split;
            if on {
                current.push(split);
                if current.len() >= 2 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            } else {
                current = vec![split];
            }
            on = !on;
            index = (index + 1) % pattern.len();
            remaining = pattern[index].max(0.0);
        }
    }
    if on && current.len() >= 2 {
        runs.push(current);
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_horizontal_line() {
        let mut fb = Framebuffer::new(50, 20).unwrap();
        let mut canvas = RasterCanvas::new(&mut fb);
        canvas.set_source(Rgba::RED);
        canvas.set_line_width(3.0);
        canvas.move_to(5.0, 10.0);
        canvas.line_to(45.0, 10.0);
        canvas.stroke();

        assert!(canvas.context().path().is_empty());
        assert_eq!(fb.get_pixel(25, 10), Some(Rgba::RED));
        assert_eq!(fb.get_pixel(25, 2), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_hairline_stroke() {
        let mut fb = Framebuffer::new(20, 20).unwrap();
        let mut canvas = RasterCanvas::new(&mut fb);
        canvas.set_line_width(1.0);
        canvas.move_to(0.0, 10.0);
        canvas.line_to(19.0, 10.0);
        canvas.stroke();
        assert!(fb.covered_pixels() >= 19);
    }

    #[test]
    fn test_fill_rectangle_path() {
        let mut fb = Framebuffer::new(20, 20).unwrap();
        let mut canvas = RasterCanvas::new(&mut fb);
        canvas.set_source(Rgba::BLUE);
        canvas.move_to(0.0, 0.0);
        canvas.line_to(10.0, 0.0);
        canvas.line_to(10.0, 10.0);
        canvas.line_to(0.0, 10.0);
        canvas.close_path();
        canvas.fill();
        assert_eq!(fb.covered_pixels(), 100);
    }

    #[test]
    fn test_dash_splits_runs() {
        let line = [Point::new(0.0, 0.0), Point::new(20.0, 0.0)];
        let runs = dash_polyline(&line, &[5.0, 5.0]);
        assert_eq!(runs.len(), 2);
        assert!((runs[0][1].x - 5.0).abs() < 1e-4);
        assert!((runs[1][0].x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_dash_across_vertices() {
        let bend = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 10.0),
        ];
        let runs = dash_polyline(&bend, &[5.0, 100.0]);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].len(), 3);
        assert!((runs[0][2].y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_dashed_stroke_leaves_gaps() {
        let mut fb = Framebuffer::new(40, 10).unwrap();
        let mut canvas = RasterCanvas::new(&mut fb);
        canvas.set_line_width(2.0);
        canvas.set_dash(&[5.0, 5.0]);
        canvas.move_to(0.0, 5.0);
        canvas.line_to(40.0, 5.0);
        canvas.stroke();
        assert!(fb.get_pixel(2, 5).is_some_and(|p| p.a > 0));
        assert_eq!(fb.get_pixel(7, 5).map(|p| p.a), Some(0));
    }

    #[test]
    fn test_show_text_paints_and_advances() {
        let mut fb = Framebuffer::new(60, 20).unwrap();
        let mut canvas = RasterCanvas::new(&mut fb);
        canvas.set_font_size(12.0);
        canvas.move_to(2.0, 15.0);
        canvas.show_text("80%");
        let after = canvas.context().current_point().unwrap();
        assert!((after.x - (2.0 + font::measure("80%", 12.0).x_advance)).abs() < 1e-3);
        assert!(fb.covered_pixels() > 0);
    }

    #[test]
    fn test_clear_resets_pixels() {
        let mut fb = Framebuffer::new(5, 5).unwrap();
        fb.clear(Rgba::WHITE);
        let mut canvas = RasterCanvas::new(&mut fb);
        canvas.clear();
        assert_eq!(fb.covered_pixels(), 0);
    }
}
