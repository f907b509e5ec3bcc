//! The drawing-surface capability renderers paint into.
//!
//! [`Canvas`] is an immediate-mode 2D API in the style of Cairo: build a path
//! with `move_to`/`line_to`/`curve_to`, then `stroke` or `fill` it with the
//! current source color. Graphics state (transform, color, line width, dash,
//! font size) is saved and restored as a stack.
//!
//! Backends only implement the four raster hooks (`stroke_path`, `fill_path`,
//! `draw_text`, `clear`) plus access to their [`Context`]; everything else is
//! provided.

use super::font::{self, TextExtents};
use super::path::{Path, PathSegment};
use crate::color::Rgba;
use crate::geometry::{Affine, Point};
use std::f32::consts::{FRAC_PI_2, TAU};

/// Default stroke width, matching common immediate-mode APIs.
pub const DEFAULT_LINE_WIDTH: f32 = 2.0;

/// Default font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Saved/restored graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    /// User-to-device transform.
    pub transform: Affine,
    /// Current source color.
    pub source: Rgba,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// Dash pattern (on/off lengths); empty means solid.
    pub dash: Vec<f32>,
    /// Font size in pixels.
    pub font_size: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            source: Rgba::BLACK,
            line_width: DEFAULT_LINE_WIDTH,
            dash: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Stroke parameters handed to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: Rgba,
    /// Width in pixels.
    pub width: f32,
    /// Dash pattern; empty means solid.
    pub dash: Vec<f32>,
}

/// Text parameters handed to a backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Fill color.
    pub color: Rgba,
    /// Font size in pixels.
    pub font_size: f32,
    /// Baseline rotation in radians (device space).
    pub rotation: f32,
}

/// Path and state bookkeeping shared by every backend.
#[derive(Debug, Clone, Default)]
pub struct Context {
    state: DrawState,
    saved: Vec<DrawState>,
    path: Path,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl Context {
    /// Fresh context with default state and an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current graphics state.
    #[must_use]
    pub fn state(&self) -> &DrawState {
        &self.state
    }

    /// Current path in device space.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current point in device space, if any.
    #[must_use]
    pub fn current_point(&self) -> Option<Point> {
        self.current
    }

    /// Stroke parameters from the current state.
    #[must_use]
    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle {
            color: self.state.source,
            width: self.state.line_width,
            dash: self.state.dash.clone(),
        }
    }

    /// Text parameters from the current state.
    #[must_use]
    pub fn text_style(&self) -> TextStyle {
        TextStyle {
            color: self.state.source,
            font_size: self.state.font_size,
            rotation: self.state.transform.rotation(),
        }
    }

    /// Push a copy of the graphics state.
    pub fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    /// Pop the graphics state. Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    /// Translate user space.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.translated(dx, dy);
    }

    /// Rotate user space by `radians`.
    pub fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform.rotated(radians);
    }

    /// Set the source color.
    pub fn set_source(&mut self, color: Rgba) {
        self.state.source = color;
    }

    /// Set the stroke width. Negative widths clamp to zero.
    pub fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width.max(0.0);
    }

    /// Set the dash pattern; empty disables dashing.
    pub fn set_dash(&mut self, pattern: &[f32]) {
        self.state.dash = pattern.to_vec();
    }

    /// Set the font size.
    pub fn set_font_size(&mut self, size: f32) {
        self.state.font_size = size.max(0.0);
    }

    fn device(&self, x: f32, y: f32) -> Point {
        self.state.transform.apply(Point::new(x, y))
    }

    /// Begin a new subpath at `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let p = self.device(x, y);
        self.path.push(PathSegment::MoveTo(p));
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    /// Line to `(x, y)`; behaves as `move_to` without a current point.
    pub fn line_to(&mut self, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }
        let p = self.device(x, y);
        self.path.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    /// Line relative to the current point. Ignored without a current point.
    pub fn rel_line_to(&mut self, dx: f32, dy: f32) {
        let Some(from) = self.current else {
            return;
        };
        let d = self.state.transform.apply_vector(dx, dy);
        let p = Point::new(from.x + d.x, from.y + d.y);
        self.path.push(PathSegment::LineTo(p));
        self.current = Some(p);
    }

    /// Cubic Bezier to `(x3, y3)` with control points `(x1, y1)`, `(x2, y2)`.
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        if self.current.is_none() {
            self.move_to(x1, y1);
        }
        let c1 = self.device(x1, y1);
        let c2 = self.device(x2, y2);
        let end = self.device(x3, y3);
        self.path.push(PathSegment::CurveTo(c1, c2, end));
        self.current = Some(end);
    }

    /// Close the current subpath.
    pub fn close_path(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.path.push(PathSegment::Close);
        self.current = self.subpath_start;
    }

    /// Closed axis-aligned rectangle subpath.
    pub fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Circular arc around `(xc, yc)` from `angle1` to `angle2` (radians,
    /// increasing angle). Connects from the current point with a line if one
    /// exists.
    pub fn arc(&mut self, xc: f32, yc: f32, radius: f32, angle1: f32, mut angle2: f32) {
        while angle2 < angle1 {
            angle2 += TAU;
        }
        let on_arc = |a: f32| (xc + radius * a.cos(), yc + radius * a.sin());

        let (sx, sy) = on_arc(angle1);
        if self.current.is_some() {
            self.line_to(sx, sy);
        } else {
            self.move_to(sx, sy);
        }

        let sweep = angle2 - angle1;
        let segments = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
        let step = sweep / segments as f32;
        // Control distance for a cubic approximating a circular arc of `step`.
        let k = 4.0 / 3.0 * (step / 4.0).tan() * radius;

        for i in 0..segments {
            let a0 = angle1 + step * i as f32;
            let a1 = a0 + step;
            let (x0, y0) = on_arc(a0);
            let (x3, y3) = on_arc(a1);
            self.curve_to(
                x0 - k * a0.sin(),
                y0 + k * a0.cos(),
                x3 + k * a1.sin(),
                y3 - k * a1.cos(),
                x3,
                y3,
            );
        }
    }

    /// Snapshot of the current path.
    #[must_use]
    pub fn copy_path(&self) -> Path {
        self.path.clone()
    }

    /// Append a previously copied path; it is not re-transformed.
    pub fn append_path(&mut self, path: &Path) {
        for segment in path.segments() {
            match *segment {
                PathSegment::MoveTo(p) => {
                    self.current = Some(p);
                    self.subpath_start = Some(p);
                }
                PathSegment::LineTo(p) | PathSegment::CurveTo(_, _, p) => {
                    self.current = Some(p);
                }
                PathSegment::Close => self.current = self.subpath_start,
            }
        }
        self.path.extend(path);
    }

    /// Drop the current path and current point.
    pub fn new_path(&mut self) {
        self.path.clear();
        self.current = None;
        self.subpath_start = None;
    }

    /// Advance the current point along the text baseline.
    fn advance(&mut self, distance: f32) {
        if let Some(p) = self.current {
            let d = self.state.transform.apply_vector(distance, 0.0);
            self.current = Some(Point::new(p.x + d.x, p.y + d.y));
        }
    }
}

/// Immediate-mode 2D drawing capability.
///
/// `render` code is written against `&mut dyn Canvas`, so the same renderer
/// paints into a [`RasterCanvas`](super::RasterCanvas), an
/// [`SvgCanvas`](crate::output::SvgCanvas) or a
/// [`RecordingCanvas`](super::RecordingCanvas).
pub trait Canvas {
    /// Shared state and path.
    fn context(&self) -> &Context;

    /// Mutable shared state and path.
    fn context_mut(&mut self) -> &mut Context;

    /// Surface size in device pixels.
    fn size(&self) -> (u32, u32);

    /// Paint the outline of `path`.
    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle);

    /// Paint the interior of `path` (non-zero winding).
    fn fill_path(&mut self, path: &Path, color: Rgba);

    /// Paint `text` with its baseline starting at `origin` (device space).
    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle);

    /// Reset every pixel to fully transparent.
    fn clear(&mut self);

    /// See [`Context::save`].
    fn save(&mut self) {
        self.context_mut().save();
    }

    /// See [`Context::restore`].
    fn restore(&mut self) {
        self.context_mut().restore();
    }

    /// See [`Context::translate`].
    fn translate(&mut self, dx: f32, dy: f32) {
        self.context_mut().translate(dx, dy);
    }

    /// See [`Context::rotate`].
    fn rotate(&mut self, radians: f32) {
        self.context_mut().rotate(radians);
    }

    /// See [`Context::set_source`].
    fn set_source(&mut self, color: Rgba) {
        self.context_mut().set_source(color);
    }

    /// See [`Context::set_line_width`].
    fn set_line_width(&mut self, width: f32) {
        self.context_mut().set_line_width(width);
    }

    /// See [`Context::set_dash`].
    fn set_dash(&mut self, pattern: &[f32]) {
        self.context_mut().set_dash(pattern);
    }

    /// See [`Context::set_font_size`].
    fn set_font_size(&mut self, size: f32) {
        self.context_mut().set_font_size(size);
    }

    /// See [`Context::move_to`].
    fn move_to(&mut self, x: f32, y: f32) {
        self.context_mut().move_to(x, y);
    }

    /// See [`Context::line_to`].
    fn line_to(&mut self, x: f32, y: f32) {
        self.context_mut().line_to(x, y);
    }

    /// See [`Context::rel_line_to`].
    fn rel_line_to(&mut self, dx: f32, dy: f32) {
        self.context_mut().rel_line_to(dx, dy);
    }

    /// See [`Context::curve_to`].
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.context_mut().curve_to(x1, y1, x2, y2, x3, y3);
    }

    /// See [`Context::close_path`].
    fn close_path(&mut self) {
        self.context_mut().close_path();
    }

    /// See [`Context::rectangle`].
    fn rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.context_mut().rectangle(x, y, width, height);
    }

    /// See [`Context::arc`].
    fn arc(&mut self, xc: f32, yc: f32, radius: f32, angle1: f32, angle2: f32) {
        self.context_mut().arc(xc, yc, radius, angle1, angle2);
    }

    /// See [`Context::copy_path`].
    fn copy_path(&self) -> Path {
        self.context().copy_path()
    }

    /// See [`Context::append_path`].
    fn append_path(&mut self, path: &Path) {
        self.context_mut().append_path(path);
    }

    /// See [`Context::new_path`].
    fn new_path(&mut self) {
        self.context_mut().new_path();
    }

    /// Stroke the current path and keep it.
    fn stroke_preserve(&mut self) {
        let path = self.context().copy_path();
        let style = self.context().stroke_style();
        self.stroke_path(&path, &style);
    }

    /// Stroke the current path and clear it.
    fn stroke(&mut self) {
        self.stroke_preserve();
        self.new_path();
    }

    /// Fill the current path and keep it.
    fn fill_preserve(&mut self) {
        let path = self.context().copy_path();
        let color = self.context().state().source;
        self.fill_path(&path, color);
    }

    /// Fill the current path and clear it.
    fn fill(&mut self) {
        self.fill_preserve();
        self.new_path();
    }

    /// Measure `text` with the current font size.
    fn text_extents(&self, text: &str) -> TextExtents {
        font::measure(text, self.context().state().font_size)
    }

    /// Show `text` at the current point and advance past it.
    fn show_text(&mut self, text: &str) {
        let origin = self.context().current_point().unwrap_or(Point::ORIGIN);
        let style = self.context().text_style();
        self.draw_text(origin, text, &style);
        let advance = self.text_extents(text).x_advance;
        self.context_mut().advance(advance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_restore_state() {
        let mut ctx = Context::new();
        ctx.set_line_width(5.0);
        ctx.save();
        ctx.set_line_width(1.0);
        ctx.set_source(Rgba::RED);
        ctx.restore();
        assert!((ctx.state().line_width - 5.0).abs() < f32::EPSILON);
        assert_eq!(ctx.state().source, Rgba::BLACK);

        // unbalanced restore is harmless
        ctx.restore();
        assert!((ctx.state().line_width - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_line_to_without_current_point_moves() {
        let mut ctx = Context::new();
        ctx.line_to(3.0, 4.0);
        assert_eq!(
            ctx.path().segments(),
            &[PathSegment::MoveTo(Point::new(3.0, 4.0))]
        );
    }

    #[test]
    fn test_rel_line_to() {
        let mut ctx = Context::new();
        ctx.rel_line_to(1.0, 1.0);
        assert!(ctx.path().is_empty());

        ctx.move_to(10.0, 10.0);
        ctx.rel_line_to(0.0, 5.0);
        assert_eq!(ctx.current_point(), Some(Point::new(10.0, 15.0)));
    }

    #[test]
    fn test_transform_applies_at_path_time() {
        let mut ctx = Context::new();
        ctx.translate(100.0, 0.0);
        ctx.move_to(1.0, 2.0);
        ctx.translate(-100.0, 0.0);
        assert_eq!(
            ctx.path().segments()[0],
            PathSegment::MoveTo(Point::new(101.0, 2.0))
        );
    }

    #[test]
    fn test_close_path_returns_to_start() {
        let mut ctx = Context::new();
        ctx.move_to(0.0, 0.0);
        ctx.line_to(10.0, 0.0);
        ctx.close_path();
        assert_eq!(ctx.current_point(), Some(Point::ORIGIN));
    }

    #[test]
    fn test_full_circle_arc_closes_on_start() {
        let mut ctx = Context::new();
        ctx.arc(50.0, 50.0, 5.0, 0.0, TAU);
        let segs = ctx.path().segments();
        assert_eq!(segs.len(), 5); // move + 4 quarter curves
        let end = ctx.current_point().unwrap();
        assert!((end.x - 55.0).abs() < 1e-3);
        assert!((end.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_append_path_updates_current_point() {
        let mut a = Context::new();
        a.move_to(0.0, 0.0);
        a.line_to(7.0, 8.0);
        let copy = a.copy_path();

        let mut b = Context::new();
        b.append_path(&copy);
        assert_eq!(b.current_point(), Some(Point::new(7.0, 8.0)));
        assert_eq!(b.path(), &copy);
    }
}
