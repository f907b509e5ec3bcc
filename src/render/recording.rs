//! A [`Canvas`] that records backend calls instead of painting.
//!
//! Used by tests to assert what a renderer asked for (colors, widths, dash
//! patterns, label text) without inspecting pixels.

use super::canvas::{Canvas, Context, StrokeStyle, TextStyle};
use super::path::{Path, PathSegment};
use crate::color::Rgba;
use crate::geometry::Point;

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    /// `stroke_path` with the path and style in effect.
    Stroke {
        /// Stroked path.
        path: Path,
        /// Stroke parameters.
        style: StrokeStyle,
    },
    /// `fill_path` with the path and color in effect.
    Fill {
        /// Filled path.
        path: Path,
        /// Fill color.
        color: Rgba,
    },
    /// `draw_text`.
    Text {
        /// Baseline origin in device space.
        origin: Point,
        /// Label text.
        text: String,
        /// Text parameters.
        style: TextStyle,
    },
    /// `clear`.
    Clear,
}

/// Canvas that records every paint operation.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    width: u32,
    height: u32,
    ctx: Context,
    ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    /// Create a recorder reporting the given surface size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ctx: Context::new(),
            ops: Vec::new(),
        }
    }

    /// Recorded operations in call order.
    #[must_use]
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Recorded strokes.
    pub fn strokes(&self) -> impl Iterator<Item = (&Path, &StrokeStyle)> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Stroke { path, style } => Some((path, style)),
            _ => None,
        })
    }

    /// Recorded fills.
    pub fn fills(&self) -> impl Iterator<Item = (&Path, Rgba)> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Fill { path, color } => Some((path, *color)),
            _ => None,
        })
    }

    /// Recorded label strings.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            CanvasOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Total number of path segments across every stroke and fill.
    #[must_use]
    pub fn path_op_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                CanvasOp::Stroke { path, .. } | CanvasOp::Fill { path, .. } => path.len(),
                _ => 0,
            })
            .sum()
    }

    /// Number of curve segments across every stroke and fill.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.ops
            .iter()
            .map(|op| match op {
                CanvasOp::Stroke { path, .. } | CanvasOp::Fill { path, .. } => path
                    .segments()
                    .iter()
                    .filter(|s| matches!(s, PathSegment::CurveTo(..)))
                    .count(),
                _ => 0,
            })
            .sum()
    }

    /// Forget every recorded operation.
    pub fn reset(&mut self) {
        self.ops.clear();
    }
}

impl Canvas for RecordingCanvas {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        self.ops.push(CanvasOp::Stroke {
            path: path.clone(),
            style: style.clone(),
        });
    }

    fn fill_path(&mut self, path: &Path, color: Rgba) {
        self.ops.push(CanvasOp::Fill {
            path: path.clone(),
            color,
        });
    }

    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        self.ops.push(CanvasOp::Text {
            origin,
            text: text.to_string(),
            style: *style,
        });
    }

    fn clear(&mut self) {
        self.ops.push(CanvasOp::Clear);
    }
}
