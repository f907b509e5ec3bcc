//! SVG output.
//!
//! [`SvgCanvas`] is a [`Canvas`] backend that turns every stroke, fill and
//! label into an [`SvgElement`], so any renderer can produce scalable output.

use crate::color::Rgba;
use crate::error::Result;
use crate::geometry::Point;
use crate::render::{Canvas, Context, Path, PathSegment, StrokeStyle, TextStyle};
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;

/// SVG document builder.
#[derive(Debug, Clone)]
pub struct SvgEncoder {
    width: u32,
    height: u32,
    background: Option<Rgba>,
    elements: Vec<SvgElement>,
}

/// An SVG element.
#[derive(Debug, Clone, PartialEq)]
pub enum SvgElement {
    /// `<path>` with optional fill and stroke.
    Path {
        /// Path data (`d` attribute).
        d: String,
        /// Fill color, `None` for no fill.
        fill: Option<Rgba>,
        /// Stroke color, `None` for no stroke.
        stroke: Option<Rgba>,
        /// Stroke width.
        stroke_width: f32,
        /// Dash pattern; empty for solid.
        dash: Vec<f32>,
    },
    /// `<text>` anchored at its baseline start.
    Text {
        /// Baseline x.
        x: f32,
        /// Baseline y.
        y: f32,
        /// Label text (escaped on output).
        text: String,
        /// Font size in pixels.
        font_size: f32,
        /// Fill color.
        fill: Rgba,
        /// Rotation about the anchor, in degrees.
        rotation: f32,
    },
}

impl SvgEncoder {
    /// Create an empty document with a white background.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: Some(Rgba::WHITE),
            elements: Vec::new(),
        }
    }

    /// Set background color (None for transparent).
    #[must_use]
    pub fn background(mut self, color: Option<Rgba>) -> Self {
        self.background = color;
        self
    }

    /// Append an element.
    pub fn add_element(&mut self, element: SvgElement) {
        self.elements.push(element);
    }

    /// Elements in paint order.
    #[must_use]
    pub fn elements(&self) -> &[SvgElement] {
        &self.elements
    }

    /// Render to an SVG string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );

        if let Some(bg) = self.background {
            let _ = writeln!(
                svg,
                r#"  <rect width="100%" height="100%" fill="{}"/>"#,
                rgba_to_css(bg)
            );
        }

        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Write to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    pub fn write_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(self.render().as_bytes())?;
        Ok(())
    }
}

/// Convert RGBA to CSS color string.
fn rgba_to_css(color: Rgba) -> String {
    if color.a == 255 {
        format!("rgb({},{},{})", color.r, color.g, color.b)
    } else {
        format!(
            "rgba({},{},{},{:.3})",
            color.r,
            color.g,
            color.b,
            color.alpha_f32()
        )
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// SVG path data for a device-space path.
#[must_use]
pub fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for segment in path.segments() {
        if !d.is_empty() {
            d.push(' ');
        }
        let _ = match segment {
            PathSegment::MoveTo(p) => write!(d, "M {} {}", p.x, p.y),
            PathSegment::LineTo(p) => write!(d, "L {} {}", p.x, p.y),
            PathSegment::CurveTo(c1, c2, p) => {
                write!(d, "C {} {} {} {} {} {}", c1.x, c1.y, c2.x, c2.y, p.x, p.y)
            }
            PathSegment::Close => write!(d, "Z"),
        };
    }
    d
}

fn element_to_svg(element: &SvgElement) -> String {
    match element {
        SvgElement::Path {
            d,
            fill,
            stroke,
            stroke_width,
            dash,
        } => {
            let fill_attr = fill.map_or_else(|| "none".to_string(), rgba_to_css);
            let mut stroke_attr = stroke
                .map(|s| {
                    format!(
                        r#" stroke="{}" stroke-width="{stroke_width}" stroke-linejoin="round""#,
                        rgba_to_css(s)
                    )
                })
                .unwrap_or_default();
            if stroke.is_some() && !dash.is_empty() {
                let pattern: Vec<String> = dash.iter().map(ToString::to_string).collect();
                let _ = write!(stroke_attr, r#" stroke-dasharray="{}""#, pattern.join(","));
            }
            format!(r#"<path d="{d}" fill="{fill_attr}"{stroke_attr}/>"#)
        }
        SvgElement::Text {
            x,
            y,
            text,
            font_size,
            fill,
            rotation,
        } => {
            let transform = if rotation.abs() > f32::EPSILON {
                format!(r#" transform="rotate({rotation} {x} {y})""#)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{x}" y="{y}" font-size="{font_size}" fill="{}" font-family="sans-serif"{transform}>{}</text>"#,
                rgba_to_css(*fill),
                escape(text)
            )
        }
    }
}

// ============================================================================
// Canvas backend
// ============================================================================

/// [`Canvas`] that collects SVG elements.
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    ctx: Context,
    encoder: SvgEncoder,
}

impl SvgCanvas {
    /// Canvas over a transparent document of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ctx: Context::new(),
            encoder: SvgEncoder::new(width, height).background(None),
        }
    }

    /// Document built so far.
    #[must_use]
    pub fn encoder(&self) -> &SvgEncoder {
        &self.encoder
    }

    /// Finish drawing and take the document.
    #[must_use]
    pub fn finish(self) -> SvgEncoder {
        self.encoder
    }
}

impl Canvas for SvgCanvas {
    fn context(&self) -> &Context {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    fn size(&self) -> (u32, u32) {
        (self.encoder.width, self.encoder.height)
    }

    fn stroke_path(&mut self, path: &Path, style: &StrokeStyle) {
        if path.is_empty() || style.color.a == 0 {
            return;
        }
        self.encoder.add_element(SvgElement::Path {
            d: path_data(path),
            fill: None,
            stroke: Some(style.color),
            stroke_width: style.width,
            dash: style.dash.clone(),
        });
    }

    fn fill_path(&mut self, path: &Path, color: Rgba) {
        if path.is_empty() || color.a == 0 {
            return;
        }
        self.encoder.add_element(SvgElement::Path {
            d: path_data(path),
            fill: Some(color),
            stroke: None,
            stroke_width: 0.0,
            dash: Vec::new(),
        });
    }

    fn draw_text(&mut self, origin: Point, text: &str, style: &TextStyle) {
        self.encoder.add_element(SvgElement::Text {
            x: origin.x,
            y: origin.y,
            text: text.to_string(),
            font_size: style.font_size,
            fill: style.color,
            rotation: style.rotation.to_degrees(),
        });
    }

    fn clear(&mut self) {
        self.encoder.elements.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_encoder_new() {
        let svg = SvgEncoder::new(800, 600).render();
        assert!(svg.contains("width=\"800\""));
        assert!(svg.contains("height=\"600\""));
        assert!(svg.contains("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 1);
    }

    #[test]
    fn test_svg_transparent_background() {
        let svg = SvgEncoder::new(100, 100).background(None).render();
        assert_eq!(svg.matches("<rect").count(), 0);
    }

    #[test]
    fn test_rgba_alpha() {
        let css = rgba_to_css(Rgba::new(255, 0, 0, 128));
        assert_eq!(css, "rgba(255,0,0,0.502)");
        assert_eq!(rgba_to_css(Rgba::RED), "rgb(255,0,0)");
    }

    #[test]
    fn test_path_data() {
        let mut ctx = Context::new();
        ctx.move_to(1.0, 2.0);
        ctx.line_to(3.0, 4.0);
        ctx.curve_to(5.0, 6.0, 7.0, 8.0, 9.0, 10.0);
        ctx.close_path();
        assert_eq!(path_data(ctx.path()), "M 1 2 L 3 4 C 5 6 7 8 9 10 Z");
    }

    #[test]
    fn test_canvas_stroke_with_dash() {
        let mut canvas = SvgCanvas::new(50, 50);
        canvas.set_source(Rgba::BLUE);
        canvas.set_line_width(1.5);
        canvas.set_dash(&[5.0, 5.0]);
        canvas.move_to(0.0, 0.0);
        canvas.line_to(50.0, 50.0);
        canvas.stroke();

        let svg = canvas.finish().render();
        assert!(svg.contains(r#"d="M 0 0 L 50 50""#));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"stroke="rgb(0,0,255)""#));
        assert!(svg.contains(r#"stroke-width="1.5""#));
        assert!(svg.contains(r#"stroke-dasharray="5,5""#));
    }

    #[test]
    fn test_canvas_fill_skips_transparent() {
        let mut canvas = SvgCanvas::new(10, 10);
        canvas.set_source(Rgba::TRANSPARENT);
        canvas.rectangle(0.0, 0.0, 10.0, 10.0);
        canvas.fill();
        assert!(canvas.encoder().elements().is_empty());

        canvas.set_source(Rgba::GREEN);
        canvas.rectangle(0.0, 0.0, 10.0, 10.0);
        canvas.fill();
        assert_eq!(canvas.encoder().elements().len(), 1);
    }

    #[test]
    fn test_rotated_text_is_escaped() {
        let mut canvas = SvgCanvas::new(100, 100);
        canvas.translate(15.0, 50.0);
        canvas.rotate(-std::f32::consts::FRAC_PI_2);
        canvas.move_to(0.0, 0.0);
        canvas.show_text("A & <B>");

        let svg = canvas.finish().render();
        assert!(svg.contains("A &amp; &lt;B&gt;"));
        assert!(svg.contains("transform=\"rotate(-"));
        assert!(svg.contains(r#"x="15" y="50""#));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        SvgEncoder::new(10, 10).write_to_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("<svg"));
    }
}
