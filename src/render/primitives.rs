//! Primitive rasterization functions.
//!
//! Anti-aliased hairlines and non-zero winding polygon fill. Thick strokes,
//! round joins and glyph cells are all expressed as polygons and go through
//! [`fill_polygon`] in a single pass, so overlapping pieces of one stroke never
//! blend twice.

use crate::color::Rgba;
use crate::framebuffer::Framebuffer;
use crate::geometry::Point;
use std::f32::consts::TAU;

// ============================================================================
// Line Drawing
// ============================================================================

/// Draw an anti-aliased line using Wu's algorithm.
///
/// This implements Xiaolin Wu's line algorithm from SIGGRAPH '91,
/// which produces smooth lines with sub-pixel accuracy.
///
/// # Algorithm
///
/// Wu's algorithm draws two pixels at each step along the major axis,
/// adjusting their intensities based on the fractional distance from
/// the ideal line position.
///
/// # References
///
/// Wu, X. (1991). "An Efficient Antialiasing Technique." SIGGRAPH '91.
pub fn draw_line_aa(fb: &mut Framebuffer, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
    let steep = (y1 - y0).abs() > (x1 - x0).abs();

    let (x0, y0, x1, y1) = if steep { (y0, x0, y1, x1) } else { (x0, y0, x1, y1) };

    let (x0, y0, x1, y1) = if x0 > x1 { (x1, y1, x0, y0) } else { (x0, y0, x1, y1) };

    let dx = x1 - x0;
    let dy = y1 - y0;
    let gradient = if dx.abs() < f32::EPSILON { 1.0 } else { dy / dx };

    // First endpoint
    let xend = x0.round();
    let yend = y0 + gradient * (xend - x0);
    let xgap = rfpart(x0 + 0.5);
    let xpxl1 = xend as i32;
    let ypxl1 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl1, xpxl1, color, rfpart(yend) * xgap);
        plot(fb, ypxl1 + 1, xpxl1, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl1, ypxl1, color, rfpart(yend) * xgap);
        plot(fb, xpxl1, ypxl1 + 1, color, fpart(yend) * xgap);
    }

    let mut intery = yend + gradient;

    // Second endpoint
    let xend = x1.round();
    let yend = y1 + gradient * (xend - x1);
    let xgap = fpart(x1 + 0.5);
    let xpxl2 = xend as i32;
    let ypxl2 = yend.floor() as i32;

    if steep {
        plot(fb, ypxl2, xpxl2, color, rfpart(yend) * xgap);
        plot(fb, ypxl2 + 1, xpxl2, color, fpart(yend) * xgap);
    } else {
        plot(fb, xpxl2, ypxl2, color, rfpart(yend) * xgap);
        plot(fb, xpxl2, ypxl2 + 1, color, fpart(yend) * xgap);
    }

    if steep {
        for x in (xpxl1 + 1)..xpxl2 {
            let ipart = intery.floor() as i32;
            plot(fb, ipart, x, color, rfpart(intery));
            plot(fb, ipart + 1, x, color, fpart(intery));
            intery += gradient;
        }
    } else {
        for x in (xpxl1 + 1)..xpxl2 {
            let ipart = intery.floor() as i32;
            plot(fb, x, ipart, color, rfpart(intery));
            plot(fb, x, ipart + 1, color, fpart(intery));
            intery += gradient;
        }
    }
}

/// Plot a pixel with intensity (for anti-aliased drawing).
#[inline]
fn plot(fb: &mut Framebuffer, x: i32, y: i32, color: Rgba, intensity: f32) {
    if x >= 0 && y >= 0 && x < fb.width() as i32 && y < fb.height() as i32 {
        let alpha = (f32::from(color.a) * intensity) as u8;
        fb.blend_pixel(x as u32, y as u32, color.with_alpha(alpha));
    }
}

/// Fractional part of a float.
#[inline]
fn fpart(x: f32) -> f32 {
    x - x.floor()
}

/// Reverse fractional part.
#[inline]
fn rfpart(x: f32) -> f32 {
    1.0 - fpart(x)
}

// ============================================================================
// Polygon Fill
// ============================================================================

/// A non-horizontal polygon edge with `y0 < y1`.
#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    winding: i32,
}

impl Edge {
    fn new(a: Point, b: Point) -> Option<Self> {
        if (a.y - b.y).abs() < f32::EPSILON {
            return None;
        }
        Some(if a.y < b.y {
            Self { x0: a.x, y0: a.y, x1: b.x, y1: b.y, winding: 1 }
        } else {
            Self { x0: b.x, y0: b.y, x1: a.x, y1: a.y, winding: -1 }
        })
    }

    fn x_at(&self, y: f32) -> f32 {
        self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0)
    }
}

/// Fill the union of `contours` with the non-zero winding rule.
///
/// Each contour is implicitly closed. Pixels are sampled at their centers.
pub fn fill_polygon(fb: &mut Framebuffer, contours: &[Vec<Point>], color: Rgba) {
    let edges: Vec<Edge> = contours
        .iter()
        .filter(|c| c.len() >= 3)
        .flat_map(|c| (0..c.len()).filter_map(move |i| Edge::new(c[i], c[(i + 1) % c.len()])))
        .collect();
    if edges.is_empty() || color.a == 0 {
        return;
    }

    let (min_y, max_y) = edges
        .iter()
        .fold((f32::MAX, f32::MIN), |(lo, hi), e| (lo.min(e.y0), hi.max(e.y1)));
    let first = ((min_y - 0.5).ceil() as i32).max(0);
    let last = ((max_y - 0.5).floor() as i32).min(fb.height() as i32 - 1);

    let mut crossings: Vec<(f32, i32)> = Vec::with_capacity(edges.len());
    for y in first..=last {
        let sample = y as f32 + 0.5;
        crossings.clear();
        crossings.extend(
            edges
                .iter()
                .filter(|e| sample >= e.y0 && sample < e.y1)
                .map(|e| (e.x_at(sample), e.winding)),
        );
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        let mut span_start = 0.0;
        for &(x, w) in &crossings {
            let was_inside = winding != 0;
            winding += w;
            if !was_inside && winding != 0 {
                span_start = x;
            } else if was_inside && winding == 0 {
                let x0 = (span_start - 0.5).ceil() as i32;
                let x1 = (x - 0.5).ceil() as i32;
                fb.blend_span(x0, x1, y, color);
            }
        }
    }
}

/// Polygon approximating a circle, counter-clockwise in screen space.
#[must_use]
pub fn disc_contour(center: Point, radius: f32) -> Vec<Point> {
    let sides = ((radius * TAU / 2.0).ceil() as usize).clamp(8, 48);
    (0..sides)
        .map(|i| {
            let a = TAU * i as f32 / sides as f32;
            Point::new(center.x + radius * a.cos(), center.y + radius * a.sin())
        })
        .collect()
}

/// Rectangle covering the segment `a -> b` widened by `half_width` on both
/// sides, with the same orientation as [`disc_contour`].
#[must_use]
pub fn segment_contour(a: Point, b: Point, half_width: f32) -> Vec<Point> {
    let len = a.distance(b);
    if len < f32::EPSILON {
        return Vec::new();
    }
    let nx = -(b.y - a.y) / len * half_width;
    let ny = (b.x - a.x) / len * half_width;
    vec![
        Point::new(a.x - nx, a.y - ny),
        Point::new(b.x - nx, b.y - ny),
        Point::new(b.x + nx, b.y + ny),
        Point::new(a.x + nx, a.y + ny),
    ]
}

/// Fill a disc of `radius` around `(cx, cy)`.
pub fn fill_disc(fb: &mut Framebuffer, cx: f32, cy: f32, radius: f32, color: Rgba) {
    fill_polygon(fb, &[disc_contour(Point::new(cx, cy), radius)], color);
}

// ============================================================================
// Tests
// ============================================================================
