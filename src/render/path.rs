//! Path construction and flattening.
//!
//! Paths are stored in device space: the [`Context`](super::Context) applies its
//! current transform when a segment is added, the same way an immediate-mode
//! 2D API records geometry.

use crate::geometry::Point;

/// Pixels of control-polygon length per flattened Bezier step.
const FLATTEN_STEP: f32 = 4.0;

/// Upper bound on line segments emitted per Bezier curve.
const MAX_CURVE_STEPS: usize = 64;

/// One element of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    /// Begin a new subpath.
    MoveTo(Point),
    /// Straight line from the current point.
    LineTo(Point),
    /// Cubic Bezier from the current point through two control points.
    CurveTo(Point, Point, Point),
    /// Close the current subpath back to its start.
    Close,
}

/// A flattened subpath.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    /// Vertices in drawing order.
    pub points: Vec<Point>,
    /// True when the subpath was explicitly closed.
    pub closed: bool,
}

/// An ordered list of path segments in device coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// Create an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All segments in insertion order.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True when the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment.
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// Append every segment of `other`.
    pub fn extend(&mut self, other: &Path) {
        self.segments.extend_from_slice(&other.segments);
    }

    /// Remove every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Flatten curves into polylines, one per subpath.
    ///
    /// Subpaths with fewer than two vertices are dropped.
    #[must_use]
    pub fn flatten(&self) -> Vec<Polyline> {
        let mut out = Vec::new();
        let mut current = Polyline::default();
        let mut start = None;

        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) => {
                    push_polyline(&mut out, std::mem::take(&mut current));
                    current.points.push(p);
                    start = Some(p);
                }
                PathSegment::LineTo(p) => {
                    if current.points.is_empty() {
                        start = Some(p);
                    }
                    current.points.push(p);
                }
                PathSegment::CurveTo(c1, c2, end) => {
                    let Some(&from) = current.points.last() else {
                        current.points.push(c1);
                        start = Some(c1);
                        continue;
                    };
                    flatten_cubic(from, c1, c2, end, &mut current.points);
                }
                PathSegment::Close => {
                    current.closed = true;
                    let restart = current.points.last().copied().and(start);
                    push_polyline(&mut out, std::mem::take(&mut current));
                    // A segment after close continues from the subpath start.
                    if let Some(p) = restart {
                        current.points.push(p);
                    }
                }
            }
        }
        push_polyline(&mut out, current);
        out
    }
}

fn push_polyline(out: &mut Vec<Polyline>, polyline: Polyline) {
    if polyline.points.len() >= 2 {
        out.push(polyline);
    }
}

/// Evaluate a cubic Bezier at `t` using de Casteljau subdivision.
#[must_use]
pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let a = p0.lerp(p1, t);
    let b = p1.lerp(p2, t);
    let c = p2.lerp(p3, t);
    let d = a.lerp(b, t);
    let e = b.lerp(c, t);
    d.lerp(e, t)
}

fn flatten_cubic(p0: Point, p1: Point, p2: Point, p3: Point, out: &mut Vec<Point>) {
    let hull = p0.distance(p1) + p1.distance(p2) + p2.distance(p3);
    let steps = ((hull / FLATTEN_STEP).ceil() as usize).clamp(1, MAX_CURVE_STEPS);
    for i in 1..=steps {
        out.push(cubic_point(p0, p1, p2, p3, i as f32 / steps as f32));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_lines() {
        let mut path = Path::new();
        path.push(PathSegment::MoveTo(Point::new(0.0, 0.0)));
        path.push(PathSegment::LineTo(Point::new(10.0, 0.0)));
        path.push(PathSegment::LineTo(Point::new(10.0, 10.0)));

        let lines = path.flatten();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].points.len(), 3);
        assert!(!lines[0].closed);
    }

    #[test]
    fn test_flatten_curve_ends_on_endpoint() {
        let mut path = Path::new();
        path.push(PathSegment::MoveTo(Point::new(0.0, 0.0)));
        path.push(PathSegment::CurveTo(
            Point::new(10.0, 0.0),
            Point::new(10.0, 20.0),
            Point::new(20.0, 20.0),
        ));

        let lines = path.flatten();
        let last = *lines[0].points.last().unwrap();
        assert!((last.x - 20.0).abs() < 1e-4);
        assert!((last.y - 20.0).abs() < 1e-4);
        assert!(lines[0].points.len() > 2);
    }

    #[test]
    fn test_close_marks_subpath_and_splits() {
        let mut path = Path::new();
        path.push(PathSegment::MoveTo(Point::new(0.0, 0.0)));
        path.push(PathSegment::LineTo(Point::new(5.0, 0.0)));
        path.push(PathSegment::LineTo(Point::new(5.0, 5.0)));
        path.push(PathSegment::Close);
        path.push(PathSegment::MoveTo(Point::new(20.0, 20.0)));
        path.push(PathSegment::LineTo(Point::new(30.0, 20.0)));

        let lines = path.flatten();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].closed);
        assert!(!lines[1].closed);
    }

    #[test]
    fn test_single_point_subpath_dropped() {
        let mut path = Path::new();
        path.push(PathSegment::MoveTo(Point::new(1.0, 1.0)));
        assert!(path.flatten().is_empty());
    }

    #[test]
    fn test_cubic_midpoint_symmetric() {
        let p = cubic_point(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            0.5,
        );
        assert!((p.x - 5.0).abs() < 1e-4);
        assert!((p.y - 7.5).abs() < 1e-4);
    }
}
