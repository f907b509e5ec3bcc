//! Geometric primitives for chart rendering.
//!
//! Points and rectangles in device pixels, plus the 2D affine transform used by
//! [`Canvas`](crate::render::Canvas) implementations to map user space onto a
//! surface.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Origin point (0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate the distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation between two points.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// A rectangle defined by position and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin, as handed out by a widget allocation.
    #[must_use]
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f32, height as f32)
    }

    /// X coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the rectangle covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Check if a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// 2D affine transform `[a c e; b d f]`, mapping `(x, y)` to
/// `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// Prepend a translation (applied before the current transform).
    #[must_use]
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            e: self.a * dx + self.c * dy + self.e,
            f: self.b * dx + self.d * dy + self.f,
            ..self
        }
    }

    /// Prepend a rotation by `radians` (applied before the current transform).
    #[must_use]
    pub fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: self.a * cos + self.c * sin,
            b: self.b * cos + self.d * sin,
            c: self.c * cos - self.a * sin,
            d: self.d * cos - self.b * sin,
            ..self
        }
    }

    /// Rotation angle of the transform in radians.
    #[must_use]
    pub fn rotation(&self) -> f32 {
        self.b.atan2(self.a)
    }

    /// Map a point from user space to device space.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    /// Map a distance vector (ignores translation).
    #[must_use]
    pub fn apply_vector(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.a * dx + self.c * dy, self.b * dx + self.d * dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance(p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_point_lerp() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(10.0, 10.0);
        let mid = p1.lerp(p2, 0.5);
        assert!((mid.x - 5.0).abs() < 0.001);
        assert!((mid.y - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!((rect.right() - 40.0).abs() < 0.001);
        assert!((rect.bottom() - 60.0).abs() < 0.001);
        assert!(rect.contains(Point::new(15.0, 25.0)));
        assert!(!rect.contains(Point::new(45.0, 25.0)));
        assert!(Rect::new(0.0, 0.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn test_affine_translate_then_rotate() {
        // translate(15, 50) then rotate(-90deg): user x axis points up
        let t = Affine::IDENTITY
            .translated(15.0, 50.0)
            .rotated(-std::f32::consts::FRAC_PI_2);
        let p = t.apply(Point::new(10.0, 0.0));
        assert!((p.x - 15.0).abs() < 0.001);
        assert!((p.y - 40.0).abs() < 0.001);
        assert!((t.rotation() + std::f32::consts::FRAC_PI_2).abs() < 0.001);
    }

    #[test]
    fn test_affine_vector_ignores_translation() {
        let t = Affine::IDENTITY.translated(100.0, 100.0);
        let v = t.apply_vector(3.0, 4.0);
        assert!((v.x - 3.0).abs() < 0.001);
        assert!((v.y - 4.0).abs() < 0.001);
    }
}
