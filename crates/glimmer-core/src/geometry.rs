//! Plain 2D geometry in surface pixels.

use std::ops::{Add, AddAssign, Mul, Sub};

/// A position or offset on the surface, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset of the given polar vector.
    pub fn from_polar(angle: f32, magnitude: f32) -> Self {
        Self {
            x: angle.cos() * magnitude,
            y: angle.sin() * magnitude,
        }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Point) -> f32 {
        let d = self - other;
        (d.x * d.x + d.y * d.y).sqrt()
    }

    /// Linear interpolation from `self` towards `other` by `t`.
    pub fn lerp(self, other: Point, t: f32) -> Point {
        self + (other - self) * t
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Size of the visible surface in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert a percentage position (0-100 on both axes) to pixels.
    pub fn percent_to_px(&self, percent: Point) -> Point {
        Point::new(
            percent.x / 100.0 * self.width,
            percent.y / 100.0 * self.height,
        )
    }

    /// Whether the point lies inside the viewport.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width && p.y < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(a + b, Point::new(5.0, 8.0));
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.lerp(b, 0.5), Point::new(2.5, 4.0));
    }

    #[test]
    fn test_percent_to_px() {
        let vp = Viewport::new(800.0, 400.0);
        assert_eq!(vp.percent_to_px(Point::new(50.0, 25.0)), Point::new(400.0, 100.0));
        assert!(vp.contains(Point::new(0.0, 0.0)));
        assert!(!vp.contains(Point::new(800.0, 10.0)));
    }
}
