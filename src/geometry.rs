use std::cmp::Ordering;
use std::f32::consts::PI;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::Serialize;

/// Tolerance used by both point equality and point ordering.
pub const EPSILON: f32 = 0.1;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point on the circle of `radius` around `center` at `angle` radians.
    pub fn on_circle(center: Point, radius: f32, angle: f32) -> Self {
        center + radius * Point::new(angle.cos(), angle.sin())
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Point) -> f32 {
        (self - other).norm()
    }

    /// Rotation about the origin.
    pub fn rotate(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
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

impl Mul<Point> for f32 {
    type Output = Point;

    fn mul(self, rhs: Point) -> Point {
        rhs * self
    }
}

impl Div<f32> for Point {
    type Output = Point;

    fn div(self, rhs: f32) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.distance(*other) < EPSILON
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            return Some(Ordering::Equal);
        }
        // Columns closer than EPSILON are treated as one and ordered by y.
        if (self.x - other.x).abs() < EPSILON {
            self.y.partial_cmp(&other.y)
        } else {
            self.x.partial_cmp(&other.x)
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cubic Bezier: begin, begin tangent, end tangent, end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bezier {
    points: [Point; 4],
}

impl Bezier {
    pub fn new(begin: Point, begin_tangent: Point, end_tangent: Point, end: Point) -> Self {
        Self {
            points: [begin, begin_tangent, end_tangent, end],
        }
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn begin(&self) -> Point {
        self.points[0]
    }

    pub fn begin_tangent(&self) -> Point {
        self.points[1]
    }

    pub fn end_tangent(&self) -> Point {
        self.points[2]
    }

    pub fn end(&self) -> Point {
        self.points[3]
    }

    pub fn rotate(&self, angle: f32) -> Self {
        Self {
            points: self.points.map(|point| point.rotate(angle)),
        }
    }

    /// Absolute angle in `[0, 2π)` of the direction from `end` to `begin`.
    ///
    /// The sign of the vertical component picks the half plane so the full
    /// circle is covered, not just the `[0, π]` range of `acos`. A zero-length
    /// chord has no direction and reports 0.
    pub fn orientation(&self) -> f32 {
        let direction = self.begin() - self.end();
        let length = direction.norm();
        if length <= f32::EPSILON {
            return 0.0;
        }
        let unit = direction / length;
        let cos_phi = unit.dot(Point::new(1.0, 0.0)).clamp(-1.0, 1.0);
        let sin_phi = unit.dot(Point::new(0.0, 1.0));
        let angle = if sin_phi > 0.0 {
            cos_phi.acos()
        } else {
            2.0 * PI - cos_phi.acos()
        };
        if angle >= 2.0 * PI { angle - 2.0 * PI } else { angle }
    }

    pub fn to_path_data(&self) -> String {
        let [p0, p1, p2, p3] = self.points;
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            p0.x, p0.y, p1.x, p1.y, p2.x, p2.y, p3.x, p3.y
        )
    }
}

impl fmt::Display for Bezier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [p0, p1, p2, p3] = &self.points;
        write!(f, "{p0}, {p1}, {p2}, {p3}")
    }
}

/// Radians to degrees, as SVG `rotate()` expects.
pub fn to_degrees(angle: f32) -> f32 {
    angle * 180.0 / PI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_round_trips_within_tolerance() {
        let point = Point::new(123.4, -56.7);
        let mut angle = -7.0_f32;
        while angle < 7.0 {
            let back = point.rotate(angle).rotate(-angle);
            assert_eq!(back, point, "angle {angle}");
            angle += 0.37;
        }
    }

    #[test]
    fn rotate_quarter_turn() {
        let rotated = Point::new(1.0, 0.0).rotate(PI / 2.0);
        assert!((rotated.x).abs() < 1e-6);
        assert!((rotated.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn equality_is_epsilon_tolerant() {
        assert_eq!(Point::new(1.0, 1.0), Point::new(1.05, 1.0));
        assert_ne!(Point::new(1.0, 1.0), Point::new(1.2, 1.0));
    }

    #[test]
    fn ordering_groups_close_columns_by_y() {
        let a = Point::new(10.0, 5.0);
        let b = Point::new(10.05, 2.0);
        assert!(b < a);
        let c = Point::new(3.0, 100.0);
        assert!(c < a);
        assert_eq!(a.partial_cmp(&Point::new(10.01, 5.01)), Some(Ordering::Equal));
    }

    #[test]
    fn vector_arithmetic() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(a.norm(), 5.0);
        assert_eq!(a.dot(Point::new(1.0, 0.0)), 3.0);
        assert_eq!(2.0 * a, Point::new(6.0, 8.0));
        assert_eq!(a / 2.0 - Point::new(1.5, 2.0), Point::new(0.0, 0.0));
    }

    #[test]
    fn bezier_rotation_moves_every_point() {
        let bz = Bezier::new(
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(4.0, 0.0),
        );
        let rotated = bz.rotate(PI);
        assert_eq!(rotated.begin(), Point::new(-1.0, 0.0));
        assert_eq!(rotated.end(), Point::new(-4.0, 0.0));
        assert_eq!(rotated.rotate(-PI), bz);
    }

    #[test]
    fn orientation_covers_full_circle() {
        let origin = Point::new(0.0, 0.0);
        for step in 0..16 {
            let angle = step as f32 * PI / 8.0;
            let begin = Point::new(angle.cos(), angle.sin()) * 10.0;
            let bz = Bezier::new(begin, begin, origin, origin);
            let got = bz.orientation();
            assert!((0.0..2.0 * PI).contains(&got), "angle {got}");
            let delta = (got - angle).abs();
            assert!(delta < 1e-3 || (delta - 2.0 * PI).abs() < 1e-3, "{got} vs {angle}");
        }
    }

    #[test]
    fn orientation_of_degenerate_chord_is_zero() {
        let p = Point::new(5.0, 5.0);
        assert_eq!(Bezier::new(p, p, p, p).orientation(), 0.0);
    }

    #[test]
    fn path_data_uses_cubic_command() {
        let bz = Bezier::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 2.0),
            Point::new(3.0, 4.0),
            Point::new(5.0, 6.0),
        );
        assert_eq!(
            bz.to_path_data(),
            "M 0.00 0.00 C 1.00 2.00, 3.00 4.00, 5.00 6.00"
        );
    }
}
