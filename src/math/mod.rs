pub mod arc_2d;
pub mod distance_2d;
pub mod intersect_2d;
pub mod segment;

pub use segment::Segment2;

use std::f64::consts::PI;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns the Euclidean distance between two points.
#[must_use]
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Returns the point halfway between `a` and `b`.
#[must_use]
pub fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    nalgebra::center(a, b)
}

/// Linear interpolation: `a + (b - a) * t`.
#[must_use]
pub fn lerp(a: &Point2, b: &Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// Returns the point at `length` along `angle` (radians, CCW from +X) from `origin`.
#[must_use]
pub fn from_polar(length: f64, angle: f64, origin: &Point2) -> Point2 {
    Point2::new(
        origin.x + length * angle.cos(),
        origin.y + length * angle.sin(),
    )
}

/// Translates a point by a vector.
#[must_use]
pub fn add(p: &Point2, v: &Vector2) -> Point2 {
    p + v
}

/// Scales a vector.
#[must_use]
pub fn scale(v: &Vector2, factor: f64) -> Vector2 {
    v * factor
}

/// Dot product of two 2D vectors.
#[must_use]
pub fn dot(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Scalar (z-component) cross product of two 2D vectors.
#[must_use]
pub fn cross(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Angle of a vector in `(-π, π]`.
#[must_use]
pub fn vector_angle(v: &Vector2) -> f64 {
    normalize_angle(v.y.atan2(v.x))
}

/// Wraps an angle into `(-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Smallest absolute difference between two angles, in `[0, π]`.
#[must_use]
pub fn angle_between(a: f64, b: f64) -> f64 {
    normalize_angle(a - b).abs()
}

/// Returns `true` if every coordinate of the point is finite.
#[must_use]
pub fn is_finite(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
