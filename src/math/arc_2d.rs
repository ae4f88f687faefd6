use std::f64::consts::{PI, TAU};

use super::{from_polar, Point2, TOLERANCE};

/// A circle or circular arc in center/radius/angle form.
///
/// Angles are radians counter-clockwise from +X. A positive sweep runs
/// counter-clockwise and a sweep of `±2π` or more is a full circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularArc {
    pub center: Point2,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

impl CircularArc {
    /// Creates an arc.
    #[must_use]
    pub fn new(center: Point2, radius: f64, start_angle: f64, sweep: f64) -> Self {
        Self {
            center,
            radius,
            start_angle,
            sweep,
        }
    }

    /// Creates a full circle.
    #[must_use]
    pub fn full(center: Point2, radius: f64) -> Self {
        Self::new(center, radius, 0.0, TAU)
    }

    /// Returns `true` if the arc covers the whole circle.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.sweep.abs() >= TAU - TOLERANCE
    }

    /// Returns `true` if the radius or sweep is (numerically) zero.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.radius < TOLERANCE || self.sweep.abs() < TOLERANCE
    }

    /// Point on the underlying circle at `angle`.
    #[must_use]
    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        from_polar(self.radius, angle, &self.center)
    }

    /// Evaluates the arc at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.point_at_angle(self.start_angle + self.sweep * t)
    }

    /// Start point of the arc.
    #[must_use]
    pub fn start_point(&self) -> Point2 {
        self.point_at(0.0)
    }

    /// End point of the arc.
    #[must_use]
    pub fn end_point(&self) -> Point2 {
        self.point_at(1.0)
    }

    /// Point halfway along the sweep.
    #[must_use]
    pub fn mid_point(&self) -> Point2 {
        self.point_at(0.5)
    }

    /// Checks whether `angle` falls within the arc's angular range.
    #[must_use]
    pub fn contains_angle(&self, angle: f64) -> bool {
        self.is_full() || angle_in_arc_range(angle, self.start_angle, self.sweep)
    }

    /// Closest point on the arc to `point`.
    ///
    /// A query at the exact center returns the start point.
    #[must_use]
    pub fn closest_point(&self, point: &Point2) -> Point2 {
        let v = point - self.center;
        if v.norm() < TOLERANCE {
            return self.start_point();
        }
        let angle = v.y.atan2(v.x);
        if self.contains_angle(angle) {
            return self.point_at_angle(angle);
        }
        let (s, e) = (self.start_point(), self.end_point());
        if (point - s).norm() <= (point - e).norm() {
            s
        } else {
            e
        }
    }

    /// Tangent points on the arc for lines through the external `point`.
    ///
    /// Empty when `point` lies on or inside the circle.
    #[must_use]
    pub fn tangent_points_from(&self, point: &Point2) -> Vec<Point2> {
        let v = point - self.center;
        let d = v.norm();
        if d <= self.radius + TOLERANCE || self.radius < TOLERANCE {
            return Vec::new();
        }
        let base = v.y.atan2(v.x);
        let half = (self.radius / d).acos();
        [base + half, base - half]
            .into_iter()
            .filter(|a| self.contains_angle(*a))
            .map(|a| self.point_at_angle(a))
            .collect()
    }
}

/// Checks if an angle falls within an arc's angular range.
#[must_use]
pub fn angle_in_arc_range(angle: f64, start_angle: f64, sweep: f64) -> bool {
    let eps = TOLERANCE * 100.0;
    let mut delta = angle - start_angle;

    if sweep > 0.0 {
        while delta < -eps {
            delta += 2.0 * PI;
        }
        while delta > 2.0 * PI + eps {
            delta -= 2.0 * PI;
        }
        delta >= -eps && delta <= sweep + eps
    } else {
        while delta > eps {
            delta -= 2.0 * PI;
        }
        while delta < -2.0 * PI - eps {
            delta += 2.0 * PI;
        }
        delta <= eps && delta >= sweep - eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn endpoints_and_midpoint() {
        let arc = CircularArc::new(Point2::origin(), 2.0, 0.0, PI);
        assert_relative_eq!(arc.start_point().x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(arc.end_point().x, -2.0, epsilon = 1e-12);
        assert_relative_eq!(arc.mid_point().y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn angle_range_ccw_and_cw() {
        assert!(angle_in_arc_range(FRAC_PI_2, 0.0, PI));
        assert!(!angle_in_arc_range(-FRAC_PI_2, 0.0, PI));
        assert!(angle_in_arc_range(-FRAC_PI_2, 0.0, -PI));
        assert!(!angle_in_arc_range(FRAC_PI_2, 0.0, -PI));
    }

    #[test]
    fn closest_point_outside_sweep_picks_endpoint() {
        let arc = CircularArc::new(Point2::origin(), 1.0, 0.0, PI);
        let p = arc.closest_point(&Point2::new(0.5, -2.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-12);

        let q = arc.closest_point(&Point2::new(0.0, 3.0));
        assert_relative_eq!(q.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn tangent_points_are_perpendicular_to_radius() {
        let circle = CircularArc::full(Point2::origin(), 1.0);
        let from = Point2::new(2.0, 0.0);
        let pts = circle.tangent_points_from(&from);
        assert_eq!(pts.len(), 2);
        for p in pts {
            let radial = p - circle.center;
            let ray = p - from;
            assert_relative_eq!(radial.dot(&ray), 0.0, epsilon = 1e-9);
        }
        assert!(circle.tangent_points_from(&Point2::new(0.5, 0.0)).is_empty());
    }
}
