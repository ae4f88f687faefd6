use super::{cross, vector_angle, Point2, Vector2, TOLERANCE};

/// A line segment from `start` to `end`.
///
/// The same value is used for infinite-line queries such as
/// [`Segment2::line_intersection`] where only the supporting line matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2 {
    pub start: Point2,
    pub end: Point2,
}

impl Segment2 {
    /// Creates a new segment.
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Vector from `start` to `end`.
    #[must_use]
    pub fn delta(&self) -> Vector2 {
        self.end - self.start
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.delta().norm()
    }

    /// Returns `true` if the segment has (numerically) zero length.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.delta().norm_squared() < TOLERANCE * TOLERANCE
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        super::midpoint(&self.start, &self.end)
    }

    /// Unit direction from `start` to `end`.
    ///
    /// A zero-length segment returns `(1, 0)`.
    #[must_use]
    pub fn direction(&self) -> Vector2 {
        let d = self.delta();
        let len = d.norm();
        if len < TOLERANCE {
            return Vector2::new(1.0, 0.0);
        }
        d / len
    }

    /// [`Segment2::direction`] rotated 90° counter-clockwise.
    #[must_use]
    pub fn perpendicular_direction(&self) -> Vector2 {
        let d = self.direction();
        Vector2::new(-d.y, d.x)
    }

    /// Angle of the segment direction in `(-π, π]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        vector_angle(&self.direction())
    }

    /// Solves `self.start + ua * da = other.start + ub * db`.
    ///
    /// Returns `None` when the lines are parallel.
    fn solve(&self, other: &Segment2) -> Option<(f64, f64)> {
        let da = self.delta();
        let db = other.delta();
        let det = cross(&da, &db);
        if det.abs() < TOLERANCE {
            return None;
        }
        let d = other.start - self.start;
        let ua = cross(&d, &db) / det;
        let ub = cross(&d, &da) / det;
        Some((ua, ub))
    }

    /// Bounded segment-segment intersection.
    ///
    /// Returns `None` for parallel segments or when the crossing lies outside
    /// either segment.
    #[must_use]
    pub fn segment_intersection(&self, other: &Segment2) -> Option<Point2> {
        let (ua, ub) = self.solve(other)?;
        // Small epsilon so shared endpoints still count.
        let range = -TOLERANCE..=1.0 + TOLERANCE;
        if !range.contains(&ua) || !range.contains(&ub) {
            return None;
        }
        Some(self.start + self.delta() * ua.clamp(0.0, 1.0))
    }

    /// Intersection of the two supporting infinite lines.
    #[must_use]
    pub fn line_intersection(&self, other: &Segment2) -> Option<Point2> {
        let (ua, _) = self.solve(other)?;
        Some(self.start + self.delta() * ua)
    }

    /// Projection parameter of `point` onto the supporting line.
    ///
    /// `0` at `start`, `1` at `end`; a degenerate segment yields `0`.
    #[must_use]
    pub fn project_parameter(&self, point: &Point2) -> f64 {
        let d = self.delta();
        let len_sq = d.norm_squared();
        if len_sq < TOLERANCE * TOLERANCE {
            return 0.0;
        }
        (point - self.start).dot(&d) / len_sq
    }

    /// Closest point to `point` on the segment.
    #[must_use]
    pub fn closest_point_on_segment(&self, point: &Point2) -> Point2 {
        let t = self.project_parameter(point).clamp(0.0, 1.0);
        self.start + self.delta() * t
    }

    /// Closest point to `point` on the supporting infinite line.
    #[must_use]
    pub fn closest_point_on_line(&self, point: &Point2) -> Point2 {
        let t = self.project_parameter(point);
        self.start + self.delta() * t
    }

    /// Distance from `point` to the segment.
    #[must_use]
    pub fn distance_to_segment(&self, point: &Point2) -> f64 {
        (point - self.closest_point_on_segment(point)).norm()
    }

    /// Distance from `point` to the supporting infinite line.
    #[must_use]
    pub fn distance_to_line(&self, point: &Point2) -> f64 {
        (point - self.closest_point_on_line(point)).norm()
    }

    /// Returns a copy offset by `distance` along the perpendicular direction.
    ///
    /// Positive distances offset to the left of the walking direction.
    #[must_use]
    pub fn parallel(&self, distance: f64) -> Segment2 {
        let offset = self.perpendicular_direction() * distance;
        Segment2::new(self.start + offset, self.end + offset)
    }

    /// Segment of `length` starting at `point`, perpendicular to this one.
    #[must_use]
    pub fn perpendicular_through(&self, point: &Point2, length: f64) -> Segment2 {
        Segment2::new(*point, point + self.perpendicular_direction() * length)
    }

    /// Rebuilds the segment from `base_point` at its original length with the
    /// angle rounded to the nearest multiple of `increment_deg`.
    ///
    /// A non-positive or non-finite increment keeps the original direction.
    #[must_use]
    pub fn snap_angle(&self, base_point: &Point2, increment_deg: f64) -> Segment2 {
        if increment_deg <= 0.0 || !increment_deg.is_finite() {
            return Segment2::new(*base_point, base_point + self.delta());
        }
        let step = increment_deg.to_radians();
        let snapped = (self.angle() / step).round() * step;
        let end = super::from_polar(self.length(), snapped, base_point);
        Segment2::new(*base_point, end)
    }
}
