use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::GeometryError;
use crate::math::arc_2d::CircularArc;
use crate::math::distance_2d::{
    closest_point_on_ellipse, closest_point_on_segments, ellipse_point_at, thick_segment_corners,
};
use crate::math::{is_finite, Point2, Segment2, TOLERANCE};

use super::Aabb;

/// Identifier of the draft/drawing a shape belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawingId(pub u32);

/// Geometry of a drawable shape.
///
/// Every geometric query is an exhaustive match over the variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Line {
        start: Point2,
        end: Point2,
    },
    /// Axis-aligned rectangle.
    Rectangle {
        min: Point2,
        max: Point2,
    },
    Circle {
        center: Point2,
        radius: f64,
    },
    /// Circular arc; `sweep > 0` runs counter-clockwise from `start_angle`.
    Arc {
        center: Point2,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
    Polyline {
        points: Vec<Point2>,
        closed: bool,
    },
    /// Full ellipse, major axis rotated by `rotation` radians.
    Ellipse {
        center: Point2,
        semi_major: f64,
        semi_minor: f64,
        rotation: f64,
    },
    /// Text block anchored at its bottom-left insertion point.
    Text {
        position: Point2,
        width: f64,
        height: f64,
    },
    /// Structural beam drawn as a thick centerline.
    Beam {
        start: Point2,
        end: Point2,
        width: f64,
    },
}

/// A shape as held by the external shape store.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub drawing: DrawingId,
    pub visible: bool,
    pub locked: bool,
}

impl Shape {
    /// Creates a visible, unlocked shape in `drawing`.
    #[must_use]
    pub fn new(kind: ShapeKind, drawing: DrawingId) -> Self {
        Self {
            kind,
            drawing,
            visible: true,
            locked: false,
        }
    }

    /// Checks the shape for non-finite or negative geometry fields.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] naming the first malformed field.
    pub fn validate(&self) -> Result<(), GeometryError> {
        fn point(p: &Point2, field: &'static str) -> Result<(), GeometryError> {
            if is_finite(p) {
                Ok(())
            } else {
                Err(GeometryError::NonFinite { field })
            }
        }
        fn length(v: f64, field: &'static str) -> Result<(), GeometryError> {
            if !v.is_finite() {
                Err(GeometryError::NonFinite { field })
            } else if v < 0.0 {
                Err(GeometryError::NegativeDimension { field, value: v })
            } else {
                Ok(())
            }
        }

        match &self.kind {
            ShapeKind::Line { start, end } => {
                point(start, "start")?;
                point(end, "end")
            }
            ShapeKind::Rectangle { min, max } => {
                point(min, "min")?;
                point(max, "max")
            }
            ShapeKind::Circle { center, radius } => {
                point(center, "center")?;
                length(*radius, "radius")
            }
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                point(center, "center")?;
                length(*radius, "radius")?;
                if !start_angle.is_finite() {
                    return Err(GeometryError::NonFinite { field: "start_angle" });
                }
                if !sweep.is_finite() {
                    return Err(GeometryError::NonFinite { field: "sweep" });
                }
                Ok(())
            }
            ShapeKind::Polyline { points, .. } => {
                if points.is_empty() {
                    return Err(GeometryError::Degenerate("polyline has no vertices".into()));
                }
                points.iter().try_for_each(|p| point(p, "points"))
            }
            ShapeKind::Ellipse {
                center,
                semi_major,
                semi_minor,
                rotation,
            } => {
                point(center, "center")?;
                length(*semi_major, "semi_major")?;
                length(*semi_minor, "semi_minor")?;
                if rotation.is_finite() {
                    Ok(())
                } else {
                    Err(GeometryError::NonFinite { field: "rotation" })
                }
            }
            ShapeKind::Text {
                position,
                width,
                height,
            } => {
                point(position, "position")?;
                length(*width, "width")?;
                length(*height, "height")
            }
            ShapeKind::Beam { start, end, width } => {
                point(start, "start")?;
                point(end, "end")?;
                length(*width, "width")
            }
        }
    }

    /// Axis-aligned bounding box of the shape's outline.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        match &self.kind {
            ShapeKind::Line { start, end } => Aabb::new(*start, *end),
            ShapeKind::Rectangle { min, max } => Aabb::new(*min, *max),
            ShapeKind::Circle { center, radius } => Aabb::around(center, *radius),
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => arc_bounds(&CircularArc::new(*center, *radius, *start_angle, *sweep)),
            ShapeKind::Polyline { points, .. } => {
                Aabb::from_points(points).unwrap_or_else(|| Aabb::new(Point2::origin(), Point2::origin()))
            }
            ShapeKind::Ellipse {
                center,
                semi_major,
                semi_minor,
                rotation,
            } => {
                let (sin_r, cos_r) = rotation.sin_cos();
                let ex = ((semi_major * cos_r).powi(2) + (semi_minor * sin_r).powi(2)).sqrt();
                let ey = ((semi_major * sin_r).powi(2) + (semi_minor * cos_r).powi(2)).sqrt();
                Aabb::new(
                    Point2::new(center.x - ex, center.y - ey),
                    Point2::new(center.x + ex, center.y + ey),
                )
            }
            ShapeKind::Text {
                position,
                width,
                height,
            } => Aabb::new(*position, Point2::new(position.x + width, position.y + height)),
            ShapeKind::Beam { start, end, width } => {
                let corners = thick_segment_corners(&Segment2::new(*start, *end), *width);
                Aabb::from_points(&corners).unwrap_or_else(|| Aabb::new(*start, *end))
            }
        }
    }

    /// Terminal vertices used for endpoint snapping.
    #[must_use]
    pub fn endpoints(&self) -> Vec<Point2> {
        match &self.kind {
            ShapeKind::Line { start, end } => vec![*start, *end],
            ShapeKind::Rectangle { min, max } => rectangle_corners(min, max).to_vec(),
            ShapeKind::Circle { .. } => Vec::new(),
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let arc = CircularArc::new(*center, *radius, *start_angle, *sweep);
                if arc.is_degenerate() || arc.is_full() {
                    Vec::new()
                } else {
                    vec![arc.start_point(), arc.end_point()]
                }
            }
            ShapeKind::Polyline { points, .. } => points.clone(),
            ShapeKind::Ellipse {
                center,
                semi_major,
                semi_minor,
                rotation,
            } => {
                if *semi_major < TOLERANCE || *semi_minor < TOLERANCE {
                    return Vec::new();
                }
                [0.0, FRAC_PI_2, PI, -FRAC_PI_2]
                    .iter()
                    .map(|t| ellipse_point_at(center, *semi_major, *semi_minor, *rotation, *t))
                    .collect()
            }
            ShapeKind::Text { position, .. } => vec![*position],
            ShapeKind::Beam { start, end, width } => {
                let mut pts = vec![*start, *end];
                if *width > TOLERANCE {
                    pts.extend(thick_segment_corners(&Segment2::new(*start, *end), *width));
                }
                pts
            }
        }
    }

    /// Edge and segment midpoints used for midpoint snapping.
    #[must_use]
    pub fn midpoints(&self) -> Vec<Point2> {
        match &self.kind {
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => {
                let arc = CircularArc::new(*center, *radius, *start_angle, *sweep);
                if arc.is_degenerate() || arc.is_full() {
                    Vec::new()
                } else {
                    vec![arc.mid_point()]
                }
            }
            ShapeKind::Circle { .. } | ShapeKind::Ellipse { .. } | ShapeKind::Text { .. } => {
                Vec::new()
            }
            ShapeKind::Line { .. }
            | ShapeKind::Rectangle { .. }
            | ShapeKind::Polyline { .. }
            | ShapeKind::Beam { .. } => self
                .segments()
                .iter()
                .filter(|s| !s.is_degenerate())
                .map(Segment2::midpoint)
                .collect(),
        }
    }

    /// Center point, for shapes that have one.
    #[must_use]
    pub fn center(&self) -> Option<Point2> {
        match &self.kind {
            ShapeKind::Circle { center, radius } | ShapeKind::Arc { center, radius, .. } => {
                (*radius >= TOLERANCE).then_some(*center)
            }
            ShapeKind::Ellipse {
                center,
                semi_major,
                semi_minor,
                ..
            } => (*semi_major >= TOLERANCE && *semi_minor >= TOLERANCE).then_some(*center),
            ShapeKind::Line { .. }
            | ShapeKind::Rectangle { .. }
            | ShapeKind::Polyline { .. }
            | ShapeKind::Text { .. }
            | ShapeKind::Beam { .. } => None,
        }
    }

    /// Straight edges of the shape's outline.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment2> {
        match &self.kind {
            ShapeKind::Line { start, end } => vec![Segment2::new(*start, *end)],
            ShapeKind::Rectangle { min, max } => closed_ring(&rectangle_corners(min, max)),
            ShapeKind::Polyline { points, closed } => {
                if *closed && points.len() > 2 {
                    closed_ring(points)
                } else {
                    points.windows(2).map(|w| Segment2::new(w[0], w[1])).collect()
                }
            }
            ShapeKind::Beam { start, end, width } => {
                if *width > TOLERANCE {
                    closed_ring(&thick_segment_corners(&Segment2::new(*start, *end), *width))
                } else {
                    vec![Segment2::new(*start, *end)]
                }
            }
            ShapeKind::Text {
                position,
                width,
                height,
            } => closed_ring(&rectangle_corners(
                position,
                &Point2::new(position.x + width, position.y + height),
            )),
            ShapeKind::Circle { .. } | ShapeKind::Arc { .. } | ShapeKind::Ellipse { .. } => {
                Vec::new()
            }
        }
    }

    /// Lines usable as tracking references (parallel, perpendicular, extension).
    ///
    /// Only genuine drawn edges qualify; text boxes are excluded.
    #[must_use]
    pub fn reference_segments(&self) -> Vec<Segment2> {
        match &self.kind {
            ShapeKind::Text { .. } => Vec::new(),
            ShapeKind::Beam { start, end, .. } => vec![Segment2::new(*start, *end)],
            _ => self.segments(),
        }
        .into_iter()
        .filter(|s| !s.is_degenerate())
        .collect()
    }

    /// Circular pieces of the outline.
    #[must_use]
    pub fn arcs(&self) -> Vec<CircularArc> {
        match &self.kind {
            ShapeKind::Circle { center, radius } => vec![CircularArc::full(*center, *radius)],
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => vec![CircularArc::new(*center, *radius, *start_angle, *sweep)],
            ShapeKind::Line { .. }
            | ShapeKind::Rectangle { .. }
            | ShapeKind::Polyline { .. }
            | ShapeKind::Ellipse { .. }
            | ShapeKind::Text { .. }
            | ShapeKind::Beam { .. } => Vec::new(),
        }
        .into_iter()
        .filter(|a| !a.is_degenerate())
        .collect()
    }

    /// Closest point on the shape's outline to `point`.
    ///
    /// `None` only for shapes with no outline at all.
    #[must_use]
    pub fn nearest_point(&self, point: &Point2) -> Option<Point2> {
        match &self.kind {
            ShapeKind::Circle { center, radius } => {
                Some(CircularArc::full(*center, *radius).closest_point(point))
            }
            ShapeKind::Arc {
                center,
                radius,
                start_angle,
                sweep,
            } => Some(CircularArc::new(*center, *radius, *start_angle, *sweep).closest_point(point)),
            ShapeKind::Ellipse {
                center,
                semi_major,
                semi_minor,
                rotation,
            } => Some(closest_point_on_ellipse(
                center,
                *semi_major,
                *semi_minor,
                *rotation,
                point,
            )),
            ShapeKind::Polyline { points, .. } if points.len() == 1 => Some(points[0]),
            ShapeKind::Line { .. }
            | ShapeKind::Rectangle { .. }
            | ShapeKind::Polyline { .. }
            | ShapeKind::Text { .. }
            | ShapeKind::Beam { .. } => closest_point_on_segments(&self.segments(), point),
        }
    }
}

/// Rectangle corners in counter-clockwise order starting at `min`.
fn rectangle_corners(min: &Point2, max: &Point2) -> [Point2; 4] {
    [
        *min,
        Point2::new(max.x, min.y),
        *max,
        Point2::new(min.x, max.y),
    ]
}

/// Segments joining consecutive points, wrapping back to the first.
fn closed_ring(points: &[Point2]) -> Vec<Segment2> {
    let n = points.len();
    (0..n)
        .map(|i| Segment2::new(points[i], points[(i + 1) % n]))
        .collect()
}

/// Bounding box of an arc: its endpoints plus every axis extreme inside the sweep.
fn arc_bounds(arc: &CircularArc) -> Aabb {
    if arc.is_full() {
        return Aabb::around(&arc.center, arc.radius);
    }
    let mut b = Aabb::new(arc.start_point(), arc.end_point());
    for angle in [0.0, FRAC_PI_2, PI, -FRAC_PI_2] {
        if arc.contains_angle(angle) {
            b = b.including(&arc.point_at_angle(angle));
        }
    }
    b
}
