use tracing::{debug, trace};

use super::{SnapPoint, SnapSettings, SnapType};
use crate::geometry::{Shape, ShapeId};
use crate::math::arc_2d::CircularArc;
use crate::math::intersect_2d::{arc_arc_intersect_2d, segment_arc_intersect_2d};
use crate::math::{Point2, Segment2, TOLERANCE};

/// Finds the best object snap for a query point.
///
/// Candidates come from the supplied shapes (normally the spatial index's
/// broad-phase result), the grid, and the points of the drawing currently in
/// progress. Shape candidates are ranked by distance with ties broken by
/// [`SnapType::PRIORITY`]; in-progress candidates compete by distance only.
#[derive(Debug)]
pub struct SnapDetector<'a> {
    settings: &'a SnapSettings,
    shapes: &'a [(ShapeId, &'a Shape)],
    tolerance: f64,
    grid_step: Option<f64>,
    base_point: Option<Point2>,
    in_progress: &'a [Point2],
}

impl<'a> SnapDetector<'a> {
    /// Creates a detector over `shapes` with a capture radius of `tolerance`
    /// world units.
    #[must_use]
    pub fn new(settings: &'a SnapSettings, shapes: &'a [(ShapeId, &'a Shape)], tolerance: f64) -> Self {
        Self {
            settings,
            shapes,
            tolerance,
            grid_step: None,
            base_point: None,
            in_progress: &[],
        }
    }

    /// Sets the effective grid step in world units.
    #[must_use]
    pub fn with_grid_step(mut self, step: f64) -> Self {
        self.grid_step = Some(step);
        self
    }

    /// Sets the reference point used by perpendicular and tangent snaps.
    #[must_use]
    pub fn with_base_point(mut self, base: Option<Point2>) -> Self {
        self.base_point = base;
        self
    }

    /// Sets the uncommitted points of the drawing in progress.
    #[must_use]
    pub fn with_in_progress(mut self, points: &'a [Point2]) -> Self {
        self.in_progress = points;
        self
    }

    /// Returns the best snap within tolerance of `query`, if any.
    #[must_use]
    pub fn detect(&self, query: &Point2) -> Option<SnapPoint> {
        if !self.settings.enabled || self.settings.types.is_empty() {
            return None;
        }

        let best_shape = SnapPoint::best(self.candidates(query));
        let best_pending = self
            .in_progress_candidates(query)
            .into_iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        // In-progress points bypass the priority list: the closer one wins.
        let best = match (best_shape, best_pending) {
            (Some(shape), Some(pending)) if pending.distance < shape.distance => Some(pending),
            (Some(shape), _) => Some(shape),
            (None, pending) => pending,
        };
        if let Some(snap) = &best {
            trace!(kind = snap.snap_type.label(), distance = snap.distance, "object snap");
        }
        best
    }

    /// All shape- and grid-derived candidates within tolerance of `query`.
    #[must_use]
    pub fn candidates(&self, query: &Point2) -> Vec<SnapPoint> {
        let mut out = Vec::new();
        let valid: Vec<(ShapeId, &Shape)> = self
            .shapes
            .iter()
            .filter(|(id, shape)| match shape.validate() {
                Ok(()) => true,
                Err(err) => {
                    debug!(?id, %err, "skipping malformed shape for snapping");
                    false
                }
            })
            .map(|(id, shape)| (*id, *shape))
            .collect();

        for (id, shape) in &valid {
            self.shape_candidates(*id, shape, query, &mut out);
        }
        if self.settings.is_enabled(SnapType::Intersection) {
            self.intersection_candidates(&valid, query, &mut out);
        }
        if self.settings.is_enabled(SnapType::Grid) {
            if let Some(snap) = self.grid_candidate(query) {
                out.push(snap);
            }
        }

        out.retain(|c| c.distance <= self.tolerance);
        out
    }

    fn shape_candidates(&self, id: ShapeId, shape: &Shape, query: &Point2, out: &mut Vec<SnapPoint>) {
        let mut push = |point: Point2, kind: SnapType| {
            out.push(SnapPoint::new(point, kind, Some(id), query));
        };

        if self.settings.is_enabled(SnapType::Endpoint) {
            for p in shape.endpoints() {
                push(p, SnapType::Endpoint);
            }
        }
        if self.settings.is_enabled(SnapType::Midpoint) {
            for p in shape.midpoints() {
                push(p, SnapType::Midpoint);
            }
        }
        if self.settings.is_enabled(SnapType::Center) {
            if let Some(c) = shape.center() {
                push(c, SnapType::Center);
            }
        }
        if self.settings.is_enabled(SnapType::Perpendicular) {
            for p in self.perpendicular_points(shape, query) {
                push(p, SnapType::Perpendicular);
            }
        }
        if self.settings.is_enabled(SnapType::Tangent) {
            if let Some(base) = &self.base_point {
                for arc in shape.arcs() {
                    for p in arc.tangent_points_from(base) {
                        push(p, SnapType::Tangent);
                    }
                }
            }
        }
        if self.settings.is_enabled(SnapType::Nearest) {
            if let Some(p) = shape.nearest_point(query) {
                push(p, SnapType::Nearest);
            }
        }
    }

    /// Perpendicular feet on the shape's edges and circles.
    ///
    /// With a base point the foot is dropped from the base point; without one
    /// it is dropped from the query point. Feet must land on the edge.
    fn perpendicular_points(&self, shape: &Shape, query: &Point2) -> Vec<Point2> {
        let from = self.base_point.unwrap_or(*query);
        let mut points: Vec<Point2> = shape
            .segments()
            .iter()
            .filter(|s| !s.is_degenerate())
            .filter_map(|s| {
                let t = s.project_parameter(&from);
                if !(-TOLERANCE..=1.0 + TOLERANCE).contains(&t) {
                    return None;
                }
                let foot = s.closest_point_on_line(&from);
                // A base point lying on the edge has no meaningful foot.
                let on_edge = self.base_point.is_some() && (foot - from).norm() < TOLERANCE;
                (!on_edge).then_some(foot)
            })
            .collect();

        if let Some(base) = &self.base_point {
            for arc in shape.arcs() {
                points.extend(radial_points(&arc, base));
            }
        }
        points
    }

    fn intersection_candidates(
        &self,
        shapes: &[(ShapeId, &Shape)],
        query: &Point2,
        out: &mut Vec<SnapPoint>,
    ) {
        let pieces: Vec<(ShapeId, Vec<Segment2>, Vec<CircularArc>)> = shapes
            .iter()
            .map(|(id, shape)| {
                let segments = shape.segments().into_iter().filter(|s| !s.is_degenerate()).collect();
                (*id, segments, shape.arcs())
            })
            .collect();

        for (i, (id_a, segs_a, arcs_a)) in pieces.iter().enumerate() {
            for (_, segs_b, arcs_b) in &pieces[i + 1..] {
                let mut hits = Vec::new();
                for sa in segs_a {
                    hits.extend(segs_b.iter().filter_map(|sb| sa.segment_intersection(sb)));
                    for ab in arcs_b {
                        hits.extend(segment_arc_intersect_2d(sa, ab));
                    }
                }
                for aa in arcs_a {
                    for sb in segs_b {
                        hits.extend(segment_arc_intersect_2d(sb, aa));
                    }
                    for ab in arcs_b {
                        hits.extend(arc_arc_intersect_2d(aa, ab));
                    }
                }
                out.extend(
                    hits.into_iter()
                        .map(|p| SnapPoint::new(p, SnapType::Intersection, Some(*id_a), query)),
                );
            }
        }
    }

    fn grid_candidate(&self, query: &Point2) -> Option<SnapPoint> {
        let step = self.grid_step.unwrap_or(self.settings.grid_size);
        if !(step.is_finite() && step > 0.0) {
            return None;
        }
        let p = Point2::new((query.x / step).round() * step, (query.y / step).round() * step);
        Some(SnapPoint::new(p, SnapType::Grid, None, query))
    }

    /// Vertices and segment midpoints of the drawing in progress.
    fn in_progress_candidates(&self, query: &Point2) -> Vec<SnapPoint> {
        let mut out = Vec::new();
        if self.settings.is_enabled(SnapType::Endpoint) {
            out.extend(
                self.in_progress
                    .iter()
                    .map(|p| SnapPoint::new(*p, SnapType::Endpoint, None, query)),
            );
        }
        if self.settings.is_enabled(SnapType::Midpoint) {
            out.extend(
                self.in_progress
                    .windows(2)
                    .map(|w| Segment2::new(w[0], w[1]))
                    .filter(|s| !s.is_degenerate())
                    .map(|s| SnapPoint::new(s.midpoint(), SnapType::Midpoint, None, query)),
            );
        }
        out.retain(|c| c.distance <= self.tolerance);
        out
    }
}

/// Points of `arc` on the line through its center and `base`.
fn radial_points(arc: &CircularArc, base: &Point2) -> Vec<Point2> {
    let v = base - arc.center;
    if v.norm() < TOLERANCE || arc.is_degenerate() {
        return Vec::new();
    }
    let angle = v.y.atan2(v.x);
    [angle, angle + std::f64::consts::PI]
        .into_iter()
        .filter(|a| arc.contains_angle(crate::math::normalize_angle(*a)))
        .map(|a| arc.point_at_angle(a))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{DrawingId, ShapeKind, ShapeStore};
    use approx::assert_relative_eq;

    fn store_with(kinds: Vec<ShapeKind>) -> (ShapeStore, Vec<ShapeId>) {
        let mut store = ShapeStore::new();
        let ids = kinds
            .into_iter()
            .map(|k| store.insert(Shape::new(k, DrawingId(0))))
            .collect();
        (store, ids)
    }

    fn all(store: &ShapeStore) -> Vec<(ShapeId, &Shape)> {
        store.iter().collect()
    }

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> ShapeKind {
        ShapeKind::Line {
            start: Point2::new(x0, y0),
            end: Point2::new(x1, y1),
        }
    }

    #[test]
    fn endpoint_wins_exact_tie_with_midpoint() {
        // Endpoint of one line and midpoint of another, both exactly 2 away.
        let (store, ids) = store_with(vec![
            line(0.0, 2.0, 0.0, 10.0),
            line(-5.0, -2.0, 5.0, -2.0),
        ]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Endpoint, SnapType::Midpoint]);
        let snap = SnapDetector::new(&settings, &shapes, 5.0)
            .detect(&Point2::origin())
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Endpoint);
        assert_eq!(snap.source, Some(ids[0]));
        assert_eq!(snap.point, Point2::new(0.0, 2.0));
    }

    #[test]
    fn closer_candidate_beats_priority() {
        let (store, _) = store_with(vec![line(-4.0, 1.0, 4.0, 1.0), line(3.0, 3.0, 9.0, 3.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Endpoint, SnapType::Midpoint]);
        let snap = SnapDetector::new(&settings, &shapes, 10.0)
            .detect(&Point2::origin())
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Midpoint);
        assert_eq!(snap.point, Point2::new(0.0, 1.0));
    }

    #[test]
    fn grid_snap_rounds_to_nearest_intersection() {
        let settings = SnapSettings::only(&[SnapType::Grid]);
        let snap = SnapDetector::new(&settings, &[], 10.0)
            .with_grid_step(10.0)
            .detect(&Point2::new(14.0, 14.0))
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Grid);
        assert_eq!(snap.point, Point2::new(10.0, 10.0));
        assert!(snap.source.is_none());
    }

    #[test]
    fn empty_inputs_return_none() {
        let settings = SnapSettings::default();
        assert!(SnapDetector::new(&settings, &[], 10.0)
            .detect(&Point2::origin())
            .is_none());

        let (store, _) = store_with(vec![line(0.0, 0.0, 1.0, 0.0)]);
        let shapes = all(&store);
        let none = SnapSettings::only(&[]);
        assert!(SnapDetector::new(&none, &shapes, 10.0)
            .detect(&Point2::origin())
            .is_none());
    }

    #[test]
    fn candidates_outside_tolerance_are_dropped() {
        let (store, _) = store_with(vec![line(100.0, 100.0, 200.0, 100.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::default();
        assert!(SnapDetector::new(&settings, &shapes, 10.0)
            .detect(&Point2::origin())
            .is_none());
    }

    #[test]
    fn center_of_circle_and_arc() {
        let (store, ids) = store_with(vec![ShapeKind::Circle {
            center: Point2::new(1.0, 1.0),
            radius: 3.0,
        }]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Center, SnapType::Nearest]);
        let snap = SnapDetector::new(&settings, &shapes, 2.0)
            .detect(&Point2::new(1.5, 1.0))
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Center);
        assert_eq!(snap.source, Some(ids[0]));
    }

    #[test]
    fn intersection_of_crossing_lines() {
        let (store, _) = store_with(vec![line(-5.0, -5.0, 5.0, 5.0), line(-5.0, 5.0, 5.0, -5.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Intersection, SnapType::Endpoint]);
        let snap = SnapDetector::new(&settings, &shapes, 2.0)
            .detect(&Point2::new(0.3, 0.1))
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Intersection);
        assert_relative_eq!(snap.point.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(snap.point.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn intersection_of_line_and_circle() {
        let (store, _) = store_with(vec![
            line(-10.0, 0.0, 10.0, 0.0),
            ShapeKind::Circle {
                center: Point2::origin(),
                radius: 5.0,
            },
        ]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Intersection]);
        let snap = SnapDetector::new(&settings, &shapes, 1.0)
            .detect(&Point2::new(4.6, 0.4))
            .unwrap();
        assert_relative_eq!(snap.point.x, 5.0, epsilon = 1e-9);
        assert_relative_eq!(snap.point.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn perpendicular_from_base_point() {
        let (store, _) = store_with(vec![line(0.0, 0.0, 20.0, 0.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Perpendicular]);
        let snap = SnapDetector::new(&settings, &shapes, 3.0)
            .with_base_point(Some(Point2::new(7.0, 12.0)))
            .detect(&Point2::new(8.0, 1.0))
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Perpendicular);
        assert_relative_eq!(snap.point.x, 7.0, epsilon = 1e-9);
        assert_relative_eq!(snap.point.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn perpendicular_foot_must_land_on_segment() {
        let (store, _) = store_with(vec![line(0.0, 0.0, 5.0, 0.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Perpendicular]);
        assert!(SnapDetector::new(&settings, &shapes, 3.0)
            .with_base_point(Some(Point2::new(9.0, 4.0)))
            .detect(&Point2::new(6.0, 0.0))
            .is_none());
    }

    #[test]
    fn tangent_from_base_point() {
        let (store, _) = store_with(vec![ShapeKind::Circle {
            center: Point2::origin(),
            radius: 1.0,
        }]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Tangent]);
        let base = Point2::new(2.0, 0.0);
        let snap = SnapDetector::new(&settings, &shapes, 0.5)
            .with_base_point(Some(base))
            .detect(&Point2::new(0.5, 0.9))
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Tangent);
        let radial = snap.point - Point2::origin();
        assert_relative_eq!(radial.dot(&(snap.point - base)), 0.0, epsilon = 1e-9);
        assert!(snap.point.y > 0.0);

        // No base point, no tangent.
        assert!(SnapDetector::new(&settings, &shapes, 0.5)
            .detect(&Point2::new(0.5, 0.9))
            .is_none());
    }

    #[test]
    fn nearest_is_the_fallback() {
        let (store, _) = store_with(vec![line(0.0, 0.0, 100.0, 0.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::default();
        let snap = SnapDetector::new(&settings, &shapes, 5.0)
            .detect(&Point2::new(30.0, 2.0))
            .unwrap();
        // Perpendicular from the cursor ties with nearest and outranks it.
        assert_eq!(snap.snap_type, SnapType::Perpendicular);
        assert_relative_eq!(snap.point.x, 30.0, epsilon = 1e-9);
        assert_relative_eq!(snap.point.y, 0.0, epsilon = 1e-9);

        let nearest_only = SnapSettings::only(&[SnapType::Nearest, SnapType::Grid]);
        let snap = SnapDetector::new(&nearest_only, &shapes, 5.0)
            .with_grid_step(1000.0)
            .detect(&Point2::new(30.0, 2.0))
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Nearest);
    }

    #[test]
    fn in_progress_points_compare_by_distance_only() {
        // A committed endpoint exactly 2 away versus an in-progress midpoint
        // 1e-7 closer. Within the tie epsilon the priority list would pick
        // the endpoint; in-progress candidates compete on distance alone.
        let (store, _) = store_with(vec![line(2.0, 0.0, 2.0, 10.0)]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Endpoint, SnapType::Midpoint]);
        let x = -2.0 + 1e-7;
        let pending = [Point2::new(x, -1.0), Point2::new(x, 1.0)];
        let snap = SnapDetector::new(&settings, &shapes, 5.0)
            .with_in_progress(&pending)
            .detect(&Point2::origin())
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Midpoint);
        assert!(snap.source.is_none());
        assert_eq!(snap.point, Point2::new(x, 0.0));

        // An exact tie keeps the committed shape candidate, even though an
        // in-progress endpoint would outrank a midpoint by priority.
        let (store, _) = store_with(vec![line(-3.0, 1.0, 3.0, 1.0)]);
        let shapes = all(&store);
        let pending = [Point2::new(0.0, -1.0)];
        let snap = SnapDetector::new(&settings, &shapes, 5.0)
            .with_in_progress(&pending)
            .detect(&Point2::origin())
            .unwrap();
        assert_eq!(snap.snap_type, SnapType::Midpoint);
        assert!(snap.source.is_some());
    }

    #[test]
    fn malformed_and_degenerate_shapes_are_skipped() {
        let (store, ids) = store_with(vec![
            line(f64::NAN, 0.0, 1.0, 1.0),
            ShapeKind::Circle {
                center: Point2::new(0.5, 0.5),
                radius: 0.0,
            },
            line(0.0, 1.0, 4.0, 1.0),
        ]);
        let shapes = all(&store);
        let settings = SnapSettings::only(&[SnapType::Endpoint, SnapType::Center]);
        let snap = SnapDetector::new(&settings, &shapes, 5.0)
            .detect(&Point2::new(0.5, 0.5))
            .unwrap();
        assert_eq!(snap.source, Some(ids[2]));
        assert_eq!(snap.point, Point2::new(0.0, 1.0));
    }
}
