mod viewport;

pub use viewport::{Viewport, MAX_GRID_PX, MIN_GRID_PX};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{DrawingId, Shape, ShapeId, ShapeStore};
use crate::index::{IndexCache, QuadTree};
use crate::input::direct_distance_angle;
use crate::math::{Point2, Segment2};
use crate::snap::{SnapDetector, SnapPoint, SnapSettings};
use crate::tracking::{AlignmentTracker, TrackingLine, TrackingSettings};

/// Snap and tracking configuration read on every resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveSettings {
    pub snap: SnapSettings,
    pub tracking: TrackingSettings,
}

impl ResolveSettings {
    /// Validates both settings groups.
    ///
    /// # Errors
    ///
    /// Returns [`DraftsnapError::Settings`](crate::DraftsnapError::Settings) wrapping the first problem found.
    pub fn validate(&self) -> crate::Result<()> {
        self.snap.validate()?;
        self.tracking.validate()?;
        Ok(())
    }
}

/// One pointer event to resolve.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Raw cursor in world coordinates.
    pub cursor: Point2,
    /// Last placed point of the current operation.
    pub base_point: Option<Point2>,
    /// Direction of the line the previous snap landed on.
    pub source_snap_angle: Option<f64>,
    /// Uncommitted points of the shape being drawn.
    pub in_progress: &'a [Point2],
    pub drawing: DrawingId,
}

impl<'a> ResolveRequest<'a> {
    #[must_use]
    pub fn new(cursor: Point2, drawing: DrawingId) -> Self {
        Self {
            cursor,
            base_point: None,
            source_snap_angle: None,
            in_progress: &[],
            drawing,
        }
    }

    #[must_use]
    pub fn with_base_point(mut self, base: Point2) -> Self {
        self.base_point = Some(base);
        self
    }

    #[must_use]
    pub fn with_source_snap_angle(mut self, angle: f64) -> Self {
        self.source_snap_angle = Some(angle);
        self
    }

    #[must_use]
    pub fn with_in_progress(mut self, points: &'a [Point2]) -> Self {
        self.in_progress = points;
        self
    }
}

/// Outcome of resolving one event.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPoint {
    /// Final point: the snap if any, else the tracked point, else the cursor.
    pub point: Point2,
    pub snap: Option<SnapPoint>,
    /// Active tracking rays, kept for display even when a snap wins.
    pub tracking_lines: Vec<TrackingLine>,
    /// Direction for a typed distance: the first active ray, otherwise the
    /// bearing from the base point to the cursor.
    pub direct_distance_angle: Option<f64>,
    /// Direction of the segment the snap landed on, to pass back as the next
    /// request's `source_snap_angle`.
    pub source_angle: Option<f64>,
}

impl ResolvedPoint {
    fn raw(cursor: Point2) -> Self {
        Self {
            point: cursor,
            snap: None,
            tracking_lines: Vec::new(),
            direct_distance_angle: None,
            source_angle: None,
        }
    }
}

/// Resolves cursor positions against a shape store.
///
/// Holds the memoized spatial index between events; everything else is
/// passed in per call.
#[derive(Debug, Default)]
pub struct PointResolver {
    cache: IndexCache,
}

impl PointResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spatial index builds so far.
    #[must_use]
    pub fn rebuild_count(&self) -> usize {
        self.cache.rebuild_count()
    }

    /// Resolves one pointer event.
    ///
    /// Never fails: an unusable viewport yields the raw cursor.
    pub fn resolve(
        &mut self,
        store: &ShapeStore,
        viewport: &Viewport,
        settings: &ResolveSettings,
        request: &ResolveRequest<'_>,
    ) -> ResolvedPoint {
        let cursor = request.cursor;
        if let Err(err) = viewport.validate() {
            warn!(%err, "unusable viewport, returning raw cursor");
            return ResolvedPoint::raw(cursor);
        }

        let snap_tolerance = viewport.world_tolerance(settings.snap.tolerance_px);
        let grid_step = viewport.effective_grid_step(settings.snap.grid_size);
        let tree = self
            .cache
            .get(store, request.drawing, settings.snap.snap_to_locked);

        let tracked = request.base_point.and_then(|base| {
            if !settings.tracking.enabled {
                return None;
            }
            let references: Vec<Segment2> = if settings.tracking.object_tracking {
                let radius = viewport.world_tolerance(settings.tracking.search_radius_px);
                tree.query_point(&cursor, radius)
                    .into_iter()
                    .filter_map(|id| store.get(id))
                    .flat_map(Shape::reference_segments)
                    .collect()
            } else {
                Vec::new()
            };
            AlignmentTracker::new(
                &settings.tracking,
                viewport.world_tolerance(settings.tracking.tolerance_px),
            )
            .with_references(&references)
            .with_source_snap_angle(request.source_snap_angle)
            .track(&base, &cursor)
        });

        let snap_at = |query: &Point2| {
            let shapes = nearby(store, &tree, query, snap_tolerance);
            SnapDetector::new(&settings.snap, &shapes, snap_tolerance)
                .with_grid_step(grid_step)
                .with_base_point(request.base_point)
                .with_in_progress(request.in_progress)
                .detect(query)
        };
        let raw_snap = snap_at(&cursor);
        let tracked_snap = tracked.as_ref().and_then(|t| snap_at(&t.point));
        let snap = match (raw_snap, tracked_snap) {
            (Some(raw), Some(aligned)) if aligned.distance < raw.distance => Some(aligned),
            (Some(raw), _) => Some(raw),
            (None, aligned) => aligned,
        };

        let tracking_angle = tracked.as_ref().map(|t| t.angle);
        let dd_angle = match request.base_point {
            Some(base) => direct_distance_angle(tracking_angle, &base, &cursor),
            None => tracking_angle,
        };
        let point = snap
            .map(|s| s.point)
            .or_else(|| tracked.as_ref().map(|t| t.point))
            .unwrap_or(cursor);
        let source_angle = snap.as_ref().and_then(|s| source_angle(store, s));

        debug!(
            snap = ?snap.map(|s| s.snap_type),
            rays = tracked.as_ref().map_or(0, |t| t.lines.len()),
            x = point.x,
            y = point.y,
            "resolved point"
        );

        ResolvedPoint {
            point,
            snap,
            tracking_lines: tracked.map(|t| t.lines).unwrap_or_default(),
            direct_distance_angle: dd_angle,
            source_angle,
        }
    }
}

/// Broad-phase shapes around `query`.
fn nearby<'s>(store: &'s ShapeStore, tree: &QuadTree, query: &Point2, tolerance: f64) -> Vec<(ShapeId, &'s Shape)> {
    tree.query_point(query, tolerance)
        .into_iter()
        .filter_map(|id| store.get(id).map(|shape| (id, shape)))
        .collect()
}

/// Bearing of the source shape's segment closest to the snapped point.
fn source_angle(store: &ShapeStore, snap: &SnapPoint) -> Option<f64> {
    let shape = store.get(snap.source?)?;
    shape
        .reference_segments()
        .into_iter()
        .min_by(|a, b| {
            a.distance_to_segment(&snap.point)
                .total_cmp(&b.distance_to_segment(&snap.point))
        })
        .map(|segment| segment.angle())
}
