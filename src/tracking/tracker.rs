use std::f64::consts::{FRAC_PI_2, PI};

use tracing::trace;

use super::{TrackingLine, TrackingResult, TrackingSettings, TrackingType};
use crate::math::{angle_between, vector_angle, Point2, Segment2, TOLERANCE};

/// A ray that currently captures the cursor, with the cursor's offset from it.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    line: TrackingLine,
    offset: f64,
}

/// Computes construction rays from a base point and aligns the cursor to them.
///
/// Reference segments (normally the edges of shapes near the cursor) feed the
/// parallel, perpendicular and extension rays.
#[derive(Debug)]
pub struct AlignmentTracker<'a> {
    settings: &'a TrackingSettings,
    tolerance: f64,
    references: &'a [Segment2],
    source_snap_angle: Option<f64>,
}

impl<'a> AlignmentTracker<'a> {
    /// Creates a tracker capturing rays within `tolerance` world units.
    #[must_use]
    pub fn new(settings: &'a TrackingSettings, tolerance: f64) -> Self {
        Self {
            settings,
            tolerance,
            references: &[],
            source_snap_angle: None,
        }
    }

    /// Sets the existing lines used for parallel, perpendicular and extension rays.
    #[must_use]
    pub fn with_references(mut self, references: &'a [Segment2]) -> Self {
        self.references = references;
        self
    }

    /// Sets the direction of the line a previous snap landed on.
    #[must_use]
    pub fn with_source_snap_angle(mut self, angle: Option<f64>) -> Self {
        self.source_snap_angle = angle;
        self
    }

    /// Aligns `cursor` to the rays from `base`.
    ///
    /// Returns `None` when tracking is disabled or no ray captures the cursor.
    #[must_use]
    pub fn track(&self, base: &Point2, cursor: &Point2) -> Option<TrackingResult> {
        if !self.settings.enabled {
            return None;
        }
        let mut candidates = self.qualifying_rays(base, cursor);
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        let best = candidates[0].line;
        if let Some((partner, point)) = self.acquire_pair(&best, &candidates[1..], cursor) {
            trace!(first = ?best.tracking_type, second = ?partner.tracking_type, "two-ray acquisition");
            return Some(TrackingResult {
                point,
                lines: vec![best, partner],
                angle: best.angle,
            });
        }

        trace!(kind = ?best.tracking_type, angle = best.angle, "tracking ray");
        Some(TrackingResult {
            point: best.project(cursor),
            lines: vec![best],
            angle: best.angle,
        })
    }

    /// Every ray that currently captures the cursor, de-duplicated.
    fn qualifying_rays(&self, base: &Point2, cursor: &Point2) -> Vec<Candidate> {
        let mut out: Vec<Candidate> = Vec::new();
        let to_cursor = cursor - base;
        if to_cursor.norm() < TOLERANCE {
            return out;
        }
        let bearing = vector_angle(&to_cursor);
        let angle_tolerance = self.settings.angle_tolerance_deg.to_radians();

        let push = |line: TrackingLine, out: &mut Vec<Candidate>| {
            if line.along(cursor) <= TOLERANCE {
                return;
            }
            if out.iter().any(|c| c.line.coincides_with(&line)) {
                return;
            }
            let offset = line.offset(cursor);
            out.push(Candidate { line, offset });
        };

        if self.settings.polar || self.settings.ortho {
            let step = self.settings.effective_increment_deg().to_radians();
            if step > 0.0 {
                let angle = (bearing / step).round() * step;
                let line = TrackingLine::new(*base, angle, TrackingType::Polar);
                if line.offset(cursor) <= self.tolerance {
                    push(line, &mut out);
                }
            }
        }

        if !self.settings.object_tracking {
            return out;
        }

        let directional = |angle: f64, kind: TrackingType, out: &mut Vec<Candidate>| {
            // A direction and its reverse are the same construction line.
            let heading = if angle_between(angle, bearing) <= angle_between(angle + PI, bearing) {
                angle
            } else {
                angle + PI
            };
            if angle_between(heading, bearing) <= angle_tolerance {
                push(TrackingLine::new(*base, heading, kind), out);
            }
        };

        for segment in self.references.iter().filter(|s| !s.is_degenerate()) {
            directional(segment.angle(), TrackingType::Parallel, &mut out);
        }
        for segment in self.references.iter().filter(|s| !s.is_degenerate()) {
            directional(segment.angle() + FRAC_PI_2, TrackingType::Perpendicular, &mut out);
        }
        if let Some(angle) = self.source_snap_angle.filter(|a| a.is_finite()) {
            directional(angle + FRAC_PI_2, TrackingType::Perpendicular, &mut out);
        }

        for segment in self.references.iter().filter(|s| !s.is_degenerate()) {
            let forward = segment.angle();
            for (origin, angle) in [(segment.end, forward), (segment.start, forward + PI)] {
                let line = TrackingLine::new(origin, angle, TrackingType::Extension);
                if line.offset(cursor) <= self.tolerance {
                    push(line, &mut out);
                }
            }
        }

        out
    }

    /// Finds the partner ray whose intersection with `best` lies closest to
    /// the cursor, within tolerance and ahead of both origins.
    fn acquire_pair(
        &self,
        best: &TrackingLine,
        others: &[Candidate],
        cursor: &Point2,
    ) -> Option<(TrackingLine, Point2)> {
        let as_segment = |l: &TrackingLine| Segment2::new(l.origin, l.origin + l.direction);
        others
            .iter()
            .filter_map(|c| {
                let point = as_segment(best).line_intersection(&as_segment(&c.line))?;
                let ahead = best.along(&point) > -TOLERANCE && c.line.along(&point) > -TOLERANCE;
                let dist = (point - cursor).norm();
                (ahead && dist <= self.tolerance).then_some((c.line, point, dist))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(line, point, _)| (line, point))
    }
}
