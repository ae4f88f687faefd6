use std::f64::consts::TAU;

use super::{Point2, Segment2, Vector2};

/// Number of uniform samples taken before refining an ellipse projection.
const ELLIPSE_SAMPLES: u32 = 64;

/// Refinement iterations of the ellipse parameter search.
const ELLIPSE_REFINE_STEPS: u32 = 40;

/// Evaluates a rotated ellipse at parameter `t`.
///
/// `P(t) = center + R(rotation) * (a cos t, b sin t)`
#[must_use]
pub fn ellipse_point_at(center: &Point2, a: f64, b: f64, rotation: f64, t: f64) -> Point2 {
    let (sin_r, cos_r) = rotation.sin_cos();
    let lx = a * t.cos();
    let ly = b * t.sin();
    Point2::new(
        center.x + lx * cos_r - ly * sin_r,
        center.y + lx * sin_r + ly * cos_r,
    )
}

/// Closest point on a rotated ellipse outline to `point`.
///
/// Coarse uniform sampling picks the bracket, then a golden-section search
/// refines the parameter within it.
#[must_use]
pub fn closest_point_on_ellipse(
    center: &Point2,
    a: f64,
    b: f64,
    rotation: f64,
    point: &Point2,
) -> Point2 {
    let dist_sq = |t: f64| (ellipse_point_at(center, a, b, rotation, t) - point).norm_squared();

    let step = TAU / f64::from(ELLIPSE_SAMPLES);
    let mut best_t = 0.0;
    let mut best_d = f64::INFINITY;
    for i in 0..ELLIPSE_SAMPLES {
        let t = f64::from(i) * step;
        let d = dist_sq(t);
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }

    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let (mut lo, mut hi) = (best_t - step, best_t + step);
    for _ in 0..ELLIPSE_REFINE_STEPS {
        let m1 = hi - ratio * (hi - lo);
        let m2 = lo + ratio * (hi - lo);
        if dist_sq(m1) < dist_sq(m2) {
            hi = m2;
        } else {
            lo = m1;
        }
    }
    ellipse_point_at(center, a, b, rotation, (lo + hi) * 0.5)
}

/// Closest point on a chain of segments, or `None` for an empty chain.
#[must_use]
pub fn closest_point_on_segments(segments: &[Segment2], point: &Point2) -> Option<Point2> {
    segments
        .iter()
        .map(|s| s.closest_point_on_segment(point))
        .min_by(|p, q| (p - point).norm_squared().total_cmp(&(q - point).norm_squared()))
}

/// Returns the four corners of a rectangle of `width` around the centerline
/// `segment`, in outline order.
#[must_use]
pub fn thick_segment_corners(segment: &Segment2, width: f64) -> [Point2; 4] {
    let half: Vector2 = segment.perpendicular_direction() * (width * 0.5);
    [
        segment.start + half,
        segment.end + half,
        segment.end - half,
        segment.start - half,
    ]
}
