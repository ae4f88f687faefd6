use super::arc_2d::CircularArc;
use super::{Point2, Segment2, TOLERANCE};

/// Intersection of a line segment with a circular arc.
///
/// Returns the crossing points that lie on both the segment and the arc's
/// angular range. A tangent contact yields a single point.
#[must_use]
pub fn segment_arc_intersect_2d(segment: &Segment2, arc: &CircularArc) -> Vec<Point2> {
    let mut results = Vec::new();
    if arc.is_degenerate() || segment.is_degenerate() {
        return results;
    }

    // Substitute the parametric segment into the circle equation:
    // |start + t*d - c|² = r²
    let d = segment.delta();
    let f = segment.start - arc.center;
    let a = d.norm_squared();
    let b = 2.0 * f.dot(&d);
    let c = f.norm_squared() - arc.radius * arc.radius;
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < -TOLERANCE {
        return results;
    }
    let disc_sqrt = discriminant.max(0.0).sqrt();

    let roots = if disc_sqrt < TOLERANCE * 100.0 {
        vec![-b / (2.0 * a)]
    } else {
        vec![(-b - disc_sqrt) / (2.0 * a), (-b + disc_sqrt) / (2.0 * a)]
    };

    let eps = TOLERANCE;
    for t in roots {
        if t < -eps || t > 1.0 + eps {
            continue;
        }
        let p = segment.start + d * t.clamp(0.0, 1.0);
        let angle = (p.y - arc.center.y).atan2(p.x - arc.center.x);
        if arc.contains_angle(angle) {
            results.push(p);
        }
    }

    results
}

/// Intersection of two circular arcs.
///
/// Concentric arcs never intersect (coincident circles have no isolated
/// crossing points).
#[must_use]
pub fn arc_arc_intersect_2d(a: &CircularArc, b: &CircularArc) -> Vec<Point2> {
    let mut results = Vec::new();
    if a.is_degenerate() || b.is_degenerate() {
        return results;
    }

    let delta = b.center - a.center;
    let dist_sq = delta.norm_squared();
    let dist = dist_sq.sqrt();
    if dist < TOLERANCE {
        return results;
    }

    let (r1, r2) = (a.radius, b.radius);
    if dist > r1 + r2 + TOLERANCE || dist < (r1 - r2).abs() - TOLERANCE {
        return results;
    }

    // Distance from a's center along the center line to the radical line.
    let along = (r1 * r1 - r2 * r2 + dist_sq) / (2.0 * dist);
    let h_sq = r1 * r1 - along * along;
    if h_sq < -TOLERANCE {
        return results;
    }
    let h = h_sq.max(0.0).sqrt();

    let axis = delta / dist;
    let mid = a.center + axis * along;
    let perp = nalgebra::Vector2::new(-axis.y, axis.x);

    let candidates = if h < TOLERANCE {
        vec![mid]
    } else {
        vec![mid + perp * h, mid - perp * h]
    };

    for p in candidates {
        let angle_a = (p.y - a.center.y).atan2(p.x - a.center.x);
        let angle_b = (p.y - b.center.y).atan2(p.x - b.center.x);
        if a.contains_angle(angle_a) && b.contains_angle(angle_b) {
            results.push(p);
        }
    }

    results
}
