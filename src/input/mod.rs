mod coordinate;

pub use coordinate::parse;

use tracing::trace;

use crate::math::{from_polar, vector_angle, Point2, TOLERANCE};

/// A successfully parsed line of coordinate text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedCoordinate {
    /// The resolved point. For a direct distance this is the reference point
    /// the distance is measured from.
    pub point: Point2,
    /// Magnitude typed as a bare number.
    pub distance: Option<f64>,
    /// `true` when the caller must supply a direction.
    pub is_direct_distance: bool,
}

impl ParsedCoordinate {
    fn at(point: Point2) -> Self {
        Self {
            point,
            distance: None,
            is_direct_distance: false,
        }
    }

    /// Final world point, placing a direct distance along `angle` (radians).
    #[must_use]
    pub fn place(&self, angle: f64) -> Point2 {
        match self.distance {
            Some(distance) if self.is_direct_distance => {
                apply_direct_distance(&self.point, distance, angle)
            }
            _ => self.point,
        }
    }
}

/// Parses coordinate text relative to `reference`.
///
/// Returns `None` for anything that is not a coordinate; callers treat such
/// text as a command instead.
#[must_use]
pub fn parse_coordinate_input(text: &str, reference: Option<&Point2>) -> Option<ParsedCoordinate> {
    match parse(text, reference) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            trace!(%err, "not a coordinate");
            None
        }
    }
}

/// Places a point `distance` away from `base` along `angle` (radians).
#[must_use]
pub fn apply_direct_distance(base: &Point2, distance: f64, angle: f64) -> Point2 {
    from_polar(distance, angle, base)
}

/// Direction used for direct distance entry: the active tracking ray if any,
/// otherwise the bearing from `base` to the cursor.
#[must_use]
pub fn direct_distance_angle(tracking_angle: Option<f64>, base: &Point2, cursor: &Point2) -> Option<f64> {
    tracking_angle.or_else(|| {
        let v = cursor - base;
        (v.norm() > TOLERANCE).then(|| vector_angle(&v))
    })
}
