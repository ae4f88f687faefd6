mod detector;

pub use detector::SnapDetector;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive as positive, SettingsError};
use crate::geometry::ShapeId;
use crate::math::Point2;

/// Distance difference under which two candidates count as tied.
pub const TIE_EPSILON: f64 = 1e-6;

/// Kinds of object snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapType {
    Endpoint,
    Midpoint,
    Center,
    Intersection,
    Perpendicular,
    Tangent,
    Nearest,
    Grid,
}

impl SnapType {
    /// Tie-break order, most authoritative first.
    pub const PRIORITY: [SnapType; 8] = [
        SnapType::Endpoint,
        SnapType::Center,
        SnapType::Midpoint,
        SnapType::Intersection,
        SnapType::Perpendicular,
        SnapType::Tangent,
        SnapType::Nearest,
        SnapType::Grid,
    ];

    /// Position in [`SnapType::PRIORITY`]; lower wins ties.
    #[must_use]
    pub fn rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|t| *t == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    /// Short marker label, as shown next to the snap glyph.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SnapType::Endpoint => "END",
            SnapType::Midpoint => "MID",
            SnapType::Center => "CEN",
            SnapType::Intersection => "INT",
            SnapType::Perpendicular => "PER",
            SnapType::Tangent => "TAN",
            SnapType::Nearest => "NEA",
            SnapType::Grid => "GRD",
        }
    }
}

/// A snap candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPoint {
    /// The snapped world position.
    pub point: Point2,
    pub snap_type: SnapType,
    /// Shape the point was derived from; `None` for grid and in-progress points.
    pub source: Option<ShapeId>,
    /// Distance from the query point.
    pub distance: f64,
}

impl SnapPoint {
    #[must_use]
    pub fn new(point: Point2, snap_type: SnapType, source: Option<ShapeId>, query: &Point2) -> Self {
        Self {
            point,
            snap_type,
            source,
            distance: crate::math::distance(query, &point),
        }
    }

    /// Picks the winning candidate.
    ///
    /// Every candidate within [`TIE_EPSILON`] of the smallest distance is
    /// tied; among those the lowest [`SnapType::rank`] wins, then the smaller
    /// distance. The result does not depend on input order.
    #[must_use]
    pub fn best<I>(candidates: I) -> Option<SnapPoint>
    where
        I: IntoIterator<Item = SnapPoint>,
    {
        let candidates: Vec<SnapPoint> = candidates.into_iter().collect();
        let nearest = candidates
            .iter()
            .map(|c| c.distance)
            .min_by(f64::total_cmp)?;
        candidates
            .into_iter()
            .filter(|c| c.distance - nearest <= TIE_EPSILON)
            .min_by(|a, b| {
                a.snap_type
                    .rank()
                    .cmp(&b.snap_type.rank())
                    .then(a.distance.total_cmp(&b.distance))
            })
    }
}

/// Object snap configuration.
///
/// An immutable value owned by the editor and passed into every resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    /// Master object-snap toggle.
    pub enabled: bool,
    /// Snap kinds that may produce candidates.
    pub types: BTreeSet<SnapType>,
    /// Capture radius in screen pixels.
    pub tolerance_px: f64,
    /// Nominal grid spacing in world units.
    pub grid_size: f64,
    /// Whether locked shapes still produce snaps.
    pub snap_to_locked: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            types: [
                SnapType::Endpoint,
                SnapType::Midpoint,
                SnapType::Center,
                SnapType::Intersection,
                SnapType::Perpendicular,
                SnapType::Tangent,
                SnapType::Nearest,
            ]
            .into_iter()
            .collect(),
            tolerance_px: 10.0,
            grid_size: 10.0,
            snap_to_locked: true,
        }
    }
}

impl SnapSettings {
    /// Settings with only the given snap kinds enabled.
    #[must_use]
    pub fn only(types: &[SnapType]) -> Self {
        Self {
            types: types.iter().copied().collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_enabled(&self, snap_type: SnapType) -> bool {
        self.enabled && self.types.contains(&snap_type)
    }

    /// Checks numeric fields.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotPositive`] for a non-positive or non-finite
    /// tolerance or grid size.
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("tolerance_px", self.tolerance_px)?;
        positive("grid_size", self.grid_size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn priority_list_is_complete_and_ordered() {
        assert_eq!(SnapType::Endpoint.rank(), 0);
        assert!(SnapType::Center.rank() < SnapType::Midpoint.rank());
        assert!(SnapType::Nearest.rank() < SnapType::Grid.rank());
        let mut ranks: Vec<_> = SnapType::PRIORITY.iter().map(|t| t.rank()).collect();
        ranks.dedup();
        assert_eq!(ranks.len(), 8);
    }

    #[test]
    fn best_breaks_ties_by_priority() {
        let q = Point2::origin();
        let mid = SnapPoint::new(Point2::new(1.0, 0.0), SnapType::Midpoint, None, &q);
        let end = SnapPoint::new(Point2::new(0.0, 1.0 + 1e-7), SnapType::Endpoint, None, &q);
        assert_eq!(SnapPoint::best([mid, end]).unwrap().snap_type, SnapType::Endpoint);

        let far_end = SnapPoint::new(Point2::new(0.0, 1.1), SnapType::Endpoint, None, &q);
        assert_eq!(SnapPoint::best([far_end, mid]).unwrap().snap_type, SnapType::Midpoint);
        assert!(SnapPoint::best(Vec::<SnapPoint>::new()).is_none());
    }

    #[test]
    fn best_is_independent_of_candidate_order() {
        // Endpoint and nearest are each within the tie band of midpoint but
        // not of each other. The band is measured from the nearest candidate,
        // so endpoint is out and midpoint outranks nearest.
        let q = Point2::origin();
        let end = SnapPoint::new(Point2::new(2.0 + 0.9e-6, 0.0), SnapType::Endpoint, None, &q);
        let mid = SnapPoint::new(Point2::new(2.0, 0.0), SnapType::Midpoint, None, &q);
        let near = SnapPoint::new(Point2::new(2.0 - 0.9e-6, 0.0), SnapType::Nearest, None, &q);

        let forward = SnapPoint::best([end, mid, near]).unwrap();
        let reversed = SnapPoint::best([near, mid, end]).unwrap();
        let rotated = SnapPoint::best([mid, near, end]).unwrap();
        assert_eq!(forward.snap_type, SnapType::Midpoint);
        assert_eq!(reversed, forward);
        assert_eq!(rotated, forward);
    }

    #[test]
    fn settings_roundtrip_through_json_with_defaults() {
        let parsed: SnapSettings =
            serde_json::from_str(r#"{"types":["grid","endpoint"],"tolerance_px":6.0}"#).unwrap();
        assert!(parsed.is_enabled(SnapType::Grid));
        assert!(!parsed.is_enabled(SnapType::Midpoint));
        assert_eq!(parsed.grid_size, 10.0);
        assert!(parsed.validate().is_ok());

        let bad = SnapSettings {
            grid_size: 0.0,
            ..SnapSettings::default()
        };
        assert_eq!(
            bad.validate(),
            Err(SettingsError::NotPositive {
                name: "grid_size",
                value: 0.0
            })
        );
    }

    #[test]
    fn master_toggle_disables_everything() {
        let settings = SnapSettings {
            enabled: false,
            ..SnapSettings::default()
        };
        assert!(!settings.is_enabled(SnapType::Endpoint));
    }
}
