mod tracker;

pub use tracker::AlignmentTracker;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive as positive, SettingsError};
use crate::math::{normalize_angle, Point2, Vector2, TOLERANCE};

/// Kind of construction ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingType {
    Polar,
    Parallel,
    Perpendicular,
    Extension,
}

/// A construction ray.
///
/// `direction` is always a unit vector and `angle` its bearing in `(-π, π]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingLine {
    pub origin: Point2,
    pub direction: Vector2,
    pub angle: f64,
    pub tracking_type: TrackingType,
}

impl TrackingLine {
    /// Creates a ray from `origin` along `angle` (radians).
    #[must_use]
    pub fn new(origin: Point2, angle: f64, tracking_type: TrackingType) -> Self {
        let angle = normalize_angle(angle);
        Self {
            origin,
            direction: Vector2::new(angle.cos(), angle.sin()),
            angle,
            tracking_type,
        }
    }

    /// Signed distance of the projection of `p` along the ray.
    #[must_use]
    pub fn along(&self, p: &Point2) -> f64 {
        (p - self.origin).dot(&self.direction)
    }

    /// Perpendicular distance from `p` to the ray's supporting line.
    #[must_use]
    pub fn offset(&self, p: &Point2) -> f64 {
        crate::math::cross(&self.direction, &(p - self.origin)).abs()
    }

    /// Projection of `p` onto the supporting line.
    #[must_use]
    pub fn project(&self, p: &Point2) -> Point2 {
        self.origin + self.direction * self.along(p)
    }

    /// Point at `distance` along the ray.
    #[must_use]
    pub fn point_at(&self, distance: f64) -> Point2 {
        self.origin + self.direction * distance
    }

    /// Returns `true` if both rays lie on the same line with the same heading.
    #[must_use]
    pub fn coincides_with(&self, other: &TrackingLine) -> bool {
        crate::math::angle_between(self.angle, other.angle) < 1e-9
            && self.offset(&other.origin) < TOLERANCE.sqrt()
    }
}

/// Outcome of a tracking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingResult {
    /// Cursor position aligned to the active ray(s).
    pub point: Point2,
    /// Active rays: one, or two for an intersection acquisition.
    pub lines: Vec<TrackingLine>,
    /// Bearing of the first active ray, for direct distance entry.
    pub angle: f64,
}

/// Alignment tracking configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSettings {
    /// Master tracking toggle.
    pub enabled: bool,
    /// Polar tracking at multiples of `polar_increment_deg`.
    pub polar: bool,
    pub polar_increment_deg: f64,
    /// Ortho mode pins the polar increment to 90°, overriding a custom one.
    pub ortho: bool,
    /// Parallel, perpendicular and extension rays from existing geometry.
    pub object_tracking: bool,
    /// Capture distance from a ray, in screen pixels.
    pub tolerance_px: f64,
    /// Capture angle for parallel and perpendicular rays, in degrees.
    pub angle_tolerance_deg: f64,
    /// Radius around the cursor searched for reference geometry, in pixels.
    pub search_radius_px: f64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            polar: true,
            polar_increment_deg: 45.0,
            ortho: false,
            object_tracking: true,
            tolerance_px: 8.0,
            angle_tolerance_deg: 3.0,
            search_radius_px: 200.0,
        }
    }
}

impl TrackingSettings {
    /// Polar increment actually in effect, in degrees.
    #[must_use]
    pub fn effective_increment_deg(&self) -> f64 {
        if self.ortho {
            90.0
        } else {
            self.polar_increment_deg
        }
    }

    /// Checks numeric fields.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotPositive`] for non-positive tolerances or
    /// increment, and [`SettingsError::UnevenIncrement`] when the increment
    /// does not divide a full turn.
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("polar_increment_deg", self.polar_increment_deg)?;
        positive("tolerance_px", self.tolerance_px)?;
        positive("angle_tolerance_deg", self.angle_tolerance_deg)?;
        positive("search_radius_px", self.search_radius_px)?;
        let steps = 360.0 / self.polar_increment_deg;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(SettingsError::UnevenIncrement(self.polar_increment_deg));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn tracking_line_direction_is_unit() {
        for angle in [0.0, 0.3, -2.0, PI, 7.5] {
            let line = TrackingLine::new(Point2::origin(), angle, TrackingType::Polar);
            assert_relative_eq!(line.direction.norm(), 1.0, epsilon = 1e-12);
            assert!(line.angle > -PI && line.angle <= PI);
        }
    }

    #[test]
    fn projection_and_offset() {
        let line = TrackingLine::new(Point2::new(1.0, 1.0), 0.0, TrackingType::Extension);
        let p = Point2::new(5.0, 3.0);
        assert_relative_eq!(line.along(&p), 4.0);
        assert_relative_eq!(line.offset(&p), 2.0);
        assert_eq!(line.project(&p), Point2::new(5.0, 1.0));
    }

    #[test]
    fn ortho_overrides_custom_increment() {
        let settings = TrackingSettings {
            polar_increment_deg: 15.0,
            ortho: true,
            ..TrackingSettings::default()
        };
        assert_relative_eq!(settings.effective_increment_deg(), 90.0);
    }

    #[test]
    fn validate_rejects_uneven_increment() {
        let settings = TrackingSettings {
            polar_increment_deg: 50.0,
            ..TrackingSettings::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::UnevenIncrement(50.0)));
        assert!(TrackingSettings::default().validate().is_ok());
    }

    #[test]
    fn settings_deserialize_partial_json() {
        let s: TrackingSettings = serde_json::from_str(r#"{"ortho":true}"#).unwrap();
        assert!(s.ortho);
        assert!(s.polar);
        assert_relative_eq!(s.polar_increment_deg, 45.0);
    }
}
