use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::math::{Point2, Vector2};

/// Smallest on-screen grid spacing before the step is coarsened.
pub const MIN_GRID_PX: f64 = 10.0;
/// Largest on-screen grid spacing before the step is refined.
pub const MAX_GRID_PX: f64 = 100.0;

/// World-to-screen transform: `screen = world * zoom + offset`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Screen pixels per world unit.
    pub zoom: f64,
    /// Screen position of the world origin, in pixels.
    pub offset: Vector2,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vector2::zeros(),
        }
    }
}

impl Viewport {
    #[must_use]
    pub fn new(zoom: f64, offset: Vector2) -> Self {
        Self { zoom, offset }
    }

    /// Converts a length in screen pixels to world units.
    #[must_use]
    pub fn world_tolerance(&self, px: f64) -> f64 {
        px / self.zoom
    }

    #[must_use]
    pub fn screen_to_world(&self, screen: &Point2) -> Point2 {
        Point2::from((screen.coords - self.offset) / self.zoom)
    }

    #[must_use]
    pub fn world_to_screen(&self, world: &Point2) -> Point2 {
        Point2::from(world.coords * self.zoom + self.offset)
    }

    /// Grid step in world units, scaled by powers of ten so the grid stays
    /// between [`MIN_GRID_PX`] and [`MAX_GRID_PX`] on screen.
    ///
    /// Returns `grid_size` unchanged if either it or the zoom is unusable.
    #[must_use]
    pub fn effective_grid_step(&self, grid_size: f64) -> f64 {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !usable(grid_size) || !usable(self.zoom) {
            return grid_size;
        }
        let mut step = grid_size;
        // f64 spans ~600 decades, so these loops are bounded.
        while step * self.zoom < MIN_GRID_PX && step.is_finite() {
            step *= 10.0;
        }
        while step * self.zoom > MAX_GRID_PX && step > f64::MIN_POSITIVE {
            step /= 10.0;
        }
        step
    }

    /// Checks the zoom factor.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidZoom`] for a zero, negative or
    /// non-finite zoom.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.zoom.is_finite() && self.zoom > 0.0 {
            Ok(())
        } else {
            Err(SettingsError::InvalidZoom(self.zoom))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn grid_step_stays_in_band() {
        let grid = 10.0;
        assert_relative_eq!(Viewport::default().effective_grid_step(grid), 10.0);
        assert_relative_eq!(Viewport::new(0.1, Vector2::zeros()).effective_grid_step(grid), 100.0);
        assert_relative_eq!(Viewport::new(0.05, Vector2::zeros()).effective_grid_step(grid), 1000.0);
        assert_relative_eq!(Viewport::new(20.0, Vector2::zeros()).effective_grid_step(grid), 1.0);

        for zoom in [0.003, 0.27, 1.0, 4.5, 80.0, 1500.0] {
            let view = Viewport::new(zoom, Vector2::zeros());
            let px = view.effective_grid_step(grid) * zoom;
            assert!((MIN_GRID_PX - 1e-9..=MAX_GRID_PX + 1e-9).contains(&px), "zoom {zoom}: {px}px");
        }
    }

    #[test]
    fn tolerance_scales_with_zoom() {
        let view = Viewport::new(4.0, Vector2::new(20.0, -5.0));
        assert_relative_eq!(view.world_tolerance(10.0), 2.5);
        let world = Point2::new(3.0, 7.0);
        let back = view.screen_to_world(&view.world_to_screen(&world));
        assert_relative_eq!(back.x, world.x);
        assert_relative_eq!(back.y, world.y);
    }

    #[test]
    fn zoom_must_be_positive() {
        assert_eq!(
            Viewport::new(0.0, Vector2::zeros()).validate(),
            Err(SettingsError::InvalidZoom(0.0))
        );
        assert!(Viewport::new(f64::NAN, Vector2::zeros()).validate().is_err());
        assert!(Viewport::default().validate().is_ok());
    }
}
