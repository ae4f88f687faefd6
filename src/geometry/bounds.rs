use crate::math::Point2;

/// An axis-aligned bounding box.
///
/// Boxes may have zero width or height (points, axis-aligned lines); all
/// comparisons are inclusive so such boxes still intersect queries that touch them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point2,
    /// Maximum corner of the bounding box.
    pub max: Point2,
}

impl Aabb {
    /// Creates a box from two arbitrary corners.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Square box of half-width `half` centered at `center`.
    #[must_use]
    pub fn around(center: &Point2, half: f64) -> Self {
        Self {
            min: Point2::new(center.x - half, center.y - half),
            max: Point2::new(center.x + half, center.y + half),
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.including(p)))
    }

    /// Returns a copy grown to include `p`.
    #[must_use]
    pub fn including(&self, p: &Point2) -> Self {
        Self {
            min: Point2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Self {
        self.including(&other.min).including(&other.max)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Inclusive overlap test.
    #[must_use]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Splits the box into four equal quadrants: SW, SE, NW, NE.
    #[must_use]
    pub fn quadrants(&self) -> [Aabb; 4] {
        let c = self.center();
        [
            Aabb::new(self.min, c),
            Aabb::new(Point2::new(c.x, self.min.y), Point2::new(self.max.x, c.y)),
            Aabb::new(Point2::new(self.min.x, c.y), Point2::new(c.x, self.max.y)),
            Aabb::new(c, self.max),
        ]
    }
}
