use tracing::warn;

use crate::geometry::{Aabb, DrawingId, ShapeId, ShapeStore};

/// Entries a node holds before it splits.
const MAX_ENTRIES: usize = 8;

/// Maximum subdivision depth.
const MAX_DEPTH: usize = 10;

/// Minimum root extent, so a set of coincident points still has area to split.
const MIN_ROOT_EXTENT: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct Entry {
    id: ShapeId,
    bounds: Aabb,
}

#[derive(Debug)]
struct Node {
    bounds: Aabb,
    /// Entries that do not fit entirely inside a single child.
    entries: Vec<Entry>,
    children: Option<Box<[Node; 4]>>,
}

impl Node {
    fn leaf(bounds: Aabb) -> Self {
        Self {
            bounds,
            entries: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, entry: Entry, depth: usize) {
        if let Some(children) = self.children.as_mut() {
            if let Some(child) = children.iter_mut().find(|c| c.bounds.contains(&entry.bounds)) {
                child.insert(entry, depth + 1);
                return;
            }
            self.entries.push(entry);
            return;
        }

        self.entries.push(entry);
        if self.entries.len() > MAX_ENTRIES && depth < MAX_DEPTH {
            self.split(depth);
        }
    }

    fn split(&mut self, depth: usize) {
        let [sw, se, nw, ne] = self.bounds.quadrants();
        self.children = Some(Box::new([
            Node::leaf(sw),
            Node::leaf(se),
            Node::leaf(nw),
            Node::leaf(ne),
        ]));
        for entry in std::mem::take(&mut self.entries) {
            self.insert(entry, depth);
        }
    }

    fn query(&self, area: &Aabb, out: &mut Vec<ShapeId>) {
        if !self.bounds.intersects(area) {
            return;
        }
        out.extend(
            self.entries
                .iter()
                .filter(|e| e.bounds.intersects(area))
                .map(|e| e.id),
        );
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(area, out);
            }
        }
    }

    fn depth(&self) -> usize {
        self.children
            .as_ref()
            .map_or(0, |c| 1 + c.iter().map(Node::depth).max().unwrap_or(0))
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Node::node_count).sum())
    }
}

/// Immutable quad-tree over shape bounding boxes.
///
/// A broad-phase filter: queries may return shapes whose outline is not
/// actually near the query point, but never miss a shape whose bounding box
/// touches the query area. Rebuilt wholesale whenever the shape set changes.
#[derive(Debug)]
pub struct QuadTree {
    root: Option<Node>,
    len: usize,
}

impl QuadTree {
    /// Builds a tree over the visible shapes of `drawing`.
    ///
    /// Malformed shapes are skipped. Locked shapes are skipped unless
    /// `include_locked` is set.
    #[must_use]
    pub fn build(store: &ShapeStore, drawing: DrawingId, include_locked: bool) -> Self {
        let entries: Vec<Entry> = store
            .visible_in(drawing)
            .filter(|(_, shape)| include_locked || !shape.locked)
            .filter_map(|(id, shape)| match shape.validate() {
                Ok(()) => Some(Entry {
                    id,
                    bounds: shape.bounds(),
                }),
                Err(err) => {
                    warn!(?id, %err, "skipping malformed shape");
                    None
                }
            })
            .collect();
        Self::from_entries(entries)
    }

    fn from_entries(entries: Vec<Entry>) -> Self {
        let Some(first) = entries.first() else {
            return Self { root: None, len: 0 };
        };
        let extent = entries
            .iter()
            .skip(1)
            .fold(first.bounds, |acc, e| acc.union(&e.bounds));

        // Square root cell keeps quadrants well-shaped.
        let side = extent.width().max(extent.height()).max(MIN_ROOT_EXTENT);
        let half = side * 0.5 + MIN_ROOT_EXTENT * 0.01;
        let mut root = Node::leaf(Aabb::around(&extent.center(), half));

        let len = entries.len();
        for entry in entries {
            root.insert(entry, 0);
        }
        Self {
            root: Some(root),
            len,
        }
    }

    /// Ids of shapes whose bounding box intersects the square of half-width
    /// `tolerance` centered at `point`.
    #[must_use]
    pub fn query_point(&self, point: &crate::math::Point2, tolerance: f64) -> Vec<ShapeId> {
        self.query_rect(&Aabb::around(point, tolerance.max(0.0)))
    }

    /// Ids of shapes whose bounding box intersects `area`.
    #[must_use]
    pub fn query_rect(&self, area: &Aabb) -> Vec<ShapeId> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            root.query(area, &mut out);
        }
        out
    }

    /// Number of indexed shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Depth of the deepest subdivision (`0` for a single leaf).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Node::depth)
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.as_ref().map_or(0, Node::node_count)
    }
}
