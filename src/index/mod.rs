mod quadtree;

pub use quadtree::QuadTree;

use std::rc::Rc;

use tracing::debug;

use crate::geometry::{DrawingId, ShapeStore, StoreKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    store: StoreKey,
    drawing: DrawingId,
    include_locked: bool,
}

/// Memoizes the spatial index on the identity of the shape set.
///
/// The tree is rebuilt only when the store has been mutated or the active
/// drawing / lock filter changed; otherwise the previous tree is shared.
#[derive(Debug, Default)]
pub struct IndexCache {
    cached: Option<(CacheKey, Rc<QuadTree>)>,
    rebuilds: usize,
}

impl IndexCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tree for the current shape set, rebuilding it if stale.
    pub fn get(
        &mut self,
        store: &ShapeStore,
        drawing: DrawingId,
        include_locked: bool,
    ) -> Rc<QuadTree> {
        let key = CacheKey {
            store: store.key(),
            drawing,
            include_locked,
        };
        if let Some((cached_key, tree)) = &self.cached {
            if *cached_key == key {
                return Rc::clone(tree);
            }
        }

        let tree = Rc::new(QuadTree::build(store, drawing, include_locked));
        self.rebuilds += 1;
        debug!(
            shapes = tree.len(),
            nodes = tree.node_count(),
            depth = tree.depth(),
            ?drawing,
            "rebuilt spatial index"
        );
        self.cached = Some((key, Rc::clone(&tree)));
        tree
    }

    /// Number of times the tree has been built.
    #[must_use]
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Drops the cached tree.
    pub fn clear(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Shape, ShapeKind};
    use crate::math::Point2;

    fn circle() -> Shape {
        Shape::new(
            ShapeKind::Circle {
                center: Point2::new(0.0, 0.0),
                radius: 5.0,
            },
            DrawingId(1),
        )
    }

    #[test]
    fn rebuilds_only_when_shape_set_changes() {
        let mut store = ShapeStore::new();
        store.insert(circle());
        let mut cache = IndexCache::new();

        let a = cache.get(&store, DrawingId(1), true);
        let b = cache.get(&store, DrawingId(1), true);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.rebuild_count(), 1);

        store.insert(circle());
        let c = cache.get(&store, DrawingId(1), true);
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(c.len(), 2);
        assert_eq!(cache.rebuild_count(), 2);

        cache.get(&store, DrawingId(2), true);
        assert_eq!(cache.rebuild_count(), 3);

        cache.clear();
        cache.get(&store, DrawingId(2), true);
        assert_eq!(cache.rebuild_count(), 4);
    }
}
