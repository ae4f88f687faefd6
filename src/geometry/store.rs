use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::SlotMap;

use super::{DrawingId, Shape};
use crate::error::StoreError;

slotmap::new_key_type! {
    /// Unique identifier for a shape in a [`ShapeStore`].
    pub struct ShapeId;
}

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a particular state of a [`ShapeStore`].
///
/// Two equal keys always describe the same shape set; any mutation yields a
/// new key. Used to memoize derived structures such as the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreKey {
    store: u64,
    revision: u64,
}

/// Arena owning all shapes of a document.
///
/// Owned and mutated by the editor; the resolution pipeline only reads it.
#[derive(Debug)]
pub struct ShapeStore {
    shapes: SlotMap<ShapeId, Shape>,
    id: u64,
    revision: u64,
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self {
            shapes: SlotMap::with_key(),
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
            revision: 0,
        }
    }
}

impl ShapeStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a shape and returns its ID.
    pub fn insert(&mut self, shape: Shape) -> ShapeId {
        self.revision += 1;
        self.shapes.insert(shape)
    }

    /// Removes a shape, returning it if present.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let removed = self.shapes.remove(id);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    /// Returns a reference to the shape, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShapeNotFound`] if the id is stale.
    pub fn shape(&self, id: ShapeId) -> Result<&Shape, StoreError> {
        self.shapes.get(id).ok_or(StoreError::ShapeNotFound)
    }

    /// Returns a mutable reference to the shape, or an error if not found.
    ///
    /// Counts as a mutation even if the caller leaves the shape unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShapeNotFound`] if the id is stale.
    pub fn shape_mut(&mut self, id: ShapeId) -> Result<&mut Shape, StoreError> {
        let shape = self.shapes.get_mut(id).ok_or(StoreError::ShapeNotFound)?;
        self.revision += 1;
        Ok(shape)
    }

    /// Returns the shape if present.
    #[must_use]
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Iterates over all shapes.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes.iter()
    }

    /// Iterates over the visible shapes of one drawing.
    pub fn visible_in(&self, drawing: DrawingId) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.shapes
            .iter()
            .filter(move |(_, s)| s.visible && s.drawing == drawing)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Current identity of the shape set.
    #[must_use]
    pub fn key(&self) -> StoreKey {
        StoreKey {
            store: self.id,
            revision: self.revision,
        }
    }
}
