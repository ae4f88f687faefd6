pub mod bounds;
pub mod shape;
pub mod store;

pub use bounds::Aabb;
pub use shape::{DrawingId, Shape, ShapeKind};
pub use store::{ShapeId, ShapeStore, StoreKey};
