pub mod error;
pub mod geometry;
pub mod index;
pub mod input;
pub mod math;
pub mod resolve;
pub mod snap;
pub mod tracking;

pub use error::{DraftsnapError, Result};
pub use input::parse_coordinate_input;
pub use resolve::{PointResolver, ResolveRequest, ResolveSettings, ResolvedPoint, Viewport};
