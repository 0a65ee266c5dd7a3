mod bounding_box;
mod check_vertex;
mod extreme_vertex;
mod is_valid;
mod locate_point;
mod same_cuboid;
mod volume;

pub use bounding_box::{Aabb, BoundingBox};
pub use check_vertex::CheckVertex;
pub use extreme_vertex::{Extreme, ExtremeVertex};
pub use is_valid::IsValid;
pub use locate_point::{LocatePoint, PointLocation};
pub use same_cuboid::SameCuboid;
pub use volume::Volume;
