pub mod orthogonality;
pub mod projection;
pub mod tolerance;

pub use orthogonality::{is_parallel, is_perpendicular};
pub use projection::{closest_point_on_plane, closest_point_on_segment, SegmentProjection};
pub use tolerance::Tolerance;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Threshold below which a vector is treated as zero-length.
pub const TOLERANCE: f64 = 1e-10;
