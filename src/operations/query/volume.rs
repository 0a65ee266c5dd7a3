use crate::error::{GeometryError, Result};
use crate::math::is_parallel;
use crate::topology::{CuboidId, VertexStore};

/// Computes the volume of a cuboid.
///
/// Takes the direction of edge 0, finds the face whose normal is parallel
/// to it, and returns that face's area times the edge's length.
pub struct Volume {
    cuboid: CuboidId,
}

impl Volume {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(cuboid: CuboidId) -> Self {
        Self { cuboid }
    }

    /// Executes the query, returning the volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the cuboid is not found, or no face is
    /// perpendicular to its reference edge.
    pub fn execute(&self, store: &VertexStore) -> Result<f64> {
        let data = store.cuboid(self.cuboid)?;
        let edge = store.line_vector(data.lines()[0])?;
        let angular = store.tolerance().angular;
        for &face in data.rectangles() {
            let face = store.rectangle(face)?;
            if is_parallel(face.normal(), &edge, angular) {
                return Ok(face.area() * edge.norm());
            }
        }
        Err(GeometryError::InvalidInputGeometry(
            "no face is perpendicular to the reference edge".into(),
        )
        .into())
    }
}
