use crate::error::Result;
use crate::math::Point3;
use crate::topology::{CuboidId, VertexStore};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Returns `true` if `point` lies inside or within `linear` of the box.
    #[must_use]
    pub fn contains(&self, point: &Point3, linear: f64) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] - linear && point[i] <= self.max[i] + linear)
    }
}

/// Computes the per-axis bounding box of a cuboid's corners.
pub struct BoundingBox {
    cuboid: CuboidId,
}

impl BoundingBox {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(cuboid: CuboidId) -> Self {
        Self { cuboid }
    }

    /// Executes the query, returning the AABB.
    ///
    /// # Errors
    ///
    /// Returns an error if the cuboid or its corners are not found.
    pub fn execute(&self, store: &VertexStore) -> Result<Aabb> {
        let corners = store.cuboid(self.cuboid)?.vertices();
        let first = store.point(corners[0])?;
        let mut aabb = Aabb {
            min: first,
            max: first,
        };
        for &corner in &corners[1..] {
            let point = store.point(corner)?;
            aabb.min = aabb.min.inf(&point);
            aabb.max = aabb.max.sup(&point);
        }
        Ok(aabb)
    }
}
