use crate::error::Result;
use crate::math::Point3;
use crate::topology::{CuboidId, VertexStore};

/// Number of corners sampled by the sign test.
const SAMPLED_CORNERS: usize = 5;

/// Tests whether a point lies inside or on the boundary of a cuboid.
///
/// A point coinciding with a corner is reported as outside. Otherwise the
/// sign of `point - corner` is taken per axis against the first five
/// corners only; the point is inside unless some axis has all five signs
/// strictly positive or all strictly negative. With the corner order the
/// store assigns (reference face loop first, then the opposite face) the
/// five samples cover both extremes of every axis.
pub struct CheckVertex {
    cuboid: CuboidId,
    point: Point3,
}

impl CheckVertex {
    /// Creates a new `CheckVertex` query.
    #[must_use]
    pub fn new(cuboid: CuboidId, point: Point3) -> Self {
        Self { cuboid, point }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the cuboid or its corners are not found.
    pub fn execute(&self, store: &VertexStore) -> Result<bool> {
        let data = store.cuboid(self.cuboid)?;
        let linear = store.tolerance().linear;

        for &corner in data.vertices() {
            if (store.point(corner)? - self.point).norm() <= linear {
                return Ok(false);
            }
        }

        let mut all_positive = [true; 3];
        let mut all_negative = [true; 3];
        for &corner in &data.vertices()[..SAMPLED_CORNERS] {
            let offset = self.point - store.point(corner)?;
            for axis in 0..3 {
                all_positive[axis] &= offset[axis] > linear;
                all_negative[axis] &= offset[axis] < -linear;
            }
        }
        Ok((0..3).all(|axis| !all_positive[axis] && !all_negative[axis]))
    }
}
