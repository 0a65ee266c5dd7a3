use crate::error::Result;
use crate::math::Point3;
use crate::topology::{CuboidId, VertexId, VertexStore};

/// Which end of the corner scan to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extreme {
    Min,
    Max,
}

/// Finds the "extreme" corner of a cuboid used by the zoning layer.
///
/// Corners are scanned in order and a corner replaces the running pick if
/// it exceeds (for [`Extreme::Max`]) or undercuts (for [`Extreme::Min`])
/// the pick on any single axis. This is not necessarily the per-axis
/// bounding corner; use [`BoundingBox`](super::BoundingBox) for that.
pub struct ExtremeVertex {
    cuboid: CuboidId,
    extreme: Extreme,
}

impl ExtremeVertex {
    /// Creates a query for the maximum corner.
    #[must_use]
    pub fn max(cuboid: CuboidId) -> Self {
        Self {
            cuboid,
            extreme: Extreme::Max,
        }
    }

    /// Creates a query for the minimum corner.
    #[must_use]
    pub fn min(cuboid: CuboidId) -> Self {
        Self {
            cuboid,
            extreme: Extreme::Min,
        }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the cuboid or its corners are not found.
    pub fn execute(&self, store: &VertexStore) -> Result<VertexId> {
        let corners = store.cuboid(self.cuboid)?.vertices();
        let mut points = Vec::with_capacity(corners.len());
        for &corner in corners {
            points.push(store.point(corner)?);
        }
        Ok(corners[pick_extreme(&points, self.extreme)])
    }
}

/// Index of the corner kept by the any-axis scan. `points` must be non-empty.
fn pick_extreme(points: &[Point3], extreme: Extreme) -> usize {
    let mut best = 0;
    for (i, point) in points.iter().enumerate().skip(1) {
        let current = &points[best];
        let replaces = (0..3).any(|axis| match extreme {
            Extreme::Max => point[axis] > current[axis],
            Extreme::Min => point[axis] < current[axis],
        });
        if replaces {
            best = i;
        }
    }
    best
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeCuboid;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn unit_cuboid_extremes() {
        let mut store = VertexStore::new();
        let cuboid = MakeCuboid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let max = ExtremeVertex::max(cuboid).execute(&store).unwrap();
        let min = ExtremeVertex::min(cuboid).execute(&store).unwrap();
        assert_eq!(store.point(max).unwrap(), p(1.0, 1.0, 1.0));
        assert_eq!(store.point(min).unwrap(), p(0.0, 0.0, 0.0));
    }

    #[test]
    fn any_axis_scan_keeps_last_improvement() {
        // (0, 1, 0) only beats (1, 0, 0) along y but still replaces it.
        let points = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert_eq!(pick_extreme(&points, Extreme::Max), 2);

        let points = [p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0), p(1.0, 0.0, 1.0)];
        assert_eq!(pick_extreme(&points, Extreme::Min), 2);
    }
}
