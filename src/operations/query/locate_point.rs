use crate::error::Result;
use crate::math::{closest_point_on_plane, closest_point_on_segment, Point3};
use crate::topology::{CuboidId, LineId, RectangleId, VertexStore};

/// Where a point sits relative to a cuboid's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    /// On this edge segment.
    Edge(LineId),
    /// On this face, off its edges.
    Face(RectangleId),
    /// Neither; the point is not checked against the cuboid's extent.
    Interior,
}

/// Locates a point on a cuboid's edges or faces.
///
/// Faces are scanned in order and, for each face, its four edges; the first
/// edge containing the point wins. Only if no edge matches are the faces
/// scanned again for one containing the point.
pub struct LocatePoint {
    cuboid: CuboidId,
    point: Point3,
}

impl LocatePoint {
    /// Creates a new `LocatePoint` query.
    #[must_use]
    pub fn new(cuboid: CuboidId, point: Point3) -> Self {
        Self { cuboid, point }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the cuboid or any of its entities are not found.
    pub fn execute(&self, store: &VertexStore) -> Result<PointLocation> {
        let data = store.cuboid(self.cuboid)?;
        let linear = store.tolerance().linear;

        for &face in data.rectangles() {
            for line in store.rectangle(face)?.lines() {
                let [a, b] = store.line(line)?.vertices();
                let projection =
                    closest_point_on_segment(&store.point(a)?, &store.point(b)?, &self.point);
                if projection.is_some_and(|p| p.on_segment(linear)) {
                    return Ok(PointLocation::Edge(line));
                }
            }
        }

        for &face in data.rectangles() {
            if self.on_face(store, face, linear)? {
                return Ok(PointLocation::Face(face));
            }
        }
        Ok(PointLocation::Interior)
    }

    fn on_face(&self, store: &VertexStore, face: RectangleId, linear: f64) -> Result<bool> {
        let rect = store.rectangle(face)?;
        let [c0, c1, _, c3] = rect.vertices();
        let origin = store.point(c0)?;
        let foot = closest_point_on_plane(&origin, rect.normal(), &self.point);
        if (self.point - foot).norm() > linear {
            return Ok(false);
        }
        let offset = foot - origin;
        for corner in [c1, c3] {
            let side = store.point(corner)? - origin;
            let length = side.norm();
            let t = offset.dot(&side) / (length * length);
            let slack = linear / length;
            if t < -slack || t > 1.0 + slack {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
