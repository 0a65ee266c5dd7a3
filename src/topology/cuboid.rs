use crate::error::{GeometryError, Result};
use crate::math::{is_parallel, is_perpendicular, Point3};

use super::line::LineId;
use super::rectangle::RectangleId;
use super::vertex::VertexId;
use super::VertexStore;

slotmap::new_key_type! {
    /// Unique identifier for a cuboid in the vertex store.
    pub struct CuboidId;
}

/// A box-shaped cell: six faces, twelve edges, eight corners.
///
/// Faces are stored as `[reference, opposite, a0, a1, b0, b1]`, where the
/// `a` pair has normals perpendicular to the reference face's first edge and
/// the `b` pair has normals parallel to it. Edges and corners are the union
/// of the faces' edges and corners in that face order, so corners 0..4 are
/// the reference face's loop and corner 4 is the first corner of the
/// opposite face.
#[derive(Debug, Clone)]
pub struct CuboidData {
    pub(crate) rectangles: [RectangleId; 6],
    pub(crate) lines: [LineId; 12],
    pub(crate) vertices: [VertexId; 8],
    pub(crate) centroid: VertexId,
    pub(crate) id: Option<u32>,
    pub(crate) zone_ids: Vec<u32>,
    pub(crate) deleted: bool,
}

impl CuboidData {
    /// All six faces.
    #[must_use]
    pub fn rectangles(&self) -> &[RectangleId; 6] {
        &self.rectangles
    }

    /// All twelve edges.
    #[must_use]
    pub fn lines(&self) -> &[LineId; 12] {
        &self.lines
    }

    /// All eight corners.
    #[must_use]
    pub fn vertices(&self) -> &[VertexId; 8] {
        &self.vertices
    }

    /// Face at a fixed index in `0..6`.
    #[must_use]
    pub fn rectangle_at(&self, index: usize) -> Option<RectangleId> {
        self.rectangles.get(index).copied()
    }

    /// Edge at a fixed index in `0..12`.
    #[must_use]
    pub fn line_at(&self, index: usize) -> Option<LineId> {
        self.lines.get(index).copied()
    }

    /// Corner at a fixed index in `0..8`.
    #[must_use]
    pub fn vertex_at(&self, index: usize) -> Option<VertexId> {
        self.vertices.get(index).copied()
    }

    /// The vertex at the mean of the eight corners.
    #[must_use]
    pub fn centroid(&self) -> VertexId {
        self.centroid
    }

    /// The caller-assigned integer ID, if any.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Assigns the integer ID.
    pub fn set_id(&mut self, id: u32) {
        self.id = Some(id);
    }

    /// Appends a zone ID. Zone IDs are never removed.
    pub fn add_zone_id(&mut self, zone: u32) {
        self.zone_ids.push(zone);
    }

    /// The `index`-th zone ID, in insertion order.
    #[must_use]
    pub fn zone_id(&self, index: usize) -> Option<u32> {
        self.zone_ids.get(index).copied()
    }

    /// All zone IDs, in insertion order.
    #[must_use]
    pub fn zone_ids(&self) -> &[u32] {
        &self.zone_ids
    }

    /// Returns `true` if the cuboid has been tagged for deletion.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Returns `true` if `vertex` is one of the eight corners.
    #[must_use]
    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }

    pub(crate) fn key(&self) -> [RectangleId; 6] {
        cuboid_key(self.rectangles)
    }
}

/// Order-independent dedup key of six faces.
pub(crate) fn cuboid_key(mut rectangles: [RectangleId; 6]) -> [RectangleId; 6] {
    rectangles.sort_unstable();
    rectangles
}

/// Classified faces and collected edges/corners of a prospective cuboid.
#[derive(Debug)]
pub(crate) struct Assembly {
    pub rectangles: [RectangleId; 6],
    pub lines: [LineId; 12],
    pub vertices: [VertexId; 8],
    pub centroid: Point3,
}

fn invalid(message: impl Into<String>) -> crate::error::KernelError {
    GeometryError::InvalidInputGeometry(message.into()).into()
}

/// Classifies six faces around the first one and collects the distinct
/// edges and corners.
///
/// # Errors
///
/// Returns [`GeometryError::InvalidInputGeometry`] if a face cannot be
/// classified orthogonally against the reference face, a classification
/// slot overflows, or the faces do not share exactly 12 edges and 8 corners.
pub(crate) fn assemble(store: &VertexStore, faces: [RectangleId; 6]) -> Result<Assembly> {
    let angular = store.tolerance().angular;
    let reference = store.rectangle(faces[0])?;
    let n1 = *reference.normal();
    let v2 = store.line_vector(reference.lines[0])?;
    let mut v3 = None;
    for &line in &reference.lines[1..] {
        let dir = store.line_vector(line)?;
        if is_perpendicular(&v2, &dir, angular) {
            v3 = Some(dir);
            break;
        }
    }
    let v3 = v3.ok_or_else(|| invalid("reference face has no edge perpendicular to its first"))?;

    let mut opposite = None;
    let mut pair_a: Vec<RectangleId> = Vec::with_capacity(2);
    let mut pair_b: Vec<RectangleId> = Vec::with_capacity(2);
    for &face in &faces[1..] {
        let normal = store.rectangle(face)?.normal;
        if is_parallel(&normal, &n1, angular) {
            if opposite.replace(face).is_some() {
                return Err(invalid("more than one face parallel to the reference face"));
            }
        } else if is_perpendicular(&normal, &v2, angular) {
            if pair_a.len() == 2 {
                return Err(invalid("more than two faces in the first side pair"));
            }
            pair_a.push(face);
        } else if is_perpendicular(&normal, &v3, angular) {
            if pair_b.len() == 2 {
                return Err(invalid("more than two faces in the second side pair"));
            }
            pair_b.push(face);
        } else {
            return Err(invalid("face is not orthogonal to the reference face"));
        }
    }
    // Five faces, no overflow: every slot is filled.
    let opposite = opposite.ok_or_else(|| invalid("no face opposite the reference face"))?;
    let rectangles = [faces[0], opposite, pair_a[0], pair_a[1], pair_b[0], pair_b[1]];

    let mut lines: Vec<LineId> = Vec::with_capacity(12);
    let mut vertices: Vec<VertexId> = Vec::with_capacity(8);
    for &face in &rectangles {
        let data = store.rectangle(face)?;
        for line in data.lines {
            if !lines.contains(&line) {
                lines.push(line);
            }
        }
        for vertex in data.vertices {
            if !vertices.contains(&vertex) {
                vertices.push(vertex);
            }
        }
    }
    let lines: [LineId; 12] = lines
        .try_into()
        .map_err(|v: Vec<LineId>| invalid(format!("expected 12 distinct edges, found {}", v.len())))?;
    let vertices: [VertexId; 8] = vertices.try_into().map_err(|v: Vec<VertexId>| {
        invalid(format!("expected 8 distinct corners, found {}", v.len()))
    })?;

    let mut sum = nalgebra::Vector3::zeros();
    for &vertex in &vertices {
        sum += store.vertex(vertex)?.point.coords;
    }
    let centroid = Point3::from(sum / 8.0);

    Ok(Assembly {
        rectangles,
        lines,
        vertices,
        centroid,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::math::Point3;
    use crate::operations::creation::MakeCuboid;
    use crate::topology::VertexStore;

    #[test]
    fn id_is_unset_until_assigned() {
        let mut store = VertexStore::new();
        let cuboid = MakeCuboid::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.cuboid(cuboid).unwrap().id(), None);

        store.cuboid_mut(cuboid).unwrap().set_id(7);
        store.cuboid_mut(cuboid).unwrap().set_id(42);
        assert_eq!(store.cuboid(cuboid).unwrap().id(), Some(42));
    }

    #[test]
    fn zone_ids_append_in_order() {
        let mut store = VertexStore::new();
        let cuboid = MakeCuboid::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let data = store.cuboid_mut(cuboid).unwrap();
        assert!(data.zone_ids().is_empty());
        data.add_zone_id(3);
        data.add_zone_id(1);
        data.add_zone_id(3);

        let data = store.cuboid(cuboid).unwrap();
        assert_eq!(data.zone_ids(), &[3, 1, 3]);
        assert_eq!(data.zone_id(1), Some(1));
        assert_eq!(data.zone_id(3), None);
    }
}
