use crate::error::{GeometryError, Result};
use crate::math::Point3;
use crate::topology::{CuboidId, LineId, VertexId, VertexStore};

/// Creates an axis-aligned cuboid from two opposite corners.
///
/// All entities go through the store's dedup factories, so cuboids built
/// next to each other share their common vertices, lines and faces.
pub struct MakeCuboid {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeCuboid {
    /// Creates a new `MakeCuboid` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, creating the cuboid in the vertex store.
    ///
    /// The bottom face (`z = min`) is the reference face and its first
    /// edge runs along +X.
    ///
    /// # Errors
    ///
    /// Returns an error if the box has zero or negative extent along an axis.
    /// The store is unchanged on error.
    pub fn execute(&self, store: &mut VertexStore) -> Result<CuboidId> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        let linear = store.tolerance().linear;
        if (0..3).any(|i| hi[i] - lo[i] <= linear) {
            return Err(GeometryError::InvalidInputGeometry(format!(
                "cuboid corners {lo} and {hi} do not span a box"
            ))
            .into());
        }

        store.atomic(|store| {
            // Corner index bits: x = 1, y = 2, z = 4.
            let mut corners = [VertexId::default(); 8];
            for (bits, corner) in corners.iter_mut().enumerate() {
                let pick = |axis: usize| if (bits >> axis) & 1 == 0 { lo[axis] } else { hi[axis] };
                *corner = store.add_vertex(Point3::new(pick(0), pick(1), pick(2)));
            }

            let mut face = |quad: [usize; 4]| -> Result<_> {
                let mut lines = [LineId::default(); 4];
                for (i, line) in lines.iter_mut().enumerate() {
                    *line = store.add_line(corners[quad[i]], corners[quad[(i + 1) % 4]])?;
                }
                store.add_rectangle(lines)
            };
            let faces = [
                face([0, 1, 3, 2])?, // bottom
                face([4, 5, 7, 6])?, // top
                face([0, 1, 5, 4])?, // front
                face([2, 3, 7, 6])?, // back
                face([0, 2, 6, 4])?, // left
                face([1, 3, 7, 5])?, // right
            ];
            store.add_cuboid(faces)
        })
    }
}
