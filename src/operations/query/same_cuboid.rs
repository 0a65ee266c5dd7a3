use crate::error::Result;
use crate::topology::{CuboidId, VertexStore};

/// Number of shared faces at which two cuboids are considered the same.
const SHARED_FACES: usize = 3;

/// Tests whether two cuboids are the same cell: true when at least three of
/// their six faces coincide.
pub struct SameCuboid {
    a: CuboidId,
    b: CuboidId,
}

impl SameCuboid {
    /// Creates a new `SameCuboid` query.
    #[must_use]
    pub fn new(a: CuboidId, b: CuboidId) -> Self {
        Self { a, b }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns an error if either cuboid is not found.
    pub fn execute(&self, store: &VertexStore) -> Result<bool> {
        let a = store.cuboid(self.a)?.rectangles();
        let b = store.cuboid(self.b)?.rectangles();
        let shared = a.iter().filter(|face| b.contains(face)).count();
        Ok(shared >= SHARED_FACES)
    }
}
