use tracing::{debug, info};

use crate::error::Result;
use crate::math::Point3;
use crate::operations::query::CheckVertex;
use crate::space::SpaceRegistry;
use crate::topology::{CuboidId, VertexId, VertexStore};

use super::split::{SplitCuboid, SplitOutcome};

/// Refines the whole complex so that a vertex becomes a corner of every
/// live cuboid containing it.
///
/// Live cuboids are scanned in store order; the first one that contains the
/// vertex without having it as a corner is split, and the scan restarts.
/// Every child of a split has the vertex as a corner, so each containing
/// cuboid is split once and neighbours sharing a face or edge with an
/// already refined cuboid pick up its new entities through the store's
/// dedup.
pub struct ConformToVertex {
    vertex: VertexId,
}

impl ConformToVertex {
    /// Creates a new `ConformToVertex` operation.
    #[must_use]
    pub fn new(vertex: VertexId) -> Self {
        Self { vertex }
    }

    /// Executes the operation, returning one outcome per split performed.
    ///
    /// # Errors
    ///
    /// Returns the first split error. Splits completed before it remain
    /// applied; the failing split leaves no trace.
    pub fn execute(
        &self,
        store: &mut VertexStore,
        spaces: &mut SpaceRegistry,
    ) -> Result<Vec<SplitOutcome>> {
        let point = store.point(self.vertex)?;
        let mut outcomes = Vec::new();
        while let Some(cuboid) = self.next_target(store, &point)? {
            debug!(?cuboid, "conforming cuboid");
            outcomes.push(SplitCuboid::new(cuboid, self.vertex).execute(store, spaces)?);
        }
        info!(splits = outcomes.len(), %point, "complex conformed to vertex");
        Ok(outcomes)
    }

    fn next_target(&self, store: &VertexStore, point: &Point3) -> Result<Option<CuboidId>> {
        for cuboid in store.live_cuboids() {
            if store.cuboid(cuboid)?.has_vertex(self.vertex) {
                continue;
            }
            if CheckVertex::new(cuboid, *point).execute(store)? {
                return Ok(Some(cuboid));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeCuboid;
    use crate::operations::modification::SplitCase;
    use crate::operations::query::{IsValid, Volume};
    use crate::space::testing::RecordingSpace;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn live_volume(store: &VertexStore) -> f64 {
        store
            .live_cuboids()
            .map(|c| Volume::new(c).execute(store).unwrap())
            .sum()
    }

    #[test]
    fn point_on_shared_face_refines_both_neighbours() {
        let mut store = VertexStore::new();
        let mut spaces = SpaceRegistry::new();
        let left = MakeCuboid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let right = MakeCuboid::new(p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let room = spaces.insert(Box::new(RecordingSpace::new(0, 0).0));
        spaces.assign(room, left).unwrap();
        spaces.assign(room, right).unwrap();

        let vertex = store.add_vertex(p(1.0, 0.5, 0.5));
        let outcomes = ConformToVertex::new(vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.case == SplitCase::Face));
        assert_eq!(store.live_cuboids().count(), 8);
        assert_eq!(spaces.cuboids_of(room).len(), 8);
        assert_relative_eq!(live_volume(&store), 2.0, epsilon = 1e-12);
        for cuboid in store.live_cuboids() {
            assert!(IsValid::new(cuboid).execute(&store));
            assert!(store.cuboid(cuboid).unwrap().has_vertex(vertex));
        }
    }

    #[test]
    fn point_on_shared_edge_refines_all_four_neighbours() {
        let mut store = VertexStore::new();
        let mut spaces = SpaceRegistry::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            MakeCuboid::new(p(x, y, 0.0), p(x + 1.0, y + 1.0, 1.0))
                .execute(&mut store)
                .unwrap();
        }

        let vertex = store.add_vertex(p(1.0, 1.0, 0.25));
        let outcomes = ConformToVertex::new(vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| o.case == SplitCase::Edge));
        assert_eq!(store.live_cuboids().count(), 8);
        assert_relative_eq!(live_volume(&store), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn conforming_twice_is_a_no_op() {
        let mut store = VertexStore::new();
        let mut spaces = SpaceRegistry::new();
        MakeCuboid::new(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0))
            .execute(&mut store)
            .unwrap();
        let vertex = store.add_vertex(p(0.5, 1.5, 1.0));

        let first = ConformToVertex::new(vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].case, SplitCase::Interior);

        let second = ConformToVertex::new(vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        assert!(second.is_empty());
        assert_relative_eq!(live_volume(&store), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn point_outside_every_cuboid_changes_nothing() {
        let mut store = VertexStore::new();
        let mut spaces = SpaceRegistry::new();
        MakeCuboid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let vertex = store.add_vertex(p(5.0, 5.0, 5.0));
        let outcomes = ConformToVertex::new(vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        assert!(outcomes.is_empty());
        assert_eq!(store.live_cuboids().count(), 1);
    }
}
