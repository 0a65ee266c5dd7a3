use tracing::{debug, instrument};

use crate::error::{Result, TopologyError};
use crate::operations::query::{LocatePoint, PointLocation};
use crate::space::{SpaceId, SpaceRegistry};
use crate::topology::{CuboidId, LineId, RectangleId, VertexId, VertexStore};

use super::lattice::{unresolved, SplitPlan};

/// The refinement pattern chosen for a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCase {
    /// The vertex lies on an edge: one cut plane, 2 children.
    Edge,
    /// The vertex lies on a face: two cut planes, 4 children.
    Face,
    /// Fallthrough: three cut planes, 8 children.
    Interior,
}

impl SplitCase {
    /// Number of children the case produces.
    #[must_use]
    pub fn child_count(self) -> usize {
        match self {
            Self::Edge => 2,
            Self::Face => 4,
            Self::Interior => 8,
        }
    }

    fn of(location: PointLocation) -> Self {
        match location {
            PointLocation::Edge(_) => Self::Edge,
            PointLocation::Face(_) => Self::Face,
            PointLocation::Interior => Self::Interior,
        }
    }
}

/// Result of a successful split.
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// The refinement pattern applied.
    pub case: SplitCase,
    /// The child cuboids, 2, 4 or 8 of them.
    pub children: Vec<CuboidId>,
    /// Every non-corner lattice vertex, the split vertex included.
    pub new_vertices: Vec<VertexId>,
    /// Distinct lines bounding the children.
    pub lines: Vec<LineId>,
    /// Distinct faces bounding the children.
    pub rectangles: Vec<RectangleId>,
    /// Spaces that held the parent and now hold every child.
    pub spaces: Vec<SpaceId>,
}

/// Refines a cuboid so that a vertex becomes a corner of its children.
///
/// The vertex is located on the cuboid in fixed precedence: an edge
/// containing it (2 children), else a face containing it (4 children), else
/// the interior (8 children). All auxiliary vertices are resolved before the
/// store is touched; the store mutation then runs as one transaction.
/// Afterwards every space that held the parent holds the children instead,
/// and is offered each new vertex.
pub struct SplitCuboid {
    cuboid: CuboidId,
    vertex: VertexId,
}

impl SplitCuboid {
    /// Creates a new `SplitCuboid` operation.
    #[must_use]
    pub fn new(cuboid: CuboidId, vertex: VertexId) -> Self {
        Self { cuboid, vertex }
    }

    /// Executes the split.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::Deleted`] if the cuboid is tagged for
    /// deletion, and [`TopologyError::ResolutionFailure`] if the vertex is
    /// already a corner, a required auxiliary vertex cannot be resolved, or a
    /// child cannot be constructed. Neither the store nor the space
    /// memberships change on error.
    #[instrument(skip_all, fields(cuboid = ?self.cuboid, vertex = ?self.vertex))]
    pub fn execute(&self, store: &mut VertexStore, spaces: &mut SpaceRegistry) -> Result<SplitOutcome> {
        let location = self.locate(store)?;
        let case = SplitCase::of(location);
        let plan = SplitPlan::resolve(store, self.cuboid, self.vertex, location)?;
        debug!(
            ?case,
            cut_axes = plan.cut_axes(),
            retired_lines = plan.retired_lines().len(),
            retired_rectangles = plan.retired_rectangles().len(),
            "split resolved"
        );

        let refinement = plan.commit(store)?;
        let held_by = spaces.replace(self.cuboid, &refinement.children);
        spaces.notify(&held_by, store, &refinement.new_vertices);

        debug!(
            children = refinement.children.len(),
            lines = refinement.lines.len(),
            rectangles = refinement.rectangles.len(),
            spaces = held_by.len(),
            "split committed"
        );
        Ok(SplitOutcome {
            case,
            children: refinement.children,
            new_vertices: refinement.new_vertices,
            lines: refinement.lines,
            rectangles: refinement.rectangles,
            spaces: held_by,
        })
    }

    fn locate(&self, store: &VertexStore) -> Result<PointLocation> {
        let data = store.cuboid(self.cuboid)?;
        if data.is_deleted() {
            return Err(TopologyError::Deleted("cuboid").into());
        }
        if data.has_vertex(self.vertex) {
            return Err(unresolved("vertex is already a corner of the cuboid"));
        }
        let point = store.point(self.vertex)?;
        LocatePoint::new(self.cuboid, point).execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeCuboid;
    use crate::operations::query::{CheckVertex, IsValid, SameCuboid, Volume};
    use crate::space::testing::{Check, RecordingSpace};
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit() -> (VertexStore, SpaceRegistry, CuboidId) {
        let mut store = VertexStore::new();
        let cuboid = MakeCuboid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        (store, SpaceRegistry::new(), cuboid)
    }

    fn split_at(point: Point3) -> (VertexStore, SpaceRegistry, CuboidId, SplitOutcome) {
        let (mut store, mut spaces, cuboid) = unit();
        let vertex = store.add_vertex(point);
        let outcome = SplitCuboid::new(cuboid, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        (store, spaces, cuboid, outcome)
    }

    fn assert_children(store: &VertexStore, outcome: &SplitOutcome, volume: f64) {
        for &child in &outcome.children {
            assert!(IsValid::new(child).execute(store));
            assert!(!store.cuboid(child).unwrap().is_deleted());
            assert_relative_eq!(Volume::new(child).execute(store).unwrap(), volume, epsilon = 1e-12);
        }
        let total: f64 = outcome
            .children
            .iter()
            .map(|&c| Volume::new(c).execute(store).unwrap())
            .sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn edge_midpoint_gives_two_halves() {
        let (store, _, parent, outcome) = split_at(p(0.0, 0.5, 0.0));
        assert_eq!(outcome.case, SplitCase::Edge);
        assert_eq!(outcome.children.len(), 2);
        assert_children(&store, &outcome, 0.5);
        assert_eq!(outcome.new_vertices.len(), 4);
        assert_eq!(outcome.lines.len(), 20);
        assert_eq!(outcome.rectangles.len(), 11);
        assert!(store.cuboid(parent).unwrap().is_deleted());

        let data = store.cuboid(parent).unwrap();
        let tagged_lines = data
            .lines()
            .iter()
            .filter(|&&l| store.line(l).unwrap().is_deleted())
            .count();
        let tagged_faces = data
            .rectangles()
            .iter()
            .filter(|&&r| store.rectangle(r).unwrap().is_deleted())
            .count();
        assert_eq!(tagged_lines, 4);
        assert_eq!(tagged_faces, 4);
    }

    #[test]
    fn face_centre_gives_four_quarters() {
        let (store, _, parent, outcome) = split_at(p(0.0, 0.5, 0.5));
        assert_eq!(outcome.case, SplitCase::Face);
        assert_eq!(outcome.children.len(), 4);
        assert_children(&store, &outcome, 0.25);
        assert_eq!(outcome.new_vertices.len(), 10);
        assert_eq!(outcome.lines.len(), 33);
        assert_eq!(outcome.rectangles.len(), 20);

        let data = store.cuboid(parent).unwrap();
        let tagged_lines = data
            .lines()
            .iter()
            .filter(|&&l| store.line(l).unwrap().is_deleted())
            .count();
        assert_eq!(tagged_lines, 8);
        assert!(data
            .rectangles()
            .iter()
            .all(|&r| store.rectangle(r).unwrap().is_deleted()));
    }

    #[test]
    fn centroid_gives_eight_octants() {
        let (store, _, parent, outcome) = split_at(p(0.5, 0.5, 0.5));
        assert_eq!(outcome.case, SplitCase::Interior);
        assert_eq!(outcome.children.len(), 8);
        assert_children(&store, &outcome, 0.125);
        assert_eq!(outcome.new_vertices.len(), 19);
        assert_eq!(outcome.lines.len(), 54);
        assert_eq!(outcome.rectangles.len(), 36);

        let data = store.cuboid(parent).unwrap();
        assert!(data.lines().iter().all(|&l| store.line(l).unwrap().is_deleted()));
        assert!(data
            .rectangles()
            .iter()
            .all(|&r| store.rectangle(r).unwrap().is_deleted()));
    }

    #[test]
    fn off_centre_interior_split_conserves_volume() {
        let (mut store, mut spaces, cuboid) = unit();
        let vertex = store.add_vertex(p(0.2, 0.7, 0.9));
        let outcome = SplitCuboid::new(cuboid, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        let total: f64 = outcome
            .children
            .iter()
            .map(|&c| Volume::new(c).execute(&store).unwrap())
            .sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        for &child in &outcome.children {
            assert!(store.cuboid(child).unwrap().has_vertex(vertex));
        }
    }

    #[test]
    fn children_are_distinct_cells() {
        let (store, _, _, outcome) = split_at(p(0.5, 0.5, 0.5));
        for (i, &a) in outcome.children.iter().enumerate() {
            for &b in &outcome.children[i + 1..] {
                assert!(!SameCuboid::new(a, b).execute(&store).unwrap());
            }
        }
    }

    #[test]
    fn corner_vertex_is_rejected() {
        let (mut store, mut spaces, cuboid) = unit();
        let corner = store.cuboid(cuboid).unwrap().vertex_at(3).unwrap();
        let err = SplitCuboid::new(cuboid, corner)
            .execute(&mut store, &mut spaces)
            .unwrap_err();
        assert!(err.is_resolution_failure());
        assert!(!store.cuboid(cuboid).unwrap().is_deleted());
    }

    #[test]
    fn outside_vertex_fails_without_mutation() {
        let (mut store, mut spaces, cuboid) = unit();
        let vertex = store.add_vertex(p(2.0, 0.5, 0.5));
        let counts = (
            store.vertex_count(),
            store.line_count(),
            store.rectangle_count(),
            store.cuboid_count(),
        );

        let err = SplitCuboid::new(cuboid, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap_err();
        assert!(err.is_resolution_failure());
        assert_eq!(
            counts,
            (
                store.vertex_count(),
                store.line_count(),
                store.rectangle_count(),
                store.cuboid_count()
            )
        );
        let data = store.cuboid(cuboid).unwrap();
        assert!(!data.is_deleted());
        assert!(data.lines().iter().all(|&l| !store.line(l).unwrap().is_deleted()));
        assert!(IsValid::new(cuboid).execute(&store));
    }

    #[test]
    fn deleted_cuboid_cannot_be_split() {
        let (mut store, mut spaces, cuboid, _) = split_at(p(0.5, 0.5, 0.5));
        let vertex = store.add_vertex(p(0.25, 0.25, 0.25));
        let err = SplitCuboid::new(cuboid, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KernelError::Topology(TopologyError::Deleted("cuboid"))
        ));
    }

    #[test]
    fn spaces_follow_the_children() {
        let (mut store, mut spaces, cuboid) = unit();
        let (room, log) = RecordingSpace::new(2, 1);
        let room = spaces.insert(Box::new(room));
        let (other, other_log) = RecordingSpace::new(0, 0);
        let other = spaces.insert(Box::new(other));
        spaces.assign(room, cuboid).unwrap();

        let vertex = store.add_vertex(p(0.0, 0.5, 0.5));
        let outcome = SplitCuboid::new(cuboid, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();

        assert_eq!(outcome.spaces, vec![room]);
        assert_eq!(spaces.space_count(cuboid), 0);
        assert!(!spaces.cuboids_of(room).contains(&cuboid));
        assert_eq!(spaces.cuboids_of(room), outcome.children.as_slice());
        for &child in &outcome.children {
            assert_eq!(spaces.spaces_of(child), &[room]);
        }
        assert!(spaces.cuboids_of(other).is_empty());

        // Per new vertex: two edges, one surface, then the space itself.
        let log = log.borrow();
        assert_eq!(log.len(), outcome.new_vertices.len() * 4);
        assert!(log.contains(&Check::Body(vertex)));
        assert!(log.contains(&Check::Edge(1, vertex)));
        assert!(other_log.borrow().is_empty());
    }

    #[test]
    fn split_children_contain_their_centroids() {
        let (store, _, _, outcome) = split_at(p(0.0, 0.5, 0.5));
        for &child in &outcome.children {
            let centroid = store.point(store.cuboid(child).unwrap().centroid()).unwrap();
            assert!(CheckVertex::new(child, centroid).execute(&store).unwrap());
        }
    }

    #[test]
    fn split_reuses_neighbour_topology() {
        let mut store = VertexStore::new();
        let mut spaces = SpaceRegistry::new();
        let left = MakeCuboid::new(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let right = MakeCuboid::new(p(1.0, 0.0, 0.0), p(2.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let vertex = store.add_vertex(p(1.0, 0.5, 0.5));

        let a = SplitCuboid::new(left, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        let rectangles_before = store.rectangle_count();
        let b = SplitCuboid::new(right, vertex)
            .execute(&mut store, &mut spaces)
            .unwrap();
        assert_eq!(a.case, SplitCase::Face);
        assert_eq!(b.case, SplitCase::Face);

        // The four quarter faces on x = 1 were built by the first split.
        let shared: Vec<_> = a
            .rectangles
            .iter()
            .filter(|r| b.rectangles.contains(r))
            .collect();
        assert_eq!(shared.len(), 4);
        assert_eq!(store.rectangle_count() - rectangles_before, 20 - 4);
    }
}
