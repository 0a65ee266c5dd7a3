mod membership;

pub use membership::Membership;

use std::fmt;

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{Result, SpaceError};
use crate::topology::{CuboidId, VertexId, VertexStore};

slotmap::new_key_type! {
    /// Unique identifier for a space in the space registry.
    pub struct SpaceId;
}

/// A room-like grouping of cuboids, implemented outside the kernel.
///
/// After every split the kernel reports each newly introduced vertex to the
/// spaces that held the split cuboid: first to each of the space's edges,
/// then to each of its surfaces, then to the space itself.
pub trait Space {
    /// Number of structural edges owned by the space.
    fn edge_count(&self) -> usize;

    /// Number of surfaces owned by the space.
    fn surface_count(&self) -> usize;

    /// Offers a new vertex to the space's `edge`-th edge.
    fn check_edge_vertex(&mut self, edge: usize, store: &VertexStore, vertex: VertexId);

    /// Offers a new vertex to the space's `surface`-th surface.
    fn check_surface_vertex(&mut self, surface: usize, store: &VertexStore, vertex: VertexId);

    /// Offers a new vertex to the space itself.
    fn check_vertex(&mut self, store: &VertexStore, vertex: VertexId);
}

/// Owns the external spaces and their cuboid memberships.
#[derive(Default)]
pub struct SpaceRegistry {
    spaces: SlotMap<SpaceId, Box<dyn Space>>,
    membership: Membership,
}

impl fmt::Debug for SpaceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpaceRegistry")
            .field("spaces", &self.spaces.len())
            .field("membership", &self.membership)
            .finish()
    }
}

impl SpaceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a space and returns its ID.
    pub fn insert(&mut self, space: Box<dyn Space>) -> SpaceId {
        self.spaces.insert(space)
    }

    /// Removes a space and all of its memberships.
    ///
    /// # Errors
    ///
    /// Returns an error if the space is not registered.
    pub fn remove(&mut self, id: SpaceId) -> Result<Box<dyn Space>> {
        let space = self.spaces.remove(id).ok_or(SpaceError::NotFound)?;
        self.membership.remove_space(id);
        Ok(space)
    }

    /// Returns a reference to the space, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the space is not registered.
    pub fn space(&self, id: SpaceId) -> Result<&dyn Space> {
        self.spaces
            .get(id)
            .map(|space| space.as_ref())
            .ok_or_else(|| SpaceError::NotFound.into())
    }

    /// Adds `cuboid` to `space`, updating both sides of the relation.
    ///
    /// # Errors
    ///
    /// Returns an error if the space is not registered.
    pub fn assign(&mut self, space: SpaceId, cuboid: CuboidId) -> Result<()> {
        if !self.spaces.contains_key(space) {
            return Err(SpaceError::NotFound.into());
        }
        self.membership.link(space, cuboid);
        Ok(())
    }

    /// Removes `cuboid` from `space`, updating both sides of the relation.
    ///
    /// # Errors
    ///
    /// Returns an error if the space is not registered.
    pub fn unassign(&mut self, space: SpaceId, cuboid: CuboidId) -> Result<()> {
        if !self.spaces.contains_key(space) {
            return Err(SpaceError::NotFound.into());
        }
        self.membership.unlink(space, cuboid);
        Ok(())
    }

    /// Number of spaces that hold `cuboid`.
    #[must_use]
    pub fn space_count(&self, cuboid: CuboidId) -> usize {
        self.membership.spaces_of(cuboid).len()
    }

    /// The `index`-th space holding `cuboid`.
    #[must_use]
    pub fn space_of(&self, cuboid: CuboidId, index: usize) -> Option<SpaceId> {
        self.membership.spaces_of(cuboid).get(index).copied()
    }

    /// All spaces holding `cuboid`.
    #[must_use]
    pub fn spaces_of(&self, cuboid: CuboidId) -> &[SpaceId] {
        self.membership.spaces_of(cuboid)
    }

    /// All cuboids held by `space`.
    #[must_use]
    pub fn cuboids_of(&self, space: SpaceId) -> &[CuboidId] {
        self.membership.cuboids_of(space)
    }

    /// Replaces `parent` by `children` in every space that holds it and
    /// clears `parent`'s memberships. Returns the affected spaces.
    pub fn replace(&mut self, parent: CuboidId, children: &[CuboidId]) -> Vec<SpaceId> {
        let spaces = self.membership.transfer(parent, children);
        debug!(
            spaces = spaces.len(),
            children = children.len(),
            "cuboid memberships transferred"
        );
        spaces
    }

    /// Reports each of `vertices` to the edges, surfaces and body of each
    /// of `spaces`. Unknown space IDs are skipped.
    pub fn notify(&mut self, spaces: &[SpaceId], store: &VertexStore, vertices: &[VertexId]) {
        for &id in spaces {
            let Some(space) = self.spaces.get_mut(id) else {
                continue;
            };
            for &vertex in vertices {
                for edge in 0..space.edge_count() {
                    space.check_edge_vertex(edge, store, vertex);
                }
                for surface in 0..space.surface_count() {
                    space.check_surface_vertex(surface, store, vertex);
                }
                space.check_vertex(store, vertex);
            }
        }
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::testing::{Check, RecordingSpace};
    use super::*;
    use crate::math::Point3;
    use slotmap::SlotMap;

    #[test]
    fn notify_visits_edges_then_surfaces_then_body() {
        let mut store = VertexStore::new();
        let v = store.add_vertex(Point3::new(1.0, 2.0, 3.0));
        let mut registry = SpaceRegistry::new();
        let (space, log) = RecordingSpace::new(2, 1);
        let id = registry.insert(Box::new(space));

        registry.notify(&[id], &store, &[v]);
        assert_eq!(
            *log.borrow(),
            vec![
                Check::Edge(0, v),
                Check::Edge(1, v),
                Check::Surface(0, v),
                Check::Body(v)
            ]
        );
    }

    #[test]
    fn assign_requires_registered_space() {
        let mut registry = SpaceRegistry::new();
        let (space, _) = RecordingSpace::new(0, 0);
        let id = registry.insert(Box::new(space));
        registry.remove(id).unwrap();

        let mut cuboids: SlotMap<CuboidId, ()> = SlotMap::with_key();
        let cuboid = cuboids.insert(());
        assert!(registry.assign(id, cuboid).is_err());
        assert_eq!(registry.space_count(cuboid), 0);
    }

    #[test]
    fn accessors_follow_assignment_order() {
        let mut registry = SpaceRegistry::new();
        let a = registry.insert(Box::new(RecordingSpace::new(0, 0).0));
        let b = registry.insert(Box::new(RecordingSpace::new(0, 0).0));
        let mut cuboids: SlotMap<CuboidId, ()> = SlotMap::with_key();
        let cuboid = cuboids.insert(());

        registry.assign(b, cuboid).unwrap();
        registry.assign(a, cuboid).unwrap();
        assert_eq!(registry.space_count(cuboid), 2);
        assert_eq!(registry.space_of(cuboid, 0), Some(b));
        assert_eq!(registry.space_of(cuboid, 1), Some(a));
        assert_eq!(registry.space_of(cuboid, 2), None);

        registry.unassign(b, cuboid).unwrap();
        assert_eq!(registry.spaces_of(cuboid), &[a]);
        assert!(registry.cuboids_of(b).is_empty());
    }
}
