use rustc_hash::FxHashMap;

use super::SpaceId;
use crate::topology::CuboidId;

/// Many-to-many relation between spaces and cuboids.
///
/// Both directions are stored and every mutation updates both, so
/// `spaces_of(c)` contains `s` exactly when `cuboids_of(s)` contains `c`.
#[derive(Debug, Default)]
pub struct Membership {
    by_cuboid: FxHashMap<CuboidId, Vec<SpaceId>>,
    by_space: FxHashMap<SpaceId, Vec<CuboidId>>,
}

impl Membership {
    /// Creates an empty relation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Relates `space` and `cuboid`. Returns `false` if they already were.
    pub fn link(&mut self, space: SpaceId, cuboid: CuboidId) -> bool {
        let spaces = self.by_cuboid.entry(cuboid).or_default();
        if spaces.contains(&space) {
            return false;
        }
        spaces.push(space);
        self.by_space.entry(space).or_default().push(cuboid);
        true
    }

    /// Removes the relation. Returns `false` if it did not exist.
    pub fn unlink(&mut self, space: SpaceId, cuboid: CuboidId) -> bool {
        let Some(spaces) = self.by_cuboid.get_mut(&cuboid) else {
            return false;
        };
        let Some(pos) = spaces.iter().position(|&s| s == space) else {
            return false;
        };
        spaces.remove(pos);
        if spaces.is_empty() {
            self.by_cuboid.remove(&cuboid);
        }
        if let Some(cuboids) = self.by_space.get_mut(&space) {
            cuboids.retain(|&c| c != cuboid);
            if cuboids.is_empty() {
                self.by_space.remove(&space);
            }
        }
        true
    }

    /// Moves every membership of `parent` onto each of `children` and
    /// clears `parent`'s list. Returns the spaces that held `parent`.
    pub fn transfer(&mut self, parent: CuboidId, children: &[CuboidId]) -> Vec<SpaceId> {
        let spaces = self.by_cuboid.remove(&parent).unwrap_or_default();
        for &space in &spaces {
            if let Some(cuboids) = self.by_space.get_mut(&space) {
                cuboids.retain(|&c| c != parent);
            }
            for &child in children {
                self.link(space, child);
            }
        }
        spaces
    }

    /// Drops every relation of `space`.
    pub fn remove_space(&mut self, space: SpaceId) {
        for cuboid in self.by_space.remove(&space).unwrap_or_default() {
            if let Some(spaces) = self.by_cuboid.get_mut(&cuboid) {
                spaces.retain(|&s| s != space);
                if spaces.is_empty() {
                    self.by_cuboid.remove(&cuboid);
                }
            }
        }
    }

    /// Spaces related to `cuboid`, in the order they were linked.
    #[must_use]
    pub fn spaces_of(&self, cuboid: CuboidId) -> &[SpaceId] {
        self.by_cuboid.get(&cuboid).map_or(&[], Vec::as_slice)
    }

    /// Cuboids related to `space`, in the order they were linked.
    #[must_use]
    pub fn cuboids_of(&self, space: SpaceId) -> &[CuboidId] {
        self.by_space.get(&space).map_or(&[], Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids() -> (Vec<SpaceId>, Vec<CuboidId>) {
        let mut spaces: SlotMap<SpaceId, ()> = SlotMap::with_key();
        let mut cuboids: SlotMap<CuboidId, ()> = SlotMap::with_key();
        (
            (0..2).map(|_| spaces.insert(())).collect(),
            (0..4).map(|_| cuboids.insert(())).collect(),
        )
    }

    #[test]
    fn link_is_bidirectional_and_idempotent() {
        let (s, c) = ids();
        let mut m = Membership::new();
        assert!(m.link(s[0], c[0]));
        assert!(!m.link(s[0], c[0]));
        assert_eq!(m.spaces_of(c[0]), &[s[0]]);
        assert_eq!(m.cuboids_of(s[0]), &[c[0]]);

        assert!(m.unlink(s[0], c[0]));
        assert!(!m.unlink(s[0], c[0]));
        assert!(m.spaces_of(c[0]).is_empty());
        assert!(m.cuboids_of(s[0]).is_empty());
    }

    #[test]
    fn transfer_moves_all_spaces_to_children() {
        let (s, c) = ids();
        let mut m = Membership::new();
        m.link(s[0], c[0]);
        m.link(s[1], c[0]);
        m.link(s[1], c[3]);

        let moved = m.transfer(c[0], &[c[1], c[2]]);
        assert_eq!(moved, vec![s[0], s[1]]);
        assert!(m.spaces_of(c[0]).is_empty());
        assert_eq!(m.spaces_of(c[1]), &[s[0], s[1]]);
        assert_eq!(m.spaces_of(c[2]), &[s[0], s[1]]);
        assert_eq!(m.cuboids_of(s[0]), &[c[1], c[2]]);
        assert_eq!(m.cuboids_of(s[1]), &[c[3], c[1], c[2]]);
    }

    #[test]
    fn transfer_of_unassigned_cuboid_is_empty() {
        let (_, c) = ids();
        let mut m = Membership::new();
        assert!(m.transfer(c[0], &[c[1]]).is_empty());
        assert!(m.spaces_of(c[1]).is_empty());
    }

    #[test]
    fn removing_space_clears_cuboid_side() {
        let (s, c) = ids();
        let mut m = Membership::new();
        m.link(s[0], c[0]);
        m.link(s[1], c[0]);
        m.remove_space(s[0]);
        assert_eq!(m.spaces_of(c[0]), &[s[1]]);
        assert!(m.cuboids_of(s[0]).is_empty());
    }
}
