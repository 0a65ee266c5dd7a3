use crate::math::{is_parallel, is_perpendicular, Vector3};
use crate::topology::{CuboidId, VertexStore};

/// Validates the topological and geometric consistency of a cuboid.
///
/// A valid cuboid has 6 distinct faces, 12 distinct edges and 8 distinct
/// corners, every face edge is a cuboid edge, and the face normals pair up
/// into three mutually orthogonal axes.
pub struct IsValid {
    cuboid: CuboidId,
}

impl IsValid {
    /// Creates a new `IsValid` query.
    #[must_use]
    pub fn new(cuboid: CuboidId) -> Self {
        Self { cuboid }
    }

    /// Executes the validation, returning `true` if the cuboid is valid.
    #[must_use]
    pub fn execute(&self, store: &VertexStore) -> bool {
        let Ok(data) = store.cuboid(self.cuboid) else {
            return false;
        };
        if !all_distinct(data.rectangles()) || !all_distinct(data.lines()) || !all_distinct(data.vertices()) {
            return false;
        }

        let angular = store.tolerance().angular;
        let mut normals: Vec<Vector3> = Vec::with_capacity(6);
        for &face in data.rectangles() {
            let Ok(rect) = store.rectangle(face) else {
                return false;
            };
            if !rect.lines().iter().all(|line| data.lines().contains(line)) {
                return false;
            }
            if !rect.vertices().iter().all(|v| data.vertices().contains(v)) {
                return false;
            }
            normals.push(*rect.normal());
        }

        let mut axes: Vec<Vector3> = Vec::with_capacity(3);
        for normal in &normals {
            let partners = normals.iter().filter(|n| is_parallel(n, normal, angular)).count();
            // Each normal is parallel to itself and exactly one other.
            if partners != 2 {
                return false;
            }
            if !axes.iter().any(|a| is_parallel(a, normal, angular)) {
                axes.push(*normal);
            }
        }
        axes.len() == 3
            && is_perpendicular(&axes[0], &axes[1], angular)
            && is_perpendicular(&axes[1], &axes[2], angular)
            && is_perpendicular(&axes[0], &axes[2], angular)
    }
}

fn all_distinct<T: PartialEq>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(i, item)| !items[i + 1..].contains(item))
}
