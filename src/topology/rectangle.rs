use crate::math::Vector3;

use super::line::LineId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a rectangle in the vertex store.
    pub struct RectangleId;
}

/// Four lines bounding a planar rectangular face.
///
/// A rectangle is shared by the (at most two) cuboids on either side of it.
#[derive(Debug, Clone)]
pub struct RectangleData {
    pub(crate) lines: [LineId; 4],
    pub(crate) vertices: [VertexId; 4],
    pub(crate) normal: Vector3,
    pub(crate) area: f64,
    pub(crate) deleted: bool,
}

impl RectangleData {
    /// The four boundary lines, in the order they were supplied.
    #[must_use]
    pub fn lines(&self) -> [LineId; 4] {
        self.lines
    }

    /// The four corners, in loop order starting at the first line.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 4] {
        self.vertices
    }

    /// Unit normal. Its sense follows the loop order and carries no
    /// inside/outside meaning.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Area of the face.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Returns `true` if the rectangle has been tagged for deletion.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn key(&self) -> [LineId; 4] {
        rectangle_key(self.lines)
    }
}

/// Order-independent dedup key of four lines.
pub(crate) fn rectangle_key(mut lines: [LineId; 4]) -> [LineId; 4] {
    lines.sort_unstable();
    lines
}
