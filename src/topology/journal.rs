use super::cuboid::CuboidId;
use super::line::LineId;
use super::rectangle::RectangleId;
use super::vertex::VertexId;

/// Record of store mutations made inside [`VertexStore::atomic`](super::VertexStore::atomic).
///
/// Creations and deletion tags are recorded in order so a failed
/// transaction can undo them.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub created_vertices: Vec<VertexId>,
    pub created_lines: Vec<LineId>,
    pub created_rectangles: Vec<RectangleId>,
    pub created_cuboids: Vec<CuboidId>,
    pub tagged_lines: Vec<LineId>,
    pub tagged_rectangles: Vec<RectangleId>,
    pub tagged_cuboids: Vec<CuboidId>,
}

impl Journal {
    pub fn is_empty(&self) -> bool {
        self.created_vertices.is_empty()
            && self.created_lines.is_empty()
            && self.created_rectangles.is_empty()
            && self.created_cuboids.is_empty()
            && self.tagged_lines.is_empty()
            && self.tagged_rectangles.is_empty()
            && self.tagged_cuboids.is_empty()
    }

    /// Appends a committed inner transaction.
    pub fn absorb(&mut self, inner: Journal) {
        self.created_vertices.extend(inner.created_vertices);
        self.created_lines.extend(inner.created_lines);
        self.created_rectangles.extend(inner.created_rectangles);
        self.created_cuboids.extend(inner.created_cuboids);
        self.tagged_lines.extend(inner.tagged_lines);
        self.tagged_rectangles.extend(inner.tagged_rectangles);
        self.tagged_cuboids.extend(inner.tagged_cuboids);
    }
}
