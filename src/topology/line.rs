use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a line in the vertex store.
    pub struct LineId;
}

/// An unordered pair of vertices.
#[derive(Debug, Clone)]
pub struct LineData {
    pub(crate) vertices: [VertexId; 2],
    pub(crate) deleted: bool,
}

impl LineData {
    pub(crate) fn new(a: VertexId, b: VertexId) -> Self {
        Self {
            vertices: [a, b],
            deleted: false,
        }
    }

    /// The two end vertices, in the order they were first supplied.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 2] {
        self.vertices
    }

    /// Returns the end opposite `vertex`, or `None` if `vertex` is not an end.
    #[must_use]
    pub fn other(&self, vertex: VertexId) -> Option<VertexId> {
        match self.vertices {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }

    /// Returns `true` if the line has been tagged for deletion.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub(crate) fn key(&self) -> [VertexId; 2] {
        line_key(self.vertices[0], self.vertices[1])
    }
}

/// Order-independent dedup key of a vertex pair.
pub(crate) fn line_key(a: VertexId, b: VertexId) -> [VertexId; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}
