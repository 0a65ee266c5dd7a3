pub mod cuboid;
mod journal;
pub mod line;
pub mod rectangle;
pub mod vertex;

pub use cuboid::{CuboidData, CuboidId};
pub use line::{LineData, LineId};
pub use rectangle::{RectangleData, RectangleId};
pub use vertex::{VertexData, VertexId};

use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use tracing::{trace, warn};

use crate::error::{GeometryError, Result, TopologyError};
use crate::math::{is_perpendicular, Point3, Tolerance, Vector3, TOLERANCE};
use cuboid::cuboid_key;
use journal::Journal;
use line::line_key;
use rectangle::rectangle_key;

/// Quantized vertex position, in units of the linear tolerance.
type GridKey = [i64; 3];

/// Central arena that owns every vertex, line, rectangle and cuboid.
///
/// All `add_*` operations are dedup factories: asking twice for the same
/// content returns the same handle. `delete_*` only tags an entity; it stays
/// readable until the store is dropped, but is removed from the dedup
/// indices so later requests build a fresh entity.
#[derive(Debug, Default)]
pub struct VertexStore {
    tolerance: Tolerance,
    vertices: SlotMap<VertexId, VertexData>,
    lines: SlotMap<LineId, LineData>,
    rectangles: SlotMap<RectangleId, RectangleData>,
    cuboids: SlotMap<CuboidId, CuboidData>,
    vertex_index: FxHashMap<GridKey, Vec<VertexId>>,
    line_index: FxHashMap<[VertexId; 2], LineId>,
    rectangle_index: FxHashMap<[LineId; 4], RectangleId>,
    cuboid_index: FxHashMap<[RectangleId; 6], CuboidId>,
    journal: Option<Journal>,
}

impl VertexStore {
    /// Creates a new, empty store with default tolerances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty store with the given tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if the tolerances are not usable, see
    /// [`Tolerance::new`].
    pub fn with_tolerance(tolerance: Tolerance) -> Result<Self> {
        Ok(Self {
            tolerance: tolerance.validated()?,
            ..Self::default()
        })
    }

    /// The tolerances used by this store.
    #[must_use]
    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    // --- Vertex operations ---

    /// Returns the vertex at `point`, creating it if no vertex lies within
    /// the linear tolerance.
    pub fn add_vertex(&mut self, point: Point3) -> VertexId {
        if let Some(id) = self.find_vertex(&point) {
            trace!(?point, "vertex reused");
            return id;
        }
        let id = self.vertices.insert(VertexData::new(point));
        let key = self.grid_key(&point);
        self.vertex_index.entry(key).or_default().push(id);
        self.record(|j| j.created_vertices.push(id));
        id
    }

    /// Looks up the vertex nearest to `point` within the linear tolerance.
    #[must_use]
    pub fn find_vertex(&self, point: &Point3) -> Option<VertexId> {
        let [x, y, z] = self.grid_key(point);
        let mut best: Option<(VertexId, f64)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = [x.saturating_add(dx), y.saturating_add(dy), z.saturating_add(dz)];
                    let Some(bucket) = self.vertex_index.get(&cell) else {
                        continue;
                    };
                    for &id in bucket {
                        let Some(data) = self.vertices.get(id) else {
                            continue;
                        };
                        let distance = (data.point - point).norm();
                        if distance <= self.tolerance.linear
                            && best.is_none_or(|(_, d)| distance < d)
                        {
                            best = Some((id, distance));
                        }
                    }
                }
            }
        }
        best.map(|(id, _)| id)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex").into())
    }

    /// Returns the position of a vertex.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn point(&self, id: VertexId) -> Result<Point3> {
        Ok(self.vertex(id)?.point)
    }

    /// Number of vertices ever created.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    // --- Line operations ---

    /// Returns the line between `a` and `b` (in either order), creating it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if either vertex is unknown or `a == b`.
    pub fn add_line(&mut self, a: VertexId, b: VertexId) -> Result<LineId> {
        self.vertex(a)?;
        self.vertex(b)?;
        if a == b {
            return Err(GeometryError::InvalidInputGeometry("line endpoints coincide".into()).into());
        }
        if let Some(&id) = self.line_index.get(&line_key(a, b)) {
            trace!(?id, "line reused");
            return Ok(id);
        }
        let data = LineData::new(a, b);
        let key = data.key();
        let id = self.lines.insert(data);
        self.line_index.insert(key, id);
        self.record(|j| j.created_lines.push(id));
        Ok(id)
    }

    /// Looks up the live line between `a` and `b`.
    #[must_use]
    pub fn find_line(&self, a: VertexId, b: VertexId) -> Option<LineId> {
        self.line_index.get(&line_key(a, b)).copied()
    }

    /// Returns a reference to the line data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn line(&self, id: LineId) -> Result<&LineData> {
        self.lines
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("line").into())
    }

    /// Vector from the line's first vertex to its second.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or its vertices are not found.
    pub fn line_vector(&self, id: LineId) -> Result<Vector3> {
        let [a, b] = self.line(id)?.vertices;
        Ok(self.point(b)? - self.point(a)?)
    }

    /// Tags a line for deletion. Tagging twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn delete_line(&mut self, id: LineId) -> Result<()> {
        let data = self
            .lines
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("line"))?;
        if data.deleted {
            return Ok(());
        }
        data.deleted = true;
        let key = data.key();
        if self.line_index.get(&key) == Some(&id) {
            self.line_index.remove(&key);
        }
        self.record(|j| j.tagged_lines.push(id));
        Ok(())
    }

    /// Number of lines ever created.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    // --- Rectangle operations ---

    /// Returns the rectangle bounded by `lines` (in any order), creating it
    /// if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a line is unknown or tagged, or the lines do not
    /// form a closed planar loop of four distinct corners with right angles.
    pub fn add_rectangle(&mut self, lines: [LineId; 4]) -> Result<RectangleId> {
        if let Some(&id) = self.rectangle_index.get(&rectangle_key(lines)) {
            trace!(?id, "rectangle reused");
            return Ok(id);
        }
        let data = self.build_rectangle(lines)?;
        let key = data.key();
        let id = self.rectangles.insert(data);
        self.rectangle_index.insert(key, id);
        self.record(|j| j.created_rectangles.push(id));
        Ok(id)
    }

    /// Returns a reference to the rectangle data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn rectangle(&self, id: RectangleId) -> Result<&RectangleData> {
        self.rectangles
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("rectangle").into())
    }

    /// Tags a rectangle for deletion. Tagging twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn delete_rectangle(&mut self, id: RectangleId) -> Result<()> {
        let data = self
            .rectangles
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("rectangle"))?;
        if data.deleted {
            return Ok(());
        }
        data.deleted = true;
        let key = data.key();
        if self.rectangle_index.get(&key) == Some(&id) {
            self.rectangle_index.remove(&key);
        }
        self.record(|j| j.tagged_rectangles.push(id));
        Ok(())
    }

    /// Number of rectangles ever created.
    #[must_use]
    pub fn rectangle_count(&self) -> usize {
        self.rectangles.len()
    }

    // --- Cuboid operations ---

    /// Returns the cuboid bounded by `rectangles` (in any order), creating
    /// it if needed. The first rectangle is the reference face for
    /// classification.
    ///
    /// # Errors
    ///
    /// Returns an error if a rectangle is unknown or tagged, or the faces do
    /// not classify into three orthogonal pairs sharing 12 edges and 8
    /// corners.
    pub fn add_cuboid(&mut self, rectangles: [RectangleId; 6]) -> Result<CuboidId> {
        if let Some(&id) = self.cuboid_index.get(&cuboid_key(rectangles)) {
            trace!(?id, "cuboid reused");
            return Ok(id);
        }
        for &face in &rectangles {
            if self.rectangle(face)?.deleted {
                return Err(TopologyError::Deleted("rectangle").into());
            }
        }
        let assembly = cuboid::assemble(self, rectangles)?;
        let centroid = self.add_vertex(assembly.centroid);
        let data = CuboidData {
            rectangles: assembly.rectangles,
            lines: assembly.lines,
            vertices: assembly.vertices,
            centroid,
            id: None,
            zone_ids: Vec::new(),
            deleted: false,
        };
        let key = data.key();
        let id = self.cuboids.insert(data);
        self.cuboid_index.insert(key, id);
        self.record(|j| j.created_cuboids.push(id));
        Ok(id)
    }

    /// Returns a reference to the cuboid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cuboid(&self, id: CuboidId) -> Result<&CuboidData> {
        self.cuboids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("cuboid").into())
    }

    /// Returns a mutable reference to the cuboid data, or an error if not found.
    ///
    /// Only the ID and zone list are mutable through the returned reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn cuboid_mut(&mut self, id: CuboidId) -> Result<&mut CuboidData> {
        self.cuboids
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("cuboid").into())
    }

    /// Tags a cuboid for deletion. Tagging twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn delete_cuboid(&mut self, id: CuboidId) -> Result<()> {
        let data = self
            .cuboids
            .get_mut(id)
            .ok_or(TopologyError::EntityNotFound("cuboid"))?;
        if data.deleted {
            return Ok(());
        }
        data.deleted = true;
        let key = data.key();
        if self.cuboid_index.get(&key) == Some(&id) {
            self.cuboid_index.remove(&key);
        }
        self.record(|j| j.tagged_cuboids.push(id));
        Ok(())
    }

    /// Iterates over the cuboids not tagged for deletion.
    pub fn live_cuboids(&self) -> impl Iterator<Item = CuboidId> + '_ {
        self.cuboids
            .iter()
            .filter(|(_, data)| !data.deleted)
            .map(|(id, _)| id)
    }

    /// Number of cuboids ever created.
    #[must_use]
    pub fn cuboid_count(&self) -> usize {
        self.cuboids.len()
    }

    // --- Transactions ---

    /// Runs `f` so that its store mutations are all-or-nothing.
    ///
    /// If `f` returns an error, every entity it created is removed and every
    /// deletion tag it set is cleared, restoring the dedup indices.
    /// Transactions nest; an inner commit folds into the outer one.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`.
    pub fn atomic<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let outer = self.journal.replace(Journal::default());
        let result = f(self);
        let journal = std::mem::replace(&mut self.journal, outer).unwrap_or_default();
        match result {
            Ok(value) => {
                if let Some(outer) = self.journal.as_mut() {
                    outer.absorb(journal);
                }
                Ok(value)
            }
            Err(err) => {
                if !journal.is_empty() {
                    warn!(%err, "rolling back store mutations");
                    self.rollback(journal);
                }
                Err(err)
            }
        }
    }

    fn rollback(&mut self, journal: Journal) {
        for id in journal.created_cuboids.into_iter().rev() {
            if let Some(data) = self.cuboids.remove(id) {
                let key = data.key();
                if self.cuboid_index.get(&key) == Some(&id) {
                    self.cuboid_index.remove(&key);
                }
            }
        }
        for id in journal.created_rectangles.into_iter().rev() {
            if let Some(data) = self.rectangles.remove(id) {
                let key = data.key();
                if self.rectangle_index.get(&key) == Some(&id) {
                    self.rectangle_index.remove(&key);
                }
            }
        }
        for id in journal.created_lines.into_iter().rev() {
            if let Some(data) = self.lines.remove(id) {
                let key = data.key();
                if self.line_index.get(&key) == Some(&id) {
                    self.line_index.remove(&key);
                }
            }
        }
        for id in journal.created_vertices.into_iter().rev() {
            if let Some(data) = self.vertices.remove(id) {
                let key = self.grid_key(&data.point);
                if let Some(bucket) = self.vertex_index.get_mut(&key) {
                    bucket.retain(|&v| v != id);
                    if bucket.is_empty() {
                        self.vertex_index.remove(&key);
                    }
                }
            }
        }

        for id in journal.tagged_cuboids {
            if let Some(data) = self.cuboids.get_mut(id) {
                data.deleted = false;
                self.cuboid_index.insert(data.key(), id);
            }
        }
        for id in journal.tagged_rectangles {
            if let Some(data) = self.rectangles.get_mut(id) {
                data.deleted = false;
                self.rectangle_index.insert(data.key(), id);
            }
        }
        for id in journal.tagged_lines {
            if let Some(data) = self.lines.get_mut(id) {
                data.deleted = false;
                self.line_index.insert(data.key(), id);
            }
        }
    }

    fn record(&mut self, f: impl FnOnce(&mut Journal)) {
        if let Some(journal) = self.journal.as_mut() {
            f(journal);
        }
    }

    // Out-of-range coordinates saturate into the outermost cells.
    #[allow(clippy::cast_possible_truncation)]
    fn grid_key(&self, point: &Point3) -> GridKey {
        let cell = self.tolerance.linear;
        [
            (point.x / cell).floor() as i64,
            (point.y / cell).floor() as i64,
            (point.z / cell).floor() as i64,
        ]
    }

    fn live_line(&self, id: LineId) -> Result<&LineData> {
        let data = self.line(id)?;
        if data.deleted {
            return Err(TopologyError::Deleted("line").into());
        }
        Ok(data)
    }

    fn build_rectangle(&self, lines: [LineId; 4]) -> Result<RectangleData> {
        let invalid = |message: &str| GeometryError::InvalidInputGeometry(message.into());

        let key = rectangle_key(lines);
        if key.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("rectangle lines are not distinct").into());
        }
        let mut ends = [[VertexId::default(); 2]; 4];
        for (slot, &line) in ends.iter_mut().zip(&lines) {
            *slot = self.live_line(line)?.vertices;
        }

        // Walk the loop starting from the first line.
        let mut order = [ends[0][0], ends[0][1], VertexId::default(), VertexId::default()];
        let mut used = [true, false, false, false];
        for step in 2..4 {
            let current = order[step - 1];
            let next = (1..4).find_map(|i| {
                if used[i] {
                    return None;
                }
                match ends[i] {
                    [a, b] if a == current => Some((i, b)),
                    [a, b] if b == current => Some((i, a)),
                    _ => None,
                }
            });
            let (i, vertex) = next.ok_or_else(|| invalid("lines do not form a closed loop"))?;
            used[i] = true;
            order[step] = vertex;
        }
        let last = used
            .iter()
            .position(|&u| !u)
            .ok_or_else(|| invalid("lines do not form a closed loop"))?;
        if line_key(ends[last][0], ends[last][1]) != line_key(order[3], order[0]) {
            return Err(invalid("lines do not form a closed loop").into());
        }
        for i in 0..4 {
            if order[i + 1..].contains(&order[i]) {
                return Err(invalid("rectangle corners are not distinct").into());
            }
        }

        let p = [
            self.point(order[0])?,
            self.point(order[1])?,
            self.point(order[2])?,
            self.point(order[3])?,
        ];
        let sides = [p[1] - p[0], p[2] - p[1], p[3] - p[2], p[0] - p[3]];
        let angular = self.tolerance.angular;
        for i in 0..4 {
            if !is_perpendicular(&sides[i], &sides[(i + 1) % 4], angular) {
                return Err(invalid("rectangle corners are not right angles").into());
            }
        }
        let normal = sides[0]
            .cross(&sides[1])
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        if (p[3] - p[0]).dot(&normal).abs() > self.tolerance.linear {
            return Err(invalid("rectangle is not planar").into());
        }

        Ok(RectangleData {
            lines,
            vertices: order,
            normal,
            area: sides[0].norm() * sides[1].norm(),
            deleted: false,
        })
    }
}
