use crate::error::{KernelError, Result, TopologyError};
use crate::math::{closest_point_on_segment, is_parallel, is_perpendicular, Point3, Vector3};
use crate::operations::query::PointLocation;
use crate::topology::{CuboidId, LineId, RectangleId, VertexId, VertexStore};

/// Child face order handed to `add_cuboid`: `(normal axis, side)`.
/// The first entry is the reference face.
const FACE_ORDER: [(usize, usize); 6] = [(2, 0), (2, 1), (0, 0), (0, 1), (1, 0), (1, 1)];

/// Corner offsets of a face loop, in the face's two in-plane axes.
const FACE_LOOP: [(usize, usize); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

pub(crate) fn unresolved(message: impl Into<String>) -> KernelError {
    TopologyError::ResolutionFailure(message.into()).into()
}

/// Corner 0 of a cuboid and the three edge vectors leaving it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CornerFrame {
    origin: Point3,
    axes: [Vector3; 3],
}

impl CornerFrame {
    /// Derives the frame from the cuboid's corner 0, which lies on face 0.
    pub fn of(store: &VertexStore, cuboid: CuboidId) -> Result<Self> {
        let data = store.cuboid(cuboid)?;
        let origin_id = data.vertices()[0];
        let origin = store.point(origin_id)?;

        let mut axes = Vec::with_capacity(3);
        for &line in data.lines() {
            if let Some(other) = store.line(line)?.other(origin_id) {
                axes.push(store.point(other)? - origin);
            }
        }
        let axes: [Vector3; 3] = axes
            .try_into()
            .map_err(|_| unresolved("corner 0 does not meet exactly three edges"))?;

        let angular = store.tolerance().angular;
        for (a, b) in [(0, 1), (1, 2), (0, 2)] {
            if !is_perpendicular(&axes[a], &axes[b], angular) {
                return Err(unresolved("cuboid corner frame is not orthogonal"));
            }
        }
        Ok(Self { origin, axes })
    }

    /// Index of the frame axis parallel to `direction`.
    fn axis_of(&self, direction: &Vector3, angular: f64) -> Option<usize> {
        (0..3).find(|&i| is_parallel(direction, &self.axes[i], angular))
    }

    /// Parameter of the projection of `point` on `axis`: 0 at the origin,
    /// 1 at the far end of the edge.
    fn parameter(&self, axis: usize, point: &Point3) -> Option<f64> {
        closest_point_on_segment(&self.origin, &(self.origin + self.axes[axis]), point)
            .map(|projection| projection.parameter)
    }

    fn point_at(&self, t: [f64; 3]) -> Point3 {
        self.origin + self.axes[0] * t[0] + self.axes[1] * t[1] + self.axes[2] * t[2]
    }
}

/// Entities produced by a committed split.
#[derive(Debug)]
pub(crate) struct Refinement {
    pub children: Vec<CuboidId>,
    pub new_vertices: Vec<VertexId>,
    pub lines: Vec<LineId>,
    pub rectangles: Vec<RectangleId>,
}

/// Fully resolved refinement of one cuboid at one vertex.
///
/// The plan is a tensor lattice in the parent's corner frame: 3 parameters
/// `{0, t, 1}` along every cut axis, 2 parameters `{0, 1}` along the
/// others. Building a plan reads the store only.
#[derive(Debug)]
pub(crate) struct SplitPlan {
    parent: CuboidId,
    cut: [bool; 3],
    counts: [usize; 3],
    points: Vec<Point3>,
    known: Vec<Option<VertexId>>,
    corner: Vec<bool>,
    retired_lines: Vec<LineId>,
    retired_rectangles: Vec<RectangleId>,
}

impl SplitPlan {
    /// Resolves every lattice vertex of splitting `parent` at `vertex`,
    /// which was found at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ResolutionFailure`] if `vertex` does not
    /// project strictly inside the parent along every cut axis, does not sit
    /// on the claimed edge or face, or a lattice corner is not one of the
    /// parent's corners.
    pub fn resolve(
        store: &VertexStore,
        parent: CuboidId,
        vertex: VertexId,
        location: PointLocation,
    ) -> Result<Self> {
        let tolerance = store.tolerance();
        let frame = CornerFrame::of(store, parent)?;
        let v = store.point(vertex)?;

        let cut = match location {
            PointLocation::Edge(line) => {
                let axis = frame
                    .axis_of(&store.line_vector(line)?, tolerance.angular)
                    .ok_or_else(|| unresolved("split edge is not along a cuboid axis"))?;
                let mut cut = [false; 3];
                cut[axis] = true;
                cut
            }
            PointLocation::Face(face) => {
                let normal = store.rectangle(face)?.normal();
                let axis = frame
                    .axis_of(normal, tolerance.angular)
                    .ok_or_else(|| unresolved("split face is not normal to a cuboid axis"))?;
                let mut cut = [true; 3];
                cut[axis] = false;
                cut
            }
            PointLocation::Interior => [true; 3],
        };

        let mut params: [Vec<f64>; 3] = Default::default();
        let mut at_vertex = [0usize; 3];
        for axis in 0..3 {
            let t = frame
                .parameter(axis, &v)
                .ok_or_else(|| unresolved("cuboid has a zero-length edge"))?;
            let slack = tolerance.linear / frame.axes[axis].norm();
            if cut[axis] {
                if t <= slack || t >= 1.0 - slack {
                    return Err(unresolved(format!(
                        "vertex does not project inside the cuboid along axis {axis} (t = {t})"
                    )));
                }
                params[axis] = vec![0.0, t, 1.0];
                at_vertex[axis] = 1;
            } else {
                at_vertex[axis] = if t.abs() <= slack {
                    0
                } else if (t - 1.0).abs() <= slack {
                    1
                } else {
                    return Err(unresolved(format!(
                        "vertex is not on the {location:?} it was located on"
                    )));
                };
                params[axis] = vec![0.0, 1.0];
            }
        }

        let data = store.cuboid(parent)?;
        let mut corners = Vec::with_capacity(8);
        for &corner in data.vertices() {
            corners.push((corner, store.point(corner)?));
        }

        let counts = [params[0].len(), params[1].len(), params[2].len()];
        let total = counts.iter().product();
        let mut points = Vec::with_capacity(total);
        let mut known = Vec::with_capacity(total);
        let mut corner = Vec::with_capacity(total);
        for i in 0..counts[0] {
            for j in 0..counts[1] {
                for k in 0..counts[2] {
                    let index = [i, j, k];
                    let point = frame.point_at([params[0][i], params[1][j], params[2][k]]);
                    let is_corner = (0..3).all(|a| index[a] == 0 || index[a] == counts[a] - 1);
                    let id = if is_corner {
                        let found = corners
                            .iter()
                            .find(|(_, p)| (p - point).norm() <= tolerance.linear)
                            .map(|&(id, _)| id)
                            .ok_or_else(|| {
                                unresolved(format!("no parent corner at lattice point {point}"))
                            })?;
                        Some(found)
                    } else if index == at_vertex {
                        if (v - point).norm() > tolerance.linear {
                            return Err(unresolved("vertex does not coincide with its projection"));
                        }
                        Some(vertex)
                    } else {
                        None
                    };
                    points.push(point);
                    known.push(id);
                    corner.push(is_corner);
                }
            }
        }

        let mut retired_lines = Vec::new();
        for &line in data.lines() {
            let axis = frame
                .axis_of(&store.line_vector(line)?, tolerance.angular)
                .ok_or_else(|| unresolved("cuboid edge is not along a frame axis"))?;
            if cut[axis] {
                retired_lines.push(line);
            }
        }
        let mut retired_rectangles = Vec::new();
        for &face in data.rectangles() {
            let normal = store.rectangle(face)?.normal();
            let spans_cut =
                (0..3).any(|a| cut[a] && is_perpendicular(normal, &frame.axes[a], tolerance.angular));
            if spans_cut {
                retired_rectangles.push(face);
            }
        }

        Ok(Self {
            parent,
            cut,
            counts,
            points,
            known,
            corner,
            retired_lines,
            retired_rectangles,
        })
    }

    /// Number of cut axes: 1, 2 or 3.
    pub fn cut_axes(&self) -> usize {
        self.cut.iter().filter(|&&c| c).count()
    }

    /// Parent edges tagged by the commit.
    pub fn retired_lines(&self) -> &[LineId] {
        &self.retired_lines
    }

    /// Parent faces tagged by the commit.
    pub fn retired_rectangles(&self) -> &[RectangleId] {
        &self.retired_rectangles
    }

    /// Tags the parent's superseded entities, builds every child through the
    /// store's dedup factories and tags the parent, as one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ResolutionFailure`] if a child cannot be
    /// constructed. The store is unchanged on error.
    pub fn commit(&self, store: &mut VertexStore) -> Result<Refinement> {
        store.atomic(|store| {
            for &line in &self.retired_lines {
                store.delete_line(line)?;
            }
            for &face in &self.retired_rectangles {
                store.delete_rectangle(face)?;
            }

            let ids: Vec<VertexId> = self
                .points
                .iter()
                .zip(&self.known)
                .map(|(point, known)| known.unwrap_or_else(|| store.add_vertex(*point)))
                .collect();

            let mut children = Vec::new();
            let mut lines = Vec::new();
            let mut rectangles = Vec::new();
            for i in 0..self.counts[0] - 1 {
                for j in 0..self.counts[1] - 1 {
                    for k in 0..self.counts[2] - 1 {
                        let child = self
                            .build_cell(store, &ids, [i, j, k], &mut lines, &mut rectangles)
                            .map_err(|err| unresolved(format!("child construction failed: {err}")))?;
                        children.push(child);
                    }
                }
            }
            store.delete_cuboid(self.parent)?;

            let new_vertices = ids
                .iter()
                .zip(&self.corner)
                .filter(|(_, is_corner)| !**is_corner)
                .map(|(&id, _)| id)
                .collect();
            Ok(Refinement {
                children,
                new_vertices,
                lines,
                rectangles,
            })
        })
    }

    fn index(&self, [i, j, k]: [usize; 3]) -> usize {
        (i * self.counts[1] + j) * self.counts[2] + k
    }

    fn build_cell(
        &self,
        store: &mut VertexStore,
        ids: &[VertexId],
        cell: [usize; 3],
        lines: &mut Vec<LineId>,
        rectangles: &mut Vec<RectangleId>,
    ) -> Result<CuboidId> {
        let mut faces = [RectangleId::default(); 6];
        for (slot, &(axis, side)) in faces.iter_mut().zip(&FACE_ORDER) {
            let (u, w) = match axis {
                0 => (1, 2),
                1 => (0, 2),
                _ => (0, 1),
            };
            let mut quad = [VertexId::default(); 4];
            for (corner, &(du, dw)) in quad.iter_mut().zip(&FACE_LOOP) {
                let mut offset = cell;
                offset[axis] += side;
                offset[u] += du;
                offset[w] += dw;
                *corner = ids[self.index(offset)];
            }

            let mut edges = [LineId::default(); 4];
            for (e, edge) in edges.iter_mut().enumerate() {
                *edge = store.add_line(quad[e], quad[(e + 1) % 4])?;
                if !lines.contains(edge) {
                    lines.push(*edge);
                }
            }
            *slot = store.add_rectangle(edges)?;
            if !rectangles.contains(slot) {
                rectangles.push(*slot);
            }
        }
        store.add_cuboid(faces)
    }
}
