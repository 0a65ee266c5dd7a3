use super::{Point3, Vector3, TOLERANCE};

/// Result of projecting a point onto the line through a segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentProjection {
    /// Closest point on the infinite line through the segment.
    pub point: Point3,
    /// Unclamped parameter of `point`: 0 at the start, 1 at the end.
    pub parameter: f64,
    /// Distance from the query point to `point`.
    pub distance: f64,
    /// Length of the segment.
    pub length: f64,
}

impl SegmentProjection {
    /// Returns `true` if the query point lies on the closed segment,
    /// within `linear` distance.
    #[must_use]
    pub fn on_segment(&self, linear: f64) -> bool {
        let slack = linear / self.length;
        self.distance <= linear && self.parameter >= -slack && self.parameter <= 1.0 + slack
    }
}

/// Projects `point` onto the line through `start` and `end`.
///
/// Returns `None` for a degenerate segment.
#[must_use]
pub fn closest_point_on_segment(
    start: &Point3,
    end: &Point3,
    point: &Point3,
) -> Option<SegmentProjection> {
    let dir = end - start;
    let length = dir.norm();
    if length < TOLERANCE {
        return None;
    }
    let parameter = (point - start).dot(&dir) / (length * length);
    let closest = start + dir * parameter;
    Some(SegmentProjection {
        point: closest,
        parameter,
        distance: (point - closest).norm(),
        length,
    })
}

/// Projects `point` onto the plane through `origin` with unit `normal`.
#[must_use]
pub fn closest_point_on_plane(origin: &Point3, normal: &Vector3, point: &Point3) -> Point3 {
    point - normal * (point - origin).dot(normal)
}
