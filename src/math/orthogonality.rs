use super::{Vector3, TOLERANCE};

/// Returns `true` if `a` and `b` point along the same axis (either sense).
///
/// Both vectors are normalized first; the test is `|a · b| > 1 - angular`.
/// Zero-length vectors are never parallel to anything.
#[must_use]
pub fn is_parallel(a: &Vector3, b: &Vector3, angular: f64) -> bool {
    match (a.try_normalize(TOLERANCE), b.try_normalize(TOLERANCE)) {
        (Some(a), Some(b)) => a.dot(&b).abs() > 1.0 - angular,
        _ => false,
    }
}

/// Returns `true` if `a` and `b` are perpendicular: `|a · b| < angular`
/// after normalization. Zero-length vectors are never perpendicular.
#[must_use]
pub fn is_perpendicular(a: &Vector3, b: &Vector3, angular: f64) -> bool {
    match (a.try_normalize(TOLERANCE), b.try_normalize(TOLERANCE)) {
        (Some(a), Some(b)) => a.dot(&b).abs() < angular,
        _ => false,
    }
}
