use crate::error::{GeometryError, Result};

/// Comparison tolerances used by the store and all geometric predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Distance below which two points are the same vertex.
    pub linear: f64,
    /// Dot-product threshold of the parallel/perpendicular tests.
    pub angular: f64,
}

impl Tolerance {
    /// Creates a tolerance pair.
    ///
    /// # Errors
    ///
    /// Returns an error unless `linear` is finite and positive and
    /// `angular` lies in `(0, 1)`.
    pub fn new(linear: f64, angular: f64) -> Result<Self> {
        Self { linear, angular }.validated()
    }

    /// Returns `self` if both tolerances are usable.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn validated(self) -> Result<Self> {
        if !(self.linear.is_finite() && self.linear > 0.0) {
            return Err(GeometryError::InvalidInputGeometry(format!(
                "linear tolerance must be finite and positive, got {}",
                self.linear
            ))
            .into());
        }
        if !(self.angular > 0.0 && self.angular < 1.0) {
            return Err(GeometryError::InvalidInputGeometry(format!(
                "angular tolerance must lie in (0, 1), got {}",
                self.angular
            ))
            .into());
        }
        Ok(self)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: 1e-6,
            angular: 0.01,
        }
    }
}
