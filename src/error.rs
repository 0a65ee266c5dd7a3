use thiserror::Error;

/// Top-level error type for the cuboid kernel.
#[derive(Debug, Error)]
pub enum KernelError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Space(#[from] SpaceError),
}

/// Errors raised while validating input geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Faces that cannot be classified orthogonally, a rectangle that is not
    /// a planar axis-aligned quad, or a wrong count of distinct edges/vertices.
    #[error("invalid input geometry: {0}")]
    InvalidInputGeometry(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to topological operations.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("{0} is tagged for deletion")]
    Deleted(&'static str),

    /// A split could not locate or synthesize a required auxiliary vertex,
    /// or a derived construction failed mid-split.
    #[error("topology resolution failure: {0}")]
    ResolutionFailure(String),
}

/// Errors related to the space registry.
#[derive(Debug, Error)]
pub enum SpaceError {
    #[error("space not found")]
    NotFound,
}

impl KernelError {
    /// Returns `true` for [`GeometryError::InvalidInputGeometry`].
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Geometry(GeometryError::InvalidInputGeometry(_))
        )
    }

    /// Returns `true` for [`TopologyError::ResolutionFailure`].
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::Topology(TopologyError::ResolutionFailure(_)))
    }
}

/// Convenience type alias for results using [`KernelError`].
pub type Result<T> = std::result::Result<T, KernelError>;
