use thiserror::Error;

use crate::point::Point;

/// Failure of a pure geometric primitive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Two points that should span a direction coincide.
    #[error("points {first} and {second} coincide, no direction can be derived")]
    CoincidentPoints { first: Point, second: Point },
}

/// Failure of a whole diagram construction.
///
/// None of these are retried: the input either describes a tessellation this
/// crate can clip or it does not.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DiagramError {
    #[error("at least 2 distinct sites are required, got {0}")]
    TooFewSites(usize),

    #[error("site {index} duplicates an earlier site at {position}")]
    DuplicateSite { index: usize, position: Point },

    #[error("ridge between sites {site_a} and {site_b} has no finite vertex")]
    UnboundedRidge { site_a: usize, site_b: usize },

    #[error("vertex index {index} is out of range for {len} vertices")]
    VertexOutOfRange { index: usize, len: usize },

    #[error("site index {index} is out of range for {len} sites")]
    SiteOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
