//! Error types for dualcell.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// A star-dependent quantity was requested before the vertex star was ordered.
    #[error("vertex {vertex} star must be ordered before dual quantities can be computed")]
    StarNotOrdered {
        /// The vertex index.
        vertex: usize,
    },

    /// An operation defined only for triangles was applied to a larger face.
    #[error("face {face} is not a triangle")]
    NotATriangle {
        /// The face index.
        face: usize,
    },

    /// An operation defined only for interior half-edges was applied to a
    /// boundary half-edge.
    #[error("half-edge {edge} lies on the boundary")]
    BoundaryEdge {
        /// The half-edge index.
        edge: usize,
    },

    /// The half-edge structure is internally inconsistent.
    ///
    /// This always indicates a bug in how edges and faces are updated, or
    /// malformed input the loader failed to reject.
    #[error("inconsistent mesh topology: {details}")]
    InconsistentTopology {
        /// Description of the inconsistency.
        details: String,
    },

    /// Algorithm failed to converge.
    #[error("algorithm failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },
}

impl MeshError {
    /// Create an [`MeshError::InconsistentTopology`] with the given details.
    pub fn inconsistent<S: Into<String>>(details: S) -> Self {
        MeshError::InconsistentTopology {
            details: details.into(),
        }
    }
}
