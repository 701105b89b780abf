//! Error types for halfedit.
//!
//! Local operators never fail with an error: a declined edit is reported as
//! `None`. Errors are reserved for construction from index lists, for global
//! algorithms whose preconditions do not hold, and for invariant violations
//! found by [`HalfEdgeMesh::validate`](crate::mesh::HalfEdgeMesh::validate).

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a corner.
    #[error("face {face} is degenerate (fewer than 3 distinct corners)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// The mesh has non-manifold topology.
    #[error("mesh has non-manifold topology: {details}")]
    NonManifold {
        /// Description of the non-manifold condition.
        details: String,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) is shared by more than two faces or has inconsistent winding")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A vertex is not referenced by any face.
    #[error("vertex {vertex} is not referenced by any face")]
    IsolatedVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// The connectivity checker found a broken invariant.
    #[error("invariant violated ({invariant}): {details}")]
    InvariantViolation {
        /// Short name of the violated invariant.
        invariant: &'static str,
        /// Which elements are involved.
        details: String,
    },

    /// The operation requires every face to be a triangle.
    #[error("operation requires a triangle mesh, face {face} has {degree} sides")]
    NotTriangleMesh {
        /// Index of the first offending face.
        face: usize,
        /// Its number of sides.
        degree: usize,
    },

    /// The operation requires a closed mesh.
    #[error("operation requires a closed mesh, found {loops} boundary loop(s)")]
    HasBoundary {
        /// Number of boundary loops.
        loops: usize,
    },

    /// Simplification would leave too few faces.
    #[error("cannot remove {deletions} collapses from a mesh with {faces} faces")]
    InsufficientFaces {
        /// Current number of faces.
        faces: usize,
        /// Requested number of collapses.
        deletions: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid algorithm parameter.
    #[error("invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Why the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param(name: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invariant(invariant: &'static str, details: impl Into<String>) -> Self {
        Self::InvariantViolation {
            invariant,
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = MeshError::NotTriangleMesh { face: 3, degree: 4 };
        assert_eq!(
            err.to_string(),
            "operation requires a triangle mesh, face 3 has 4 sides"
        );

        let err = MeshError::invalid_param("smoothing_lambda", 2.0, "must be in [0, 1]");
        assert!(err.to_string().contains("smoothing_lambda"));

        let err = MeshError::invariant("twin", "HE(3)");
        assert!(matches!(err, MeshError::InvariantViolation { invariant: "twin", .. }));
    }
}
