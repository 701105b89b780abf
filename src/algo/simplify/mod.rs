//! Mesh simplification with quadric error metrics.
//!
//! Every vertex carries the sum of the plane quadrics of its incident faces.
//! Edges are scored by the error of their combined quadric at its optimal
//! point and kept in a [`MutablePriorityQueue`]; the cheapest edge is
//! collapsed and the scores around the merged vertex are recomputed, until
//! the requested number of collapses has been made.
//!
//! # Example
//!
//! ```
//! use halfedit::algo::simplify::{simplify, SimplifyOptions};
//! use halfedit::mesh::{primitives, HalfEdgeMesh};
//!
//! let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
//! let collapsed = simplify(&mut mesh, &SimplifyOptions::default()).unwrap();
//! assert_eq!(collapsed, 5);
//! assert_eq!(mesh.num_faces(), 10);
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using Quadric
//!   Error Metrics." SIGGRAPH '97.

mod qem;
mod quadric;
mod queue;

pub use qem::{simplify, simplify_with_progress, EdgeRecord};
pub use quadric::Quadric;
pub use queue::MutablePriorityQueue;

use crate::error::{MeshError, Result};

/// Options for quadric simplification.
#[derive(Debug, Clone)]
pub struct SimplifyOptions {
    /// Number of edge collapses to perform.
    /// If None, a quarter of the face count is used.
    pub deletions: Option<usize>,

    /// Maximum error for a single collapse. The run stops early once the
    /// cheapest remaining collapse costs more than this.
    pub max_error: Option<f64>,

    /// Whether to keep boundary vertices in place (don't collapse edges
    /// touching them).
    pub preserve_boundary: bool,
}

impl SimplifyOptions {
    /// Create options for a fixed number of collapses.
    pub fn with_deletions(deletions: usize) -> Self {
        Self {
            deletions: Some(deletions),
            ..Self::default()
        }
    }

    /// Set maximum error threshold for edge collapses.
    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = Some(max_error);
        self
    }

    /// Set whether to preserve boundary vertices.
    pub fn with_preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Number of collapses to perform on a mesh with `faces` faces.
    pub fn compute_deletions(&self, faces: usize) -> usize {
        self.deletions.unwrap_or(faces / 4)
    }

    /// Check the numeric ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_error) = self.max_error {
            if max_error.is_nan() || max_error < 0.0 {
                return Err(MeshError::invalid_param("max_error", max_error, "must be non-negative"));
            }
        }
        Ok(())
    }
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            deletions: None,
            max_error: None,
            preserve_boundary: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_deletions() {
        assert_eq!(SimplifyOptions::default().compute_deletions(20), 5);
        assert_eq!(SimplifyOptions::default().compute_deletions(3), 0);
        assert_eq!(SimplifyOptions::with_deletions(7).compute_deletions(20), 7);
    }

    #[test]
    fn test_validate() {
        assert!(SimplifyOptions::default().with_max_error(0.0).validate().is_ok());
        assert!(SimplifyOptions::default().with_max_error(-1.0).validate().is_err());
        assert!(SimplifyOptions::default().with_max_error(f64::NAN).validate().is_err());
    }
}
