//! Isotropic remeshing.
//!
//! The algorithm (Botsch & Kobbelt, 2004) drives a triangle mesh towards a
//! uniform target edge length `L` by repeating, each round:
//!
//! 1. **Split** edges longer than 4/3 × L
//! 2. **Collapse** edges shorter than 4/5 × L
//! 3. **Flip** edges to bring vertex valences towards 6 (4 on the boundary)
//! 4. **Tangential smoothing** to even out vertex spacing on the surface
//!
//! Every step runs through the local operators, so the mesh stays a valid
//! half-edge graph between steps and collapses are committed one at a time.
//!
//! # Example
//!
//! ```
//! use halfedit::algo::remesh::{isotropic_remesh, RemeshOptions};
//! use halfedit::mesh::{primitives, HalfEdgeMesh};
//!
//! let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
//! let options = RemeshOptions::with_target_length(0.5).with_iterations(3);
//! isotropic_remesh(&mut mesh, &options).unwrap();
//! assert!(mesh.is_valid());
//! ```
//!
//! # References
//!
//! - Botsch, M., & Kobbelt, L. (2004). "A remeshing approach to multiresolution modeling."
//!   Symposium on Geometry Processing.

mod isotropic;

pub use isotropic::{isotropic_remesh, isotropic_remesh_with_progress};

use nalgebra::{Point3, Vector3};

use crate::algo::map_ids;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

/// Options for isotropic remeshing.
#[derive(Debug, Clone)]
pub struct RemeshOptions {
    /// Target edge length. `None` uses the mean edge length at entry.
    pub target_length: Option<f64>,

    /// Number of remeshing rounds.
    pub iterations: usize,

    /// Keep boundary edges and vertices fixed.
    pub preserve_boundary: bool,

    /// Number of tangential smoothing passes per round.
    pub smoothing_iterations: usize,

    /// Damping factor of each smoothing pass, in `(0, 1]`.
    pub smoothing_lambda: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl RemeshOptions {
    /// Create options with the specified target edge length.
    pub fn with_target_length(target_length: f64) -> Self {
        Self {
            target_length: Some(target_length),
            ..Self::default()
        }
    }

    /// Set the number of remeshing rounds.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set whether to preserve boundary edges.
    pub fn with_preserve_boundary(mut self, preserve: bool) -> Self {
        self.preserve_boundary = preserve;
        self
    }

    /// Set the number of smoothing passes per round.
    pub fn with_smoothing_iterations(mut self, iterations: usize) -> Self {
        self.smoothing_iterations = iterations;
        self
    }

    /// Set the smoothing damping factor.
    pub fn with_smoothing_lambda(mut self, lambda: f64) -> Self {
        self.smoothing_lambda = lambda;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check the numeric ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(length) = self.target_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(MeshError::invalid_param(
                    "target_length",
                    length,
                    "must be positive and finite",
                ));
            }
        }
        if !(self.smoothing_lambda > 0.0 && self.smoothing_lambda <= 1.0) {
            return Err(MeshError::invalid_param(
                "smoothing_lambda",
                self.smoothing_lambda,
                "must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for RemeshOptions {
    fn default() -> Self {
        Self {
            target_length: None,
            iterations: 5,
            preserve_boundary: true,
            smoothing_iterations: 3,
            smoothing_lambda: 0.5,
            parallel: true,
        }
    }
}

/// Move every vertex a fraction `lambda` towards the centroid of its
/// neighbours, keeping only the part of the move that lies in its tangent
/// plane.
pub(crate) fn tangential_smooth<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    lambda: f64,
    preserve_boundary: bool,
    parallel: bool,
) {
    let vertices: Vec<VertexId<I>> = mesh.vertex_ids().collect();

    let relaxed = map_ids(&vertices, parallel, |v| {
        let pos = *mesh.position(v);
        if preserve_boundary && mesh.is_boundary_vertex(v) {
            return pos;
        }
        let (sum, n) = mesh
            .vertex_neighbors(v)
            .fold((Vector3::zeros(), 0usize), |(sum, n), w| (sum + mesh.position(w).coords, n + 1));
        if n == 0 {
            return pos;
        }

        let displacement = sum / n as f64 - pos.coords;
        let normal = mesh.vertex_normal(v);
        let tangent = displacement - normal * normal.dot(&displacement);
        pos + tangent * lambda
    });

    for (v, p) in vertices.into_iter().zip(relaxed) {
        mesh.set_position(v, p);
    }
}

/// Deviation of the four corners of an edge's quad from their ideal valence,
/// before and after a flip.
pub(crate) fn valence_deviation(valences: [usize; 4], targets: [usize; 4], delta: [isize; 4]) -> usize {
    valences
        .iter()
        .zip(targets)
        .zip(delta)
        .map(|((&valence, target), d)| (valence as isize + d).abs_diff(target as isize))
        .sum()
}

/// Ideal valence: 6 inside, 4 on the boundary.
pub(crate) fn target_valence<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> usize {
    if mesh.is_boundary_vertex(v) {
        4
    } else {
        6
    }
}

/// Position a collapse of `a` and `b` would produce.
pub(crate) fn collapse_point<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, a: VertexId<I>, b: VertexId<I>) -> Point3<f64> {
    Point3::from((mesh.position(a).coords + mesh.position(b).coords) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;
    use approx::assert_relative_eq;

    #[test]
    fn test_options_validate() {
        assert!(RemeshOptions::default().validate().is_ok());
        assert!(RemeshOptions::with_target_length(0.1).validate().is_ok());
        assert!(RemeshOptions::with_target_length(-1.0).validate().is_err());
        assert!(RemeshOptions::with_target_length(f64::NAN).validate().is_err());
        assert!(RemeshOptions::default().with_smoothing_lambda(0.0).validate().is_err());
    }

    #[test]
    fn test_smoothing_keeps_flat_grid_flat() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(4).unwrap();
        let rim: Vec<_> = mesh
            .vertex_ids()
            .filter(|&v| mesh.is_boundary_vertex(v))
            .map(|v| *mesh.position(v))
            .collect();
        tangential_smooth(&mut mesh, 0.5, true, true);

        assert!(mesh.vertices().all(|(_, v)| v.position.z.abs() < 1e-12));
        let after: Vec<_> = mesh
            .vertex_ids()
            .filter(|&v| mesh.is_boundary_vertex(v))
            .map(|v| *mesh.position(v))
            .collect();
        assert_eq!(rim, after);
    }

    #[test]
    fn test_smoothing_regular_vertex_stays() {
        // An icosahedron vertex sits straight above the centroid of its neighbours.
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let before = *mesh.position(VertexId::new(0));
        tangential_smooth(&mut mesh, 1.0, true, false);
        assert_relative_eq!(*mesh.position(VertexId::new(0)), before, epsilon = 1e-9);
    }

    #[test]
    fn test_valence_deviation() {
        assert_eq!(valence_deviation([7, 7, 5, 5], [6; 4], [0; 4]), 4);
        assert_eq!(valence_deviation([7, 7, 5, 5], [6; 4], [-1, -1, 1, 1]), 0);
    }
}
