//! Whole-mesh algorithms built on the storage layer and the local operators.
//!
//! - **Triangulation**: fan triangulation of every polygon
//! - **Subdivision**: linear and Catmull-Clark rules with a rebuild step,
//!   Loop subdivision through splits and flips
//! - **Remeshing**: isotropic remeshing towards a target edge length
//! - **Simplification**: quadric error metrics over a mutable priority queue

pub mod progress;
pub mod remesh;
pub mod simplify;
pub mod subdivide;
pub mod triangulate;

pub use progress::Progress;

use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Fail with [`MeshError::NotTriangleMesh`] naming the first polygon that is
/// not a triangle.
pub(crate) fn require_triangles<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<()> {
    match mesh.first_non_triangle() {
        Some((face, degree)) => Err(MeshError::NotTriangleMesh {
            face: face.index(),
            degree,
        }),
        None => Ok(()),
    }
}

/// Evaluate `f` for every handle in `ids`, on the rayon pool when `parallel`
/// is set. Output order follows `ids` either way.
pub(crate) fn map_ids<T, R, F>(ids: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Copy + Send + Sync,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    if parallel {
        ids.par_iter().map(|&id| f(id)).collect()
    } else {
        ids.iter().map(|&id| f(id)).collect()
    }
}
