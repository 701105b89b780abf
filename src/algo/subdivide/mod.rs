//! Mesh subdivision.
//!
//! # Linear and Catmull-Clark
//!
//! Both schemes work on arbitrary polygon meshes in two stages. A *position
//! rule* fills the `new_position` slot of every vertex, edge and face. The
//! *rebuild* then gives each of those elements one vertex of the refined
//! mesh and emits one quad per half-edge of a real face, connecting the
//! half-edge's origin, its edge, its face and the edge before it:
//!
//! ```text
//!   v_{i-1} ---- e_{i-1} ---- v_i
//!      |            |          |
//!      |          quad         |
//!      |            |          |
//!      +---------- f --------- e_i ---- v_{i+1}
//! ```
//!
//! The linear rule keeps the surface in place (vertices stay, edge points are
//! midpoints, face points are centroids). Catmull-Clark (Catmull & Clark,
//! 1978) smooths closed meshes:
//!
//! - face point: centroid of the face
//! - edge point: mean of the two endpoints and the two adjacent face points
//! - vertex point: `(Q + 2R + (n - 3) S) / n` with `Q` the mean adjacent face
//!   point, `R` the mean adjacent edge point and `S` the old position
//!
//! # Loop
//!
//! Loop subdivision (Loop, 1987) refines triangle meshes in place with the
//! local operators: every original edge is split, the new edges joining an
//! old and a new vertex are flipped, then the precomputed positions are
//! applied.
//!
//! # Example
//!
//! ```
//! use halfedit::algo::subdivide::{subdivide, SubdivideOptions, SubdivisionScheme};
//! use halfedit::mesh::{primitives, HalfEdgeMesh};
//!
//! let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
//! subdivide(&mut mesh, SubdivisionScheme::CatmullClark, &SubdivideOptions::new(2)).unwrap();
//! assert_eq!(mesh.num_faces(), 96);
//! ```

mod catmull_clark;
mod linear;
mod loop_subdivision;

pub use catmull_clark::catmull_clark_subdivide_positions;
pub use linear::linear_subdivide_positions;
pub use loop_subdivision::{loop_subdivide, loop_subdivide_with_progress};

use nalgebra::Point3;

use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Options for subdivision algorithms.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision rounds.
    pub iterations: usize,

    /// Evaluate position rules on the rayon pool (default: true).
    pub parallel: bool,
}

impl SubdivideOptions {
    /// Options running `iterations` rounds.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            parallel: true,
        }
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
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Position rule used by [`subdivide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubdivisionScheme {
    /// Refine without moving the surface.
    Linear,
    /// Catmull-Clark smoothing; closed meshes only.
    CatmullClark,
}

/// Positions and quads of the refined mesh, read from the `new_position`
/// slots filled by a position rule.
///
/// Vertices get indices `0..V`, edges `V..V+E` and real faces
/// `V+E..V+E+F`, each in handle order.
pub fn subdivision_quads<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> (Vec<Point3<f64>>, Vec<[usize; 4]>) {
    let mut vertex_index = vec![usize::MAX; mesh.vertices.slot_count()];
    let mut edge_index = vec![usize::MAX; mesh.edges.slot_count()];
    let mut face_index = vec![usize::MAX; mesh.faces.slot_count()];
    let mut positions = Vec::with_capacity(mesh.num_vertices() + mesh.num_edges() + mesh.num_faces());

    for (v, vertex) in mesh.vertices() {
        vertex_index[v.index()] = positions.len();
        positions.push(vertex.new_position);
    }
    for e in mesh.edge_ids() {
        edge_index[e.index()] = positions.len();
        positions.push(mesh.edge(e).new_position);
    }
    for f in mesh.face_ids() {
        face_index[f.index()] = positions.len();
        positions.push(mesh.face(f).new_position);
    }

    let mut quads = Vec::with_capacity(mesh.num_halfedges());
    for f in mesh.face_ids() {
        let center = face_index[f.index()];
        let ring: Vec<_> = mesh.face_halfedges(f).collect();
        let mut before = edge_index[mesh.edge_of(ring[ring.len() - 1]).index()];
        for h in ring {
            let side = edge_index[mesh.edge_of(h).index()];
            quads.push([vertex_index[mesh.origin(h).index()], side, center, before]);
            before = side;
        }
    }
    (positions, quads)
}

/// Replace the mesh by the quad mesh described by [`subdivision_quads`].
pub fn rebuild_subdivided<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    let (positions, quads) = subdivision_quads(mesh);
    mesh.rebuild_from(&positions, &quads)
}

/// Run `options.iterations` rounds of a rule followed by a rebuild.
///
/// Fails before touching the mesh if the rule does not apply (Catmull-Clark
/// on a mesh with boundary).
pub fn subdivide<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    scheme: SubdivisionScheme,
    options: &SubdivideOptions,
) -> Result<()> {
    subdivide_with_progress(mesh, scheme, options, &Progress::none())
}

/// [`subdivide`] with progress reporting.
pub fn subdivide_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    scheme: SubdivisionScheme,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<()> {
    for round in 0..options.iterations {
        progress.report(round, options.iterations, "Subdividing");
        match scheme {
            SubdivisionScheme::Linear => linear::fill_positions(mesh, options.parallel),
            SubdivisionScheme::CatmullClark => catmull_clark::fill_positions(mesh, options.parallel)?,
        }
        rebuild_subdivided(mesh)?;
        log::debug!(
            "{scheme:?} round {}: {} vertices, {} faces",
            round + 1,
            mesh.num_vertices(),
            mesh.num_faces()
        );
    }
    progress.report(options.iterations, options.iterations, "Subdividing");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;

    #[test]
    fn test_quads_per_halfedge() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        linear_subdivide_positions(&mut mesh);
        let (positions, quads) = subdivision_quads(&mesh);
        assert_eq!(positions.len(), 4 + 6 + 4);
        assert_eq!(quads.len(), 12);
        for quad in &quads {
            assert!(quad[0] < 4);
            assert!((4..10).contains(&quad[1]) && (4..10).contains(&quad[3]));
            assert!(quad[2] >= 10);
        }
    }

    #[test]
    fn test_linear_subdivide_tetrahedron() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        subdivide(&mut mesh, SubdivisionScheme::Linear, &SubdivideOptions::new(1)).unwrap();
        assert_eq!(mesh.num_vertices(), 14);
        assert_eq!(mesh.num_faces(), 12);
        assert_eq!(mesh.num_edges(), 24);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_subdivide_open_grid_linear() {
        let mut mesh: HalfEdgeMesh = primitives::quad_grid(2).unwrap();
        subdivide(&mut mesh, SubdivisionScheme::Linear, &SubdivideOptions::new(1).sequential()).unwrap();
        assert_eq!(mesh.num_faces(), 16);
        assert_eq!(mesh.num_vertices(), 25);
        assert_eq!(mesh.num_boundary_loops(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_catmull_clark_rejects_boundary_untouched() {
        let mut mesh: HalfEdgeMesh = primitives::quad_grid(2).unwrap();
        let result = subdivide(&mut mesh, SubdivisionScheme::CatmullClark, &SubdivideOptions::new(1));
        assert!(matches!(result, Err(crate::error::MeshError::HasBoundary { loops: 1 })));
        assert_eq!(mesh.num_faces(), 4);
    }

    #[test]
    fn test_zero_iterations() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        subdivide(&mut mesh, SubdivisionScheme::CatmullClark, &SubdivideOptions::new(0)).unwrap();
        assert_eq!(mesh.num_faces(), 6);
    }
}
