//! # halfedit
//!
//! An editable half-edge polygon mesh kernel.
//!
//! halfedit stores a manifold polygon mesh as a closed graph of half-edges
//! and offers the operations an interactive modeller needs on top of it:
//!
//! - **Local operators** ([`edit`]): flip, split, collapse, erase and bevel.
//!   Each commits a whole edit or declines with `None`, never leaving the
//!   graph half rewired.
//! - **Global algorithms** ([`algo`]): triangulation, linear, Catmull-Clark
//!   and Loop subdivision, isotropic remeshing and quadric-error
//!   simplification.
//! - **Deferred removal**: operators only discard elements;
//!   [`HalfEdgeMesh::validate`](mesh::HalfEdgeMesh::validate) drops them
//!   and checks every connectivity invariant.
//!
//! ## Quick Start
//!
//! ```
//! use halfedit::prelude::*;
//!
//! let mut mesh: HalfEdgeMesh = halfedit::mesh::primitives::icosahedron().unwrap();
//!
//! let e = mesh.edge_ids().next().unwrap();
//! let m = mesh.split_edge(e).unwrap();
//! assert_eq!(mesh.valence(m), 4);
//!
//! let e = mesh.vertex_edges(m).next().unwrap();
//! mesh.flip_edge(e);
//! mesh.validate().unwrap();
//! ```
//!
//! ## Building Meshes
//!
//! ```
//! use halfedit::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let polygons: Vec<Vec<usize>> = vec![
//!     vec![0, 3, 2, 1],
//!     vec![0, 1, 4],
//!     vec![1, 2, 4],
//!     vec![2, 3, 4],
//!     vec![3, 0, 4],
//! ];
//!
//! let mut mesh: HalfEdgeMesh = build_from_polygons(&positions, &polygons).unwrap();
//! assert_eq!(mesh.num_faces(), 5);
//!
//! triangulate(&mut mesh);
//! assert_eq!(mesh.num_faces(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod edit;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use halfedit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::remesh::{isotropic_remesh, RemeshOptions};
    pub use crate::algo::simplify::{simplify, SimplifyOptions};
    pub use crate::algo::subdivide::{loop_subdivide, subdivide, SubdivideOptions, SubdivisionScheme};
    pub use crate::algo::triangulate::triangulate;
    pub use crate::algo::Progress;
    pub use crate::edit::BevelOffsets;
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, EdgeId, Face, FaceId, HalfEdge,
        HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
    };
}

pub use nalgebra;
