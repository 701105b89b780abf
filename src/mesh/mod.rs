//! Half-edge mesh storage.
//!
//! [`HalfEdgeMesh`] keeps vertices, edges, faces and half-edges in separate
//! arenas addressed by typed handles ([`VertexId`], [`EdgeId`], [`FaceId`],
//! [`HalfEdgeId`]), generic over the integer width through [`MeshIndex`].
//!
//! Erasing is two-phase. Operators call `discard_*`, which only marks an
//! element; [`HalfEdgeMesh::finalize`] removes the marked elements and
//! [`HalfEdgeMesh::validate`] also verifies the connectivity invariants.
//! Handles are never reused, so they stay meaningful across both phases.
//!
//! # Construction
//!
//! ```
//! use halfedit::mesh::{HalfEdgeMesh, build_from_triangles};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! assert!(mesh.validate().is_ok());
//! ```

mod arena;
mod builder;
mod halfedge;
mod index;
pub mod primitives;
mod validate;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles};
pub use halfedge::{
    centroid, polygon_normal, Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex,
    VertexHalfEdgeIter,
};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
