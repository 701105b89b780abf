//! Local topology operators.
//!
//! Each operator takes one element handle and either commits its whole edit
//! and returns a handle to the result, or returns `None` and leaves the mesh
//! untouched. Declining is normal (flipping a boundary edge, collapsing an
//! edge whose endpoints share a third neighbour, ...) and is only logged at
//! trace level.
//!
//! Removed elements are discarded, not deleted: call
//! [`HalfEdgeMesh::validate`](crate::mesh::HalfEdgeMesh::validate) after a
//! batch of edits, or use [`HalfEdgeMesh::collapse_edge_commit`] when later
//! steps need the removal to have taken effect.
//!
//! | Operator | Result |
//! |----------|--------|
//! | [`flip_edge`](crate::mesh::HalfEdgeMesh::flip_edge) | the rotated edge |
//! | [`split_edge`](crate::mesh::HalfEdgeMesh::split_edge) | the midpoint vertex |
//! | [`collapse_edge`](crate::mesh::HalfEdgeMesh::collapse_edge) | the merged vertex |
//! | [`collapse_face`](crate::mesh::HalfEdgeMesh::collapse_face) | the merged vertex |
//! | [`erase_vertex`](crate::mesh::HalfEdgeMesh::erase_vertex) | the merged face |
//! | [`erase_edge`](crate::mesh::HalfEdgeMesh::erase_edge) | the merged face |
//! | [`bevel_vertex`](crate::mesh::HalfEdgeMesh::bevel_vertex) | the new face |
//! | [`bevel_edge`](crate::mesh::HalfEdgeMesh::bevel_edge) | the new face |
//! | [`bevel_face`](crate::mesh::HalfEdgeMesh::bevel_face) | the inset face |

mod bevel;
mod collapse;
mod erase;
mod flip;
mod split;

pub use bevel::BevelOffsets;
