//! Mesh construction from and export to face-vertex lists.
//!
//! Polygons are linked through a directed edge map: the half-edge `a -> b` of
//! one face pairs with `b -> a` of its neighbour. Half-edges left without a
//! partner get a twin on a boundary loop, and each loop becomes one boundary
//! face.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from positions and polygons of any size.
///
/// Polygons must be consistently oriented (counter-clockwise seen from the
/// front), every vertex must be used, and the result must be manifold.
///
/// # Example
/// ```
/// use halfedit::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(2.0, 0.5, 0.0),
/// ];
/// let polygons = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&positions, &polygons).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// assert_eq!(mesh.num_boundary_loops(), 1);
/// ```
pub fn build_from_polygons<I, P>(positions: &[Point3<f64>], polygons: &[P]) -> Result<HalfEdgeMesh<I>>
where
    I: MeshIndex,
    P: AsRef<[usize]>,
{
    if polygons.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    let mut used = vec![false; positions.len()];
    for (fi, polygon) in polygons.iter().enumerate() {
        let corners = polygon.as_ref();
        if corners.len() < 3 {
            return Err(MeshError::DegenerateFace { face: fi });
        }
        for (k, &vi) in corners.iter().enumerate() {
            if vi >= positions.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
            if corners[..k].contains(&vi) {
                return Err(MeshError::DegenerateFace { face: fi });
            }
            used[vi] = true;
        }
    }
    if let Some(vertex) = used.iter().position(|&u| !u) {
        return Err(MeshError::IsolatedVertex { vertex });
    }

    let num_corners: usize = polygons.iter().map(|p| p.as_ref().len()).sum();
    let mut mesh = HalfEdgeMesh::with_capacity(positions.len(), polygons.len());
    let vertex_ids: Vec<VertexId<I>> = positions.iter().map(|&p| mesh.new_vertex(p)).collect();

    // Interior half-edges, keyed by directed (origin, destination).
    let mut directed: HashMap<(usize, usize), HalfEdgeId<I>> = HashMap::with_capacity(num_corners);
    let mut interior: Vec<(HalfEdgeId<I>, usize, usize)> = Vec::with_capacity(num_corners);

    for polygon in polygons {
        let corners = polygon.as_ref();
        let face = mesh.new_face(false);
        let loop_ids: Vec<HalfEdgeId<I>> = corners.iter().map(|_| mesh.new_halfedge()).collect();
        let n = corners.len();

        for k in 0..n {
            let (a, b) = (corners[k], corners[(k + 1) % n]);
            let h = loop_ids[k];
            if directed.insert((a, b), h).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            *mesh.halfedge_mut(h) = HalfEdge {
                origin: vertex_ids[a],
                next: loop_ids[(k + 1) % n],
                face,
                ..HalfEdge::default()
            };
            if !mesh.vertex(vertex_ids[a]).halfedge.is_valid() {
                mesh.vertex_mut(vertex_ids[a]).halfedge = h;
            }
            interior.push((h, a, b));
        }
        mesh.face_mut(face).halfedge = loop_ids[0];
    }

    // Pair twins in input order so edge handles are deterministic.
    let mut boundary_out: HashMap<usize, HalfEdgeId<I>> = HashMap::new();
    let mut rim: Vec<(HalfEdgeId<I>, usize)> = Vec::new();
    for &(h, a, b) in &interior {
        if mesh.halfedge(h).twin.is_valid() {
            continue;
        }
        let edge = mesh.new_edge();
        mesh.edge_mut(edge).halfedge = h;
        mesh.halfedge_mut(h).edge = edge;

        let twin = match directed.get(&(b, a)) {
            Some(&t) => t,
            None => {
                // Boundary half-edge b -> a.
                let t = mesh.new_halfedge();
                mesh.halfedge_mut(t).origin = vertex_ids[b];
                if boundary_out.insert(b, t).is_some() {
                    return Err(MeshError::NonManifold {
                        details: format!("vertex {b} lies on the boundary more than once"),
                    });
                }
                rim.push((t, a));
                t
            }
        };
        mesh.halfedge_mut(twin).edge = edge;
        mesh.halfedge_mut(twin).twin = h;
        mesh.halfedge_mut(h).twin = twin;
    }

    // A boundary half-edge b -> a continues with the one leaving a.
    for &(t, dest) in &rim {
        let next = *boundary_out.get(&dest).ok_or_else(|| MeshError::NonManifold {
            details: format!("boundary loop breaks at vertex {dest}"),
        })?;
        mesh.halfedge_mut(t).next = next;
    }
    for &(t, _) in &rim {
        if mesh.halfedge(t).face.is_valid() {
            continue;
        }
        let face: FaceId<I> = mesh.new_face(true);
        mesh.face_mut(face).halfedge = t;
        let mut h = t;
        loop {
            mesh.halfedge_mut(h).face = face;
            h = mesh.next(h);
            if h == t {
                break;
            }
        }
    }

    // Two separate fans meeting at one vertex cannot be caught edge by edge.
    let mut outgoing = vec![0usize; positions.len()];
    for &(_, a, _) in &interior {
        outgoing[a] += 1;
    }
    for &b in boundary_out.keys() {
        outgoing[b] += 1;
    }
    for v in mesh.vertex_ids() {
        if mesh.valence(v) != outgoing[v.index()] {
            return Err(MeshError::NonManifold {
                details: format!("vertex {} joins more than one fan of faces", v.index()),
            });
        }
    }

    log::trace!(
        "built mesh with {} vertices, {} edges, {} faces, {} boundary loops",
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_faces(),
        mesh.num_boundary_loops()
    );
    Ok(mesh)
}

/// Build a half-edge mesh from triangles.
///
/// # Example
/// ```
/// use halfedit::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_vertices(), 3);
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    positions: &[Point3<f64>],
    triangles: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(positions, triangles)
}

/// Build a half-edge mesh from quads.
pub fn build_from_quads<I: MeshIndex>(
    positions: &[Point3<f64>],
    quads: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(positions, quads)
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Export live vertices and real faces as dense index lists.
    ///
    /// Vertex indices follow the order of [`HalfEdgeMesh::vertex_ids`].
    pub fn to_polygons(&self) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
        let mut dense = vec![usize::MAX; self.vertices.slot_count()];
        let positions: Vec<Point3<f64>> = self
            .vertices()
            .enumerate()
            .map(|(i, (v, vertex))| {
                dense[v.index()] = i;
                vertex.position
            })
            .collect();
        let polygons = self
            .face_ids()
            .map(|f| self.face_vertices(f).map(|v| dense[v.index()]).collect())
            .collect();
        (positions, polygons)
    }

    /// Replace the whole mesh by one built from index lists.
    ///
    /// On error the mesh is left untouched.
    pub fn rebuild_from<P: AsRef<[usize]>>(
        &mut self,
        positions: &[Point3<f64>],
        polygons: &[P],
    ) -> Result<()> {
        *self = build_from_polygons(positions, polygons)?;
        Ok(())
    }
}
