//! Catmull-Clark subdivision rule.

use nalgebra::{Point3, Vector3};

use crate::algo::map_ids;
use crate::error::{MeshError, Result};
use crate::mesh::{centroid, EdgeId, FaceId, HalfEdgeMesh, MeshIndex, VertexId};

/// Fill `new_position` with the Catmull-Clark face, edge and vertex points.
///
/// The vertex rule assumes every vertex is surrounded by faces, so meshes
/// with boundary are rejected with [`MeshError::HasBoundary`] before any slot
/// is written.
pub fn catmull_clark_subdivide_positions<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> Result<()> {
    fill_positions(mesh, false)
}

pub(super) fn fill_positions<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, parallel: bool) -> Result<()> {
    if mesh.has_boundary() {
        return Err(MeshError::HasBoundary {
            loops: mesh.num_boundary_loops(),
        });
    }

    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    let face_points = map_ids(&faces, parallel, |f| mesh.face_centroid(f));
    for (&f, &p) in faces.iter().zip(&face_points) {
        mesh.face_mut(f).new_position = p;
    }

    let edges: Vec<EdgeId<I>> = mesh.edge_ids().collect();
    let edge_points = map_ids(&edges, parallel, |e| {
        let h = mesh.edge_halfedge(e);
        let t = mesh.twin(h);
        centroid([
            *mesh.position(mesh.origin(h)),
            *mesh.position(mesh.origin(t)),
            mesh.face(mesh.face_of(h)).new_position,
            mesh.face(mesh.face_of(t)).new_position,
        ])
    });
    for (&e, &p) in edges.iter().zip(&edge_points) {
        mesh.edge_mut(e).new_position = p;
    }

    let vertices: Vec<VertexId<I>> = mesh.vertex_ids().collect();
    let vertex_points = map_ids(&vertices, parallel, |v| vertex_point(mesh, v));
    for (v, p) in vertices.into_iter().zip(vertex_points) {
        mesh.vertex_mut(v).new_position = p;
    }
    Ok(())
}

fn vertex_point<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Point3<f64> {
    let mut q = Vector3::zeros();
    let mut r = Vector3::zeros();
    let mut n = 0usize;
    for h in mesh.vertex_halfedges(v) {
        q += mesh.face(mesh.face_of(h)).new_position.coords;
        r += mesh.edge(mesh.edge_of(h)).new_position.coords;
        n += 1;
    }
    let s = mesh.position(v).coords;
    if n == 0 {
        return Point3::from(s);
    }
    let n = n as f64;
    let q = q / n;
    let r = r / n;
    Point3::from((q + r * 2.0 + s * (n - 3.0)) / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::{subdivide, SubdivideOptions, SubdivisionScheme};
    use crate::mesh::primitives;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_corner_rule() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        catmull_clark_subdivide_positions(&mut mesh).unwrap();

        // Edge (0,0,0)-(1,0,0) borders the faces z = 0 and y = 0.
        let e = mesh
            .find_halfedge(VertexId::new(0), VertexId::new(1))
            .map(|h| mesh.edge_of(h))
            .unwrap();
        assert_relative_eq!(mesh.edge(e).new_position, Point3::new(0.5, 0.125, 0.125), epsilon = 1e-12);

        // Q = (1/3, 1/3, 1/3), R = (1/4, 1/4, 1/4), S = origin, n = 3.
        let expected = (1.0 / 3.0 + 2.0 * 0.25) / 3.0;
        let corner = mesh.vertex(VertexId::new(0)).new_position;
        assert_relative_eq!(corner, Point3::new(expected, expected, expected), epsilon = 1e-12);
    }

    #[test]
    fn test_cube_shrinks_towards_sphere() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        subdivide(&mut mesh, SubdivisionScheme::CatmullClark, &SubdivideOptions::new(1)).unwrap();
        assert_eq!(mesh.num_vertices(), 26);
        assert_eq!(mesh.num_edges(), 48);
        assert_eq!(mesh.num_faces(), 24);
        assert!(mesh.validate().is_ok());

        let center = Point3::new(0.5, 0.5, 0.5);
        for (_, vertex) in mesh.vertices() {
            assert!((vertex.position - center).norm() < 0.75);
        }
    }

    #[test]
    fn test_triangles_become_quads() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        subdivide(&mut mesh, SubdivisionScheme::CatmullClark, &SubdivideOptions::new(1).sequential()).unwrap();
        assert_eq!(mesh.num_faces(), 12);
        assert!(mesh.face_ids().all(|f| mesh.face_degree(f) == 4));
        assert!(mesh.validate().is_ok());
    }
}
