//! Fan triangulation of polygonal faces.

use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

/// Split every real face with more than three sides into a fan of triangles
/// around its first corner.
///
/// Faces are taken from a snapshot at entry, so the triangles cut off during
/// the pass are never revisited. Boundary loops are left alone. Returns the
/// number of faces added.
pub fn triangulate<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> usize {
    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    let added: usize = faces.into_iter().map(|f| fan_face(mesh, f)).sum();
    log::debug!("triangulate: {added} faces added");
    added
}

/// Cut ears off `f` until it is a triangle. The face record keeps the last
/// ear.
fn fan_face<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, f: FaceId<I>) -> usize {
    let ring: Vec<HalfEdgeId<I>> = mesh.face_halfedges(f).collect();
    let k = ring.len();
    if k <= 3 {
        return 0;
    }
    let apex = mesh.origin(ring[0]);

    // `lead` leaves the apex along the current first side of what is left of f.
    let mut lead = ring[0];
    for i in 1..k - 2 {
        let ear = mesh.new_face(false);
        let diagonal = mesh.new_edge();
        let close = mesh.new_halfedge();
        let open = mesh.new_halfedge();
        let far = mesh.origin(ring[i + 1]);

        // Ear: apex -> v_i -> v_{i+1} -> apex.
        mesh.halfedge_mut(lead).next = ring[i];
        mesh.halfedge_mut(lead).face = ear;
        mesh.halfedge_mut(ring[i]).next = close;
        mesh.halfedge_mut(ring[i]).face = ear;
        mesh.set_halfedge(close, far, open, lead, diagonal, ear);
        mesh.set_halfedge(open, apex, close, ring[i + 1], diagonal, f);

        mesh.edge_mut(diagonal).halfedge = close;
        mesh.face_mut(ear).halfedge = lead;
        lead = open;
    }
    mesh.halfedge_mut(ring[k - 1]).next = lead;
    mesh.face_mut(f).halfedge = lead;
    k - 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, primitives};
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_triangulate_cube() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        let area = mesh.surface_area();

        assert_eq!(triangulate(&mut mesh), 6);
        assert_eq!(mesh.num_faces(), 12);
        assert_eq!(mesh.num_edges(), 18);
        assert_eq!(mesh.num_vertices(), 8);
        assert!(mesh.is_triangle_mesh());
        assert_relative_eq!(mesh.surface_area(), area, epsilon = 1e-12);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_triangulate_hexagon_with_boundary() {
        let positions: Vec<Point3<f64>> = (0..6)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::PI / 3.0;
                Point3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect();
        let mut mesh: HalfEdgeMesh = build_from_polygons(&positions, &[[0, 1, 2, 3, 4, 5]]).unwrap();

        assert_eq!(triangulate(&mut mesh), 3);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_boundary_loops(), 1);
        let rim = mesh.boundary_ids().next().unwrap();
        assert_eq!(mesh.face_degree(rim), 6);
        // Every triangle of the fan keeps the first corner.
        assert!(mesh.face_ids().all(|f| mesh.face_vertices(f).any(|v| v.index() == 0)));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_triangulate_leaves_triangles() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        assert_eq!(triangulate(&mut mesh), 0);
        assert_eq!(mesh.num_faces(), 20);
    }
}
