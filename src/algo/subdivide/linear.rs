//! Linear subdivision rule.

use nalgebra::Point3;

use crate::algo::map_ids;
use crate::mesh::{EdgeId, FaceId, HalfEdgeMesh, MeshIndex};

/// Fill `new_position` for linear subdivision: vertices keep their position,
/// edges take their midpoint and faces their centroid.
pub fn linear_subdivide_positions<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    fill_positions(mesh, false);
}

pub(super) fn fill_positions<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, parallel: bool) {
    let edges: Vec<EdgeId<I>> = mesh.edge_ids().collect();
    let faces: Vec<FaceId<I>> = mesh.face_ids().collect();
    let edge_points: Vec<Point3<f64>> = map_ids(&edges, parallel, |e| mesh.edge_midpoint(e));
    let face_points: Vec<Point3<f64>> = map_ids(&faces, parallel, |f| mesh.face_centroid(f));

    let vertices: Vec<_> = mesh.vertex_ids().collect();
    for v in vertices {
        let vertex = mesh.vertex_mut(v);
        vertex.new_position = vertex.position;
    }
    for (e, p) in edges.into_iter().zip(edge_points) {
        mesh.edge_mut(e).new_position = p;
    }
    for (f, p) in faces.into_iter().zip(face_points) {
        mesh.face_mut(f).new_position = p;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::{subdivide, SubdivideOptions, SubdivisionScheme};
    use crate::mesh::{polygon_normal, primitives};
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_positions() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        linear_subdivide_positions(&mut mesh);

        for (_, vertex) in mesh.vertices() {
            assert_eq!(vertex.new_position, vertex.position);
        }
        for e in mesh.edge_ids() {
            assert_eq!(mesh.edge(e).new_position, mesh.edge_midpoint(e));
        }
        let f = mesh.face_ids().next().unwrap();
        assert_relative_eq!(mesh.face(f).new_position, mesh.face_centroid(f), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_keeps_planar_quads_planar() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        let area = mesh.surface_area();
        subdivide(&mut mesh, SubdivisionScheme::Linear, &SubdivideOptions::new(2)).unwrap();

        assert_eq!(mesh.num_faces(), 96);
        assert_relative_eq!(mesh.surface_area(), area, epsilon = 1e-9);
        for f in mesh.face_ids() {
            let corners = mesh.face_positions(f);
            let normal = polygon_normal(&corners);
            for p in &corners {
                assert_relative_eq!(normal.dot(&(p - corners[0])), 0.0, epsilon = 1e-12);
            }
        }
    }
}
