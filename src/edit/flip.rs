//! Edge flips between the two diagonals of a pair of triangles.

use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Rotate the edge shared by two triangles onto the other diagonal of
    /// their quad.
    ///
    /// ```text
    ///        c                 c
    ///       / \               /|\
    ///      /   \             / | \
    ///     a --- b    ==>    a  |  b
    ///      \   /             \ | /
    ///       \ /               \|/
    ///        d                 d
    /// ```
    ///
    /// Declines on boundary edges, when either face is not a triangle, and
    /// when `c` and `d` are already joined. No elements are created.
    pub fn flip_edge(&mut self, e: EdgeId<I>) -> Option<EdgeId<I>> {
        if self.is_boundary_edge(e) {
            log::trace!("flip of {e:?} declined: boundary edge");
            return None;
        }

        let h0 = self.edge_halfedge(e);
        let h1 = self.twin(h0);
        let h2 = self.next(h0);
        let h3 = self.next(h1);
        let h4 = self.next(h2);
        let h5 = self.next(h3);
        if self.next(h4) != h0 || self.next(h5) != h1 {
            log::trace!("flip of {e:?} declined: incident face is not a triangle");
            return None;
        }

        let a = self.origin(h0);
        let b = self.origin(h1);
        let c = self.origin(h4);
        let d = self.origin(h5);
        if c == d || self.find_halfedge(c, d).is_some() {
            log::trace!("flip of {e:?} declined: would duplicate edge {c:?}-{d:?}");
            return None;
        }

        let f0 = self.face_of(h0);
        let f1 = self.face_of(h1);

        // f0 becomes (d, c, a), f1 becomes (c, d, b).
        self.halfedge_mut(h0).origin = d;
        self.halfedge_mut(h1).origin = c;
        self.halfedge_mut(h0).next = h4;
        self.halfedge_mut(h4).next = h3;
        self.halfedge_mut(h3).next = h0;
        self.halfedge_mut(h1).next = h5;
        self.halfedge_mut(h5).next = h2;
        self.halfedge_mut(h2).next = h1;
        self.halfedge_mut(h3).face = f0;
        self.halfedge_mut(h2).face = f1;

        self.face_mut(f0).halfedge = h0;
        self.face_mut(f1).halfedge = h1;
        self.vertex_mut(a).halfedge = h3;
        self.vertex_mut(b).halfedge = h2;

        Some(e)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::mesh::{primitives, HalfEdgeMesh, VertexId};

    fn face_sets(mesh: &HalfEdgeMesh) -> BTreeSet<Vec<VertexId>> {
        mesh.face_ids()
            .map(|f| {
                let mut corners: Vec<_> = mesh.face_vertices(f).collect();
                corners.sort();
                corners
            })
            .collect()
    }

    #[test]
    fn test_flip_interior_edge() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(2).unwrap();
        let e = mesh.edge_ids().find(|&e| !mesh.is_boundary_edge(e)).unwrap();
        let [a, b] = mesh.edge_vertices(e);

        let flipped = mesh.flip_edge(e).unwrap();
        assert_eq!(flipped, e);
        let [c, d] = mesh.edge_vertices(e);
        assert!(c != a && c != b && d != a && d != b);
        assert!(mesh.find_halfedge(a, b).is_none());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_flip_twice_restores_faces() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let before = face_sets(&mesh);
        let e = mesh.edge_ids().nth(7).unwrap();

        mesh.flip_edge(e).unwrap();
        assert_ne!(face_sets(&mesh), before);
        mesh.flip_edge(e).unwrap();
        assert_eq!(face_sets(&mesh), before);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_flip_declines() {
        let mut grid: HalfEdgeMesh = primitives::triangle_grid(1).unwrap();
        let rim = grid.edge_ids().find(|&e| grid.is_boundary_edge(e)).unwrap();
        assert!(grid.flip_edge(rim).is_none());

        // Every opposite pair of a tetrahedron is already joined.
        let mut tet: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let edges: Vec<_> = tet.edge_ids().collect();
        assert!(edges.into_iter().all(|e| tet.flip_edge(e).is_none()));

        let mut cube: HalfEdgeMesh = primitives::cube().unwrap();
        let e = cube.edge_ids().next().unwrap();
        assert!(cube.flip_edge(e).is_none());
        assert!(cube.validate().is_ok());
    }
}
