//! Edge splits.
//!
//! Splitting inserts a midpoint vertex and connects it to the opposite
//! corner of each incident real triangle. Boundary loops are only lengthened
//! by one side. The shared rewiring helpers used by bevel live here too.

use crate::mesh::{EdgeId, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Insert a vertex at the midpoint of an edge and connect it to the
    /// opposite corner of each incident triangle.
    ///
    /// ```text
    ///        c                 c
    ///       / \               /|\
    ///      /   \             / | \
    ///     a --- b    ==>    a--m--b
    ///      \   /             \ | /
    ///       \ /               \|/
    ///        d                 d
    /// ```
    ///
    /// An interior edge yields one new vertex, three new edges and two new
    /// faces. An edge on the boundary only cuts its one real triangle: one
    /// new vertex, two new edges, one new face.
    ///
    /// The returned vertex's half-edge runs from `m` back to `a`, along the
    /// part of the original edge that keeps the original edge handle.
    /// Declines if an incident real face is not a triangle.
    pub fn split_edge(&mut self, e: EdgeId<I>) -> Option<VertexId<I>> {
        let h = self.edge_halfedge(e);
        let t = self.twin(h);

        let split = match (self.is_boundary_halfedge(h), self.is_boundary_halfedge(t)) {
            (false, false) => self.split_interior(e, h),
            (false, true) => self.split_rim(e, h),
            (true, false) => self.split_rim(e, t),
            (true, true) => None,
        };
        if split.is_none() {
            log::trace!("split of {e:?} declined: incident face is not a triangle");
        }
        split
    }

    pub(crate) fn is_triangle_loop(&self, h: HalfEdgeId<I>) -> bool {
        self.next(self.next(self.next(h))) == h
    }

    pub(crate) fn set_halfedge(
        &mut self,
        h: HalfEdgeId<I>,
        origin: VertexId<I>,
        twin: HalfEdgeId<I>,
        next: HalfEdgeId<I>,
        edge: EdgeId<I>,
        face: FaceId<I>,
    ) {
        *self.halfedge_mut(h) = HalfEdge {
            origin,
            twin,
            next,
            edge,
            face,
        };
    }

    /// Cut the triangle `(a, b, c)` left of `h` at the new vertex `m`,
    /// producing `(a, m, c)` in the old face and `(m, b, c)` in a new one.
    /// Returns `(m, m_a, m_b)` where `m_a` and `m_b` still need their twins
    /// and `m_a` still needs its successor.
    fn cut_triangle(&mut self, e: EdgeId<I>, h: HalfEdgeId<I>) -> (VertexId<I>, HalfEdgeId<I>, HalfEdgeId<I>) {
        let h_bc = self.next(h);
        let h_ca = self.next(h_bc);
        let c = self.origin(h_ca);
        let top = self.face_of(h);

        let m = self.new_vertex(self.edge_midpoint(e));
        let upper = self.new_face(false);
        let e_mc = self.new_edge();
        let e_mb = self.new_edge();

        let m_a = self.new_halfedge();
        let m_b = self.new_halfedge();
        let m_c = self.new_halfedge();
        let c_m = self.new_halfedge();

        // top: a -> m -> c -> a
        self.halfedge_mut(h).next = m_c;
        self.halfedge_mut(h).twin = m_a;
        self.set_halfedge(m_c, m, c_m, h_ca, e_mc, top);

        // upper: m -> b -> c -> m
        self.set_halfedge(m_b, m, HalfEdgeId::invalid(), h_bc, e_mb, upper);
        self.halfedge_mut(h_bc).next = c_m;
        self.halfedge_mut(h_bc).face = upper;
        self.set_halfedge(c_m, c, m_c, m_b, e_mc, upper);

        self.halfedge_mut(m_a).origin = m;
        self.halfedge_mut(m_a).twin = h;
        self.halfedge_mut(m_a).edge = e;

        self.vertex_mut(m).halfedge = m_a;
        self.edge_mut(e).halfedge = h;
        self.edge_mut(e_mb).halfedge = m_b;
        self.edge_mut(e_mc).halfedge = m_c;
        self.face_mut(top).halfedge = h;
        self.face_mut(upper).halfedge = m_b;

        (m, m_a, m_b)
    }

    fn split_interior(&mut self, e: EdgeId<I>, h: HalfEdgeId<I>) -> Option<VertexId<I>> {
        let t = self.twin(h);
        if !self.is_triangle_loop(h) || !self.is_triangle_loop(t) {
            return None;
        }

        // Bottom triangle (b, a, d).
        let t_ad = self.next(t);
        let t_db = self.next(t_ad);
        let d = self.origin(t_db);
        let bottom = self.face_of(t);

        let (m, m_a, m_b) = self.cut_triangle(e, h);
        let e_md = self.new_edge();
        let lower = self.new_face(false);
        let m_d = self.new_halfedge();
        let d_m = self.new_halfedge();

        // bottom: m -> a -> d -> m
        self.halfedge_mut(m_a).next = t_ad;
        self.halfedge_mut(m_a).face = bottom;
        self.halfedge_mut(t_ad).next = d_m;
        self.set_halfedge(d_m, d, m_d, m_a, e_md, bottom);

        // lower: b -> m -> d -> b, reusing t as b -> m.
        self.halfedge_mut(t).next = m_d;
        self.halfedge_mut(t).twin = m_b;
        self.halfedge_mut(t).edge = self.edge_of(m_b);
        self.halfedge_mut(t).face = lower;
        self.halfedge_mut(m_b).twin = t;
        self.set_halfedge(m_d, m, d_m, t_db, e_md, lower);
        self.halfedge_mut(t_db).face = lower;

        self.edge_mut(e_md).halfedge = m_d;
        self.face_mut(bottom).halfedge = m_a;
        self.face_mut(lower).halfedge = t;

        Some(m)
    }

    fn split_rim(&mut self, e: EdgeId<I>, h: HalfEdgeId<I>) -> Option<VertexId<I>> {
        if !self.is_triangle_loop(h) {
            return None;
        }
        let t = self.twin(h);
        let after = self.next(t);
        let rim = self.face_of(t);

        let (m, m_a, m_b) = self.cut_triangle(e, h);

        // rim: ... b -> m -> a ...
        self.halfedge_mut(t).next = m_a;
        self.halfedge_mut(t).twin = m_b;
        self.halfedge_mut(t).edge = self.edge_of(m_b);
        self.halfedge_mut(m_b).twin = t;
        self.halfedge_mut(m_a).next = after;
        self.halfedge_mut(m_a).face = rim;
        self.face_mut(rim).halfedge = t;

        Some(m)
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::{primitives, HalfEdgeMesh};

    fn counts(mesh: &HalfEdgeMesh) -> (usize, usize, usize) {
        (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces())
    }

    #[test]
    fn test_split_interior_edge() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        let [a, b] = mesh.edge_vertices(e);
        let midpoint = mesh.edge_midpoint(e);

        let m = mesh.split_edge(e).unwrap();
        assert_eq!(counts(&mesh), (13, 33, 22));
        assert_eq!(mesh.valence(m), 4);
        assert_eq!(*mesh.position(m), midpoint);

        // Stored half-edge follows the surviving part of the split edge.
        let h = mesh.vertex_halfedge(m);
        assert_eq!(mesh.edge_of(h), e);
        assert_eq!(mesh.dest(h), a);
        assert!(mesh.find_halfedge(m, b).is_some());
        assert!(mesh.find_halfedge(a, b).is_none());
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_split_boundary_edge() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(1).unwrap();
        let e = mesh.edge_ids().find(|&e| mesh.is_boundary_edge(e)).unwrap();

        let m = mesh.split_edge(e).unwrap();
        assert_eq!(counts(&mesh), (5, 7, 3));
        assert_eq!(mesh.valence(m), 3);
        assert!(mesh.is_boundary_vertex(m));
        let rim = mesh.boundary_ids().next().unwrap();
        assert_eq!(mesh.face_degree(rim), 5);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_split_declines_on_quads() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        assert!(mesh.split_edge(e).is_none());
        assert_eq!(counts(&mesh), (8, 12, 6));
    }

    #[test]
    fn test_repeated_splits_stay_valid() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(2).unwrap();
        let edges: Vec<_> = mesh.edge_ids().collect();
        for e in edges {
            assert!(mesh.split_edge(e).is_some());
        }
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.euler_characteristic(), 1);
    }
}
