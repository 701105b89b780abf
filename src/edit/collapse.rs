//! Edge and face collapse.
//!
//! An edge collapse merges its two endpoints and dissolves the triangles on
//! either side. The link condition decides whether the merge keeps the
//! surface manifold: the only neighbours the endpoints may share are the
//! apexes of the real triangles being removed.

use std::collections::HashSet;

use crate::mesh::{
    Edge, EdgeId, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshIndex, Vertex, VertexId,
};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// True if [`Self::collapse_edge`] would accept `e`.
    ///
    /// A neighbour shared by both endpoints must be the apex of a triangle
    /// dissolved by the collapse. Any other shared neighbour, including one
    /// that is only connected through a boundary loop, would end up joined to
    /// the merged vertex by two edges. The endpoints may not share any other
    /// face either: that would pinch the face (or boundary loop) into visiting
    /// the merged vertex twice.
    pub fn can_collapse_edge(&self, e: EdgeId<I>) -> bool {
        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        if self.next(h) == t || self.next(t) == h {
            return false;
        }

        let fh = self.face_of(h);
        let ft = self.face_of(t);
        if fh == ft {
            return false;
        }
        let a = self.origin(h);
        let b = self.origin(t);
        if self.is_triangle_loop(h) && self.is_triangle_loop(t) {
            let c = self.origin(self.prev(h));
            let d = self.origin(self.prev(t));
            // Same apex on both sides: the two faces already form a closed pillow.
            if c == d {
                return false;
            }
            // An isolated tetrahedron passes the link test but would
            // flatten into a two-faced pillow.
            if [a, b, c, d].iter().all(|&v| self.valence(v) == 3) {
                return false;
            }
        }

        let apexes: Vec<VertexId<I>> = [h, t]
            .into_iter()
            .filter(|&x| !self.is_boundary_halfedge(x) && self.is_triangle_loop(x))
            .map(|x| self.origin(self.prev(x)))
            .collect();
        let around_a: HashSet<VertexId<I>> = self.vertex_halfedges_from(h).map(|o| self.dest(o)).collect();
        let extra_shared = self
            .vertex_halfedges_from(t)
            .map(|o| self.dest(o))
            .any(|w| w != a && around_a.contains(&w) && !apexes.contains(&w));
        if extra_shared {
            return false;
        }

        let removed = [fh, ft];
        let faces_a: HashSet<FaceId<I>> = self.vertex_halfedges_from(h).map(|o| self.face_of(o)).collect();
        !self
            .vertex_halfedges_from(t)
            .map(|o| self.face_of(o))
            .any(|f| !removed.contains(&f) && faces_a.contains(&f))
    }

    /// Merge the two endpoints of an edge into one vertex at the edge
    /// midpoint.
    ///
    /// The first endpoint of the edge survives and is returned; the second is
    /// discarded. Faces reduced to two sides are dissolved and their outer
    /// half-edges become twins, so collapsing an interior edge of a triangle
    /// mesh removes one vertex, three edges and two faces.
    ///
    /// Discarded elements remain until the next finalize; see
    /// [`Self::collapse_edge_commit`].
    pub fn collapse_edge(&mut self, e: EdgeId<I>) -> Option<VertexId<I>> {
        if !self.can_collapse_edge(e) {
            log::trace!("collapse of {e:?} declined: would create a non-manifold result");
            return None;
        }
        Some(self.merge_endpoints(e))
    }

    /// The rewiring behind [`Self::collapse_edge`], without the link check.
    fn merge_endpoints(&mut self, e: EdgeId<I>) -> VertexId<I> {
        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        let a = self.origin(h);
        let b = self.origin(t);
        let midpoint = self.edge_midpoint(e);

        let fan_b: Vec<_> = self.vertex_halfedges_from(t).collect();
        let prev_h = self.prev(h);
        let prev_t = self.prev(t);
        let next_h = self.next(h);
        let next_t = self.next(t);
        let fh = self.face_of(h);
        let ft = self.face_of(t);

        for out in fan_b {
            self.halfedge_mut(out).origin = a;
        }
        self.halfedge_mut(prev_h).next = next_h;
        self.halfedge_mut(prev_t).next = next_t;
        self.face_mut(fh).halfedge = next_h;
        self.face_mut(ft).halfedge = next_t;
        self.vertex_mut(a).halfedge = next_t;

        self.discard_halfedge(h);
        self.discard_halfedge(t);
        self.discard_edge(e);
        self.discard_vertex(b);

        self.dissolve_digon(fh);
        self.dissolve_digon(ft);

        self.set_position(a, midpoint);
        a
    }

    /// [`Self::collapse_edge`] followed by [`Self::finalize`], so the caller
    /// sees a fully reconciled mesh before its next query.
    pub fn collapse_edge_commit(&mut self, e: EdgeId<I>) -> Option<VertexId<I>> {
        let v = self.collapse_edge(e)?;
        self.finalize();
        Some(v)
    }

    /// Remove a face left with exactly two sides, making its outer
    /// neighbours twins of each other.
    fn dissolve_digon(&mut self, f: FaceId<I>) {
        let x = self.face_halfedge(f);
        let y = self.next(x);
        if self.next(y) != x || self.twin(x) == y {
            return;
        }

        let tx = self.twin(x);
        let ty = self.twin(y);
        let keep = self.edge_of(y);
        let drop = self.edge_of(x);

        self.halfedge_mut(tx).twin = ty;
        self.halfedge_mut(ty).twin = tx;
        self.halfedge_mut(tx).edge = keep;
        self.edge_mut(keep).halfedge = ty;

        // x and ty leave the same vertex, as do y and tx.
        let vx = self.origin(x);
        let vy = self.origin(y);
        if self.vertex_halfedge(vx) == x {
            self.vertex_mut(vx).halfedge = ty;
        }
        if self.vertex_halfedge(vy) == y {
            self.vertex_mut(vy).halfedge = tx;
        }

        self.discard_halfedge(x);
        self.discard_halfedge(y);
        self.discard_edge(drop);
        self.discard_face(f);
    }

    /// Collapse a face to a single vertex at its centroid.
    ///
    /// Implemented as a sequence of edge collapses. Every element around the
    /// face's corners is recorded first; if any collapse in the sequence
    /// declines, those records are written back and the mesh is left as it
    /// was before the call.
    pub fn collapse_face(&mut self, f: FaceId<I>) -> Option<VertexId<I>> {
        if self.is_boundary_face(f) {
            return None;
        }
        let corners: Vec<VertexId<I>> = self.face_vertices(f).collect();
        let center = self.face_centroid(f);

        let journal = Journal::record(self, &corners);
        match self.collapse_face_edges(f, &corners) {
            Some(v) => {
                self.set_position(v, center);
                Some(v)
            }
            None => {
                log::trace!("collapse of {f:?} declined");
                journal.replay(self);
                None
            }
        }
    }

    fn collapse_face_edges(&mut self, f: FaceId<I>, corners: &[VertexId<I>]) -> Option<VertexId<I>> {
        let mut merged = None;
        while self.face_alive(f) {
            let e = self.edge_of(self.face_halfedge(f));
            merged = Some(self.collapse_edge(e)?);
        }
        let merged = merged?;

        // The last triangle dissolves into a single edge to the remaining corner.
        let rest: Vec<_> = corners
            .iter()
            .copied()
            .filter(|&c| c != merged && self.vertex_alive(c))
            .collect();
        match rest.as_slice() {
            [] => Some(merged),
            [last] => {
                let h = self.find_halfedge(merged, *last)?;
                self.collapse_edge(self.edge_of(h))
            }
            _ => None,
        }
    }
}

/// Copies of the elements a sequence of collapses around some vertices can
/// rewrite: the vertices and their neighbours, plus every half-edge, edge and
/// face touching them.
///
/// Collapses never allocate, so writing the copies back undoes them exactly.
struct Journal<I: MeshIndex> {
    vertices: Vec<(VertexId<I>, Vertex<I>)>,
    halfedges: Vec<(HalfEdgeId<I>, HalfEdge<I>)>,
    edges: Vec<(EdgeId<I>, Edge<I>)>,
    faces: Vec<(FaceId<I>, Face<I>)>,
    boundary_faces: usize,
}

impl<I: MeshIndex> Journal<I> {
    fn record(mesh: &HalfEdgeMesh<I>, around: &[VertexId<I>]) -> Self {
        let mut vertices: HashSet<VertexId<I>> = around.iter().copied().collect();
        let mut halfedges: HashSet<HalfEdgeId<I>> = HashSet::new();
        let mut edges: HashSet<EdgeId<I>> = HashSet::new();
        let mut faces: HashSet<FaceId<I>> = HashSet::new();

        for &v in around {
            for out in mesh.vertex_halfedges(v) {
                let back = mesh.twin(out);
                vertices.insert(mesh.dest(out));
                halfedges.extend([out, back]);
                edges.insert(mesh.edge_of(out));
                faces.extend([mesh.face_of(out), mesh.face_of(back)]);
            }
        }

        Self {
            vertices: vertices.into_iter().map(|v| (v, mesh.vertex(v).clone())).collect(),
            halfedges: halfedges.into_iter().map(|h| (h, *mesh.halfedge(h))).collect(),
            edges: edges.into_iter().map(|e| (e, mesh.edge(e).clone())).collect(),
            faces: faces.into_iter().map(|f| (f, mesh.face(f).clone())).collect(),
            boundary_faces: mesh.boundary_faces,
        }
    }

    fn replay(self, mesh: &mut HalfEdgeMesh<I>) {
        for (v, record) in self.vertices {
            mesh.vertices.restore(v.index(), record);
        }
        for (h, record) in self.halfedges {
            mesh.halfedges.restore(h.index(), record);
        }
        for (e, record) in self.edges {
            mesh.edges.restore(e.index(), record);
        }
        for (f, record) in self.faces {
            mesh.faces.restore(f.index(), record);
        }
        mesh.boundary_faces = self.boundary_faces;
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::Journal;
    use crate::error::MeshError;
    use crate::mesh::{build_from_triangles, primitives, EdgeId, HalfEdgeMesh, VertexId};

    fn counts(mesh: &HalfEdgeMesh) -> (usize, usize, usize) {
        (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces())
    }

    /// Vertex 3 is interior with fan 0, 1, 2; triangle 0-4-2 closes a second
    /// path from 0 to 2 outside it. The rim runs 0, 1, 2, 4.
    fn fan_with_outer_triangle(mirrored: bool) -> HalfEdgeMesh {
        let sign = if mirrored { -1.0 } else { 1.0 };
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(-sign, -1.0, 0.0),
            Point3::new(-2.0 * sign, 0.0, 0.0),
            Point3::new(-sign, -0.3, 0.0),
            Point3::new(-sign, 1.0, 0.0),
        ];
        let triangles = if mirrored {
            [[0, 1, 3], [1, 2, 3], [2, 0, 3], [0, 2, 4]]
        } else {
            [[0, 3, 1], [1, 3, 2], [2, 3, 0], [0, 4, 2]]
        };
        build_from_triangles(&positions, &triangles).unwrap()
    }

    fn rim_edge(mesh: &HalfEdgeMesh) -> EdgeId {
        let h = mesh.find_halfedge(VertexId::new(2), VertexId::new(1)).unwrap();
        mesh.edge_of(h)
    }

    #[test]
    fn test_collapse_interior_edge() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        let [a, b] = mesh.edge_vertices(e);
        let midpoint = mesh.edge_midpoint(e);

        let v = mesh.collapse_edge(e).unwrap();
        assert_eq!(v, a);
        assert_eq!(*mesh.position(v), midpoint);
        assert!(!mesh.vertex_alive(b));
        assert_eq!(counts(&mesh), (11, 27, 18));
        assert_eq!(mesh.valence(v), 6);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_collapse_commit_finalizes() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        mesh.collapse_edge_commit(e).unwrap();
        assert_eq!(mesh.num_pending(), 0);
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_collapse_declines_on_tetrahedron() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let edges: Vec<_> = mesh.edge_ids().collect();
        for e in edges {
            assert!(mesh.collapse_edge(e).is_none());
        }
        assert_eq!(counts(&mesh), (4, 6, 4));
    }

    #[test]
    fn test_collapse_boundary_edge() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(2).unwrap();
        let e = mesh.edge_ids().find(|&e| mesh.is_boundary_edge(e)).unwrap();
        let before = counts(&mesh);
        mesh.collapse_edge(e).unwrap();
        assert_eq!(counts(&mesh), (before.0 - 1, before.1 - 2, before.2 - 1));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_collapse_declines_pinch() {
        // Interior diagonal of a single quad split in two: both ends lie on the rim.
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(1).unwrap();
        let diagonal = mesh.edge_ids().find(|&e| !mesh.is_boundary_edge(e)).unwrap();
        assert!(!mesh.can_collapse_edge(diagonal));
        assert!(mesh.collapse_edge(diagonal).is_none());
    }

    #[test]
    fn test_collapse_quad_edge() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        mesh.collapse_edge(e).unwrap();
        // Both quads become triangles; nothing dissolves.
        assert_eq!(counts(&mesh), (7, 11, 6));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_collapse_face() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let f = mesh.face_ids().next().unwrap();
        let center = mesh.face_centroid(f);

        let v = mesh.collapse_face(f).unwrap();
        assert_eq!(*mesh.position(v), center);
        assert_eq!(counts(&mesh), (10, 24, 16));
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_collapse_face_restores_on_decline() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let positions: Vec<_> = mesh.vertices().map(|(_, v)| v.position).collect();
        let f = mesh.face_ids().next().unwrap();
        assert!(mesh.collapse_face(f).is_none());
        assert_eq!(counts(&mesh), (4, 6, 4));
        assert_eq!(mesh.vertices().map(|(_, v)| v.position).collect::<Vec<_>>(), positions);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn test_journal_undoes_collapse_sequence() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let original = mesh.clone();
        let f = mesh.face_ids().next().unwrap();
        let corners: Vec<VertexId> = mesh.face_vertices(f).collect();

        let journal = Journal::record(&mesh, &corners);
        assert!(mesh.collapse_face_edges(f, &corners).is_some());
        assert_eq!(counts(&mesh), (10, 24, 16));
        journal.replay(&mut mesh);

        assert_eq!(counts(&mesh), counts(&original));
        assert_eq!(mesh.num_pending(), 0);
        for h in original.halfedge_ids() {
            assert_eq!(mesh.halfedge(h), original.halfedge(h));
        }
        for (v, record) in original.vertices() {
            assert_eq!(mesh.position(v), &record.position);
            assert_eq!(mesh.vertex_halfedge(v), record.halfedge);
        }
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_collapse_declines_rim_edge_with_outer_neighbour() {
        for mirrored in [false, true] {
            let mut mesh = fan_with_outer_triangle(mirrored);
            let e = rim_edge(&mesh);
            let before = counts(&mesh);

            // 0 neighbours both ends of 2-1 but is not the apex of 1-3-2.
            assert!(!mesh.can_collapse_edge(e), "mirrored: {mirrored}");
            assert!(mesh.collapse_edge(e).is_none());
            assert_eq!(counts(&mesh), before);
            assert!(mesh.validate().is_ok());
        }
    }

    #[test]
    fn test_forced_merge_reports_multi_edge() {
        let mut mesh = fan_with_outer_triangle(false);
        let e = rim_edge(&mesh);
        mesh.merge_endpoints(e);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::InvariantViolation { invariant: "multi-edge", .. })
        ));
    }

    #[test]
    fn test_boundary_collapses_keep_edges_distinct() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(3).unwrap();
        let rim: Vec<_> = mesh.edge_ids().filter(|&e| mesh.is_boundary_edge(e)).collect();
        let mut collapsed = 0;
        for e in rim {
            if !mesh.edge_alive(e) {
                continue;
            }
            if mesh.collapse_edge_commit(e).is_some() {
                collapsed += 1;
                assert!(mesh.check().is_ok(), "after collapsing {e:?}");
            }
        }
        assert!(collapsed > 0);
        assert!(mesh.validate().is_ok());
    }
}
