//! Vertex and edge erasure.
//!
//! Erasing removes connectivity only and merges the surrounding faces into
//! one polygon; nothing is re-triangulated.

use std::collections::HashSet;

use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Remove an interior vertex and its edges, merging the faces around it
    /// into one polygon.
    ///
    /// Declines on boundary vertices and when the merged polygon would visit
    /// some vertex twice.
    pub fn erase_vertex(&mut self, v: VertexId<I>) -> Option<FaceId<I>> {
        if self.is_boundary_vertex(v) {
            log::trace!("erase of {v:?} declined: boundary vertex");
            return None;
        }

        let fan: Vec<HalfEdgeId<I>> = self.vertex_halfedges(v).collect();
        let n = fan.len();

        // Face around fan[i] reads twin(fan[i-1]) -> fan[i] -> chain -> twin(fan[i-1]).
        // The chain is what survives of that face.
        let mut chains: Vec<(HalfEdgeId<I>, HalfEdgeId<I>)> = Vec::with_capacity(n);
        let mut corners: HashSet<VertexId<I>> = HashSet::new();
        for i in 0..n {
            let stop = self.twin(fan[(i + n - 1) % n]);
            let first = self.next(fan[i]);
            let mut last = first;
            let mut h = first;
            while h != stop {
                if !corners.insert(self.origin(h)) {
                    log::trace!("erase of {v:?} declined: merged face would repeat a corner");
                    return None;
                }
                last = h;
                h = self.next(h);
            }
            chains.push((first, last));
        }
        if corners.len() < 3 {
            return None;
        }
        // A merged face bordering one single face on every side would coincide with it.
        let mut across = chains.iter().map(|&(first, _)| self.face_of(self.twin(first)));
        if let Some(only) = across.next() {
            if across.all(|f| f == only) && self.face_degree(only) == corners.len() {
                log::trace!("erase of {v:?} declined: merged face would duplicate {only:?}");
                return None;
            }
        }

        let merged = self.face_of(fan[0]);
        for i in 0..n {
            let (_, last) = chains[i];
            let (prev_first, _) = chains[(i + n - 1) % n];
            self.halfedge_mut(last).next = prev_first;

            let mut h = chains[i].0;
            loop {
                self.halfedge_mut(h).face = merged;
                if h == last {
                    break;
                }
                h = self.next(h);
            }
        }

        for (i, &out) in fan.iter().enumerate() {
            let back = self.twin(out);
            let w = self.origin(back);
            if self.vertex_halfedge(w) == back {
                self.vertex_mut(w).halfedge = chains[i].0;
            }
            let face = self.face_of(out);
            if face != merged {
                self.discard_face(face);
            }
            self.discard_edge(self.edge_of(out));
            self.discard_halfedge(out);
            self.discard_halfedge(back);
        }
        self.discard_vertex(v);
        self.face_mut(merged).halfedge = chains[0].0;

        Some(merged)
    }

    /// Remove an interior edge, merging its two faces into one.
    ///
    /// Declines on boundary edges, on edges with the same face on both
    /// sides, and when the merged polygon would visit some vertex twice.
    pub fn erase_edge(&mut self, e: EdgeId<I>) -> Option<FaceId<I>> {
        if self.is_boundary_edge(e) {
            log::trace!("erase of {e:?} declined: boundary edge");
            return None;
        }
        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        let keep = self.face_of(h);
        let gone = self.face_of(t);
        if keep == gone {
            return None;
        }

        let rest_h = self.loop_after(h);
        let rest_t = self.loop_after(t);
        let mut corners: HashSet<VertexId<I>> = HashSet::new();
        for &x in rest_h.iter().chain(&rest_t) {
            if !corners.insert(self.origin(x)) {
                log::trace!("erase of {e:?} declined: merged face would repeat a corner");
                return None;
            }
        }
        if corners.len() < 3 {
            return None;
        }

        let a = self.origin(h);
        let b = self.origin(t);
        let next_h = self.next(h);
        let next_t = self.next(t);
        let prev_h = self.prev(h);
        let prev_t = self.prev(t);

        self.halfedge_mut(prev_h).next = next_t;
        self.halfedge_mut(prev_t).next = next_h;
        for x in rest_t {
            self.halfedge_mut(x).face = keep;
        }
        if self.vertex_halfedge(a) == h {
            self.vertex_mut(a).halfedge = next_t;
        }
        if self.vertex_halfedge(b) == t {
            self.vertex_mut(b).halfedge = next_h;
        }
        self.face_mut(keep).halfedge = next_h;

        self.discard_halfedge(h);
        self.discard_halfedge(t);
        self.discard_edge(e);
        self.discard_face(gone);

        Some(keep)
    }

    /// Half-edges of the loop through `h`, excluding `h` itself.
    fn loop_after(&self, h: HalfEdgeId<I>) -> Vec<HalfEdgeId<I>> {
        let mut out = Vec::new();
        let mut x = self.next(h);
        while x != h {
            out.push(x);
            x = self.next(x);
        }
        out
    }
}
