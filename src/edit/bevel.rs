//! Bevel operators.
//!
//! Bevelling a vertex or an edge replaces it with a new face, and bevelling a
//! face insets it behind a ring of quads. New corners start at the positions
//! they were copied from; the `bevel_*_positions` methods then move them by
//! absolute offsets.

use std::collections::HashSet;

use nalgebra::Point3;

use crate::mesh::{polygon_normal, EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// Offsets applied by [`HalfEdgeMesh::bevel_face_positions`].
///
/// Both offsets are absolute: every call recomputes positions from the
/// start positions, so an interactive caller passes the current drag value
/// rather than an increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BevelOffsets {
    /// Inset (negative) or outset (positive) along the face plane.
    pub tangent: f64,
    /// Extrusion along the face normal.
    pub normal: f64,
    /// Extrude against the normal, for meshes whose winding is inverted.
    pub flip_orientation: bool,
}

impl BevelOffsets {
    /// Tangent offsets outside this range fold the inset face over itself.
    pub const TANGENT_RANGE: std::ops::RangeInclusive<f64> = -1.0..=1.5;

    /// Offsets with the mesh's own orientation.
    pub fn new(tangent: f64, normal: f64) -> Self {
        Self {
            tangent,
            normal,
            flip_orientation: false,
        }
    }

    /// Set whether the normal offset is negated.
    pub fn with_flipped_orientation(mut self, flip: bool) -> Self {
        self.flip_orientation = flip;
        self
    }
}

impl Default for BevelOffsets {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Replace an interior vertex by a face with one corner on each incident
    /// edge.
    ///
    /// All new corners start at the old vertex position; move them with
    /// [`Self::bevel_vertex_positions`]. A vertex of valence `n` becomes `n`
    /// vertices, `n` new edges and one new face.
    pub fn bevel_vertex(&mut self, v: VertexId<I>) -> Option<FaceId<I>> {
        if self.is_boundary_vertex(v) {
            log::trace!("bevel of {v:?} declined: boundary vertex");
            return None;
        }
        let fan: Vec<HalfEdgeId<I>> = self.vertex_halfedges(v).collect();
        let n = fan.len();
        if n < 3 {
            log::trace!("bevel of {v:?} declined: valence {n}");
            return None;
        }

        let start = *self.position(v);
        let corners: Vec<VertexId<I>> = fan.iter().map(|_| self.new_vertex(start)).collect();
        let cap = self.new_face(false);
        let inward: Vec<HalfEdgeId<I>> = (0..n).map(|_| self.new_halfedge()).collect();
        let outward: Vec<HalfEdgeId<I>> = (0..n).map(|_| self.new_halfedge()).collect();

        for i in 0..n {
            let before = (i + n - 1) % n;
            let edge = self.new_edge();
            let incoming = self.twin(fan[before]);
            let side = self.face_of(fan[i]);

            // inward[i] runs corners[before] -> corners[i] inside the old fan face;
            // outward[i] is its twin on the cap.
            self.set_halfedge(inward[i], corners[before], outward[i], fan[i], edge, side);
            self.set_halfedge(outward[i], corners[i], inward[i], outward[before], edge, cap);
            self.halfedge_mut(incoming).next = inward[i];
            self.halfedge_mut(fan[i]).origin = corners[i];
            self.edge_mut(edge).halfedge = inward[i];
            self.vertex_mut(corners[i]).halfedge = fan[i];
        }
        self.face_mut(cap).halfedge = outward[0];
        self.discard_vertex(v);

        Some(cap)
    }

    /// Replace an interior edge by a face whose corners sit on the other
    /// edges around both endpoints.
    ///
    /// Endpoints of valence `p` and `r` turn into a face with `p + r - 2`
    /// corners, all starting at the position of the endpoint they came from.
    /// Declines on boundary edges, when an endpoint is on the boundary, when
    /// the endpoints share a face besides the two at the edge, and when the
    /// new face would have fewer than three corners.
    pub fn bevel_edge(&mut self, e: EdgeId<I>) -> Option<FaceId<I>> {
        let h = self.edge_halfedge(e);
        let t = self.twin(h);
        let a = self.origin(h);
        let b = self.origin(t);
        if self.is_boundary_vertex(a) || self.is_boundary_vertex(b) {
            log::trace!("bevel of {e:?} declined: touches the boundary");
            return None;
        }

        let fan_a: Vec<HalfEdgeId<I>> = self.vertex_halfedges_from(h).collect();
        let fan_b: Vec<HalfEdgeId<I>> = self.vertex_halfedges_from(t).collect();
        let p = fan_a.len();
        let r = fan_b.len();
        if p + r < 5 {
            log::trace!("bevel of {e:?} declined: face would have {} corners", p + r - 2);
            return None;
        }
        let faces_a: HashSet<FaceId<I>> = fan_a.iter().map(|&o| self.face_of(o)).collect();
        let own = [self.face_of(h), self.face_of(t)];
        if own[0] == own[1]
            || fan_b
                .iter()
                .map(|&o| self.face_of(o))
                .any(|f| !own.contains(&f) && faces_a.contains(&f))
        {
            log::trace!("bevel of {e:?} declined: endpoints share another face");
            return None;
        }

        let cap = self.new_face(false);
        let across_h = self.new_halfedge();
        let across_t = self.new_halfedge();
        let (xs, down_a) = self.bevel_endpoint(&fan_a, cap);
        let (ys, down_b) = self.bevel_endpoint(&fan_b, cap);
        let x_first = xs[0];
        let x_last = xs[p - 2];
        let y_first = ys[0];
        let y_last = ys[r - 2];

        // h now runs x_last -> y_first and t runs y_last -> x_first.
        self.halfedge_mut(h).origin = x_last;
        self.halfedge_mut(t).origin = y_last;
        let edge_t = self.new_edge();
        self.halfedge_mut(t).twin = across_t;
        self.halfedge_mut(t).edge = edge_t;
        self.edge_mut(edge_t).halfedge = t;
        self.halfedge_mut(h).twin = across_h;

        // Cap loop: across_h, down the a side to x_first, across_t, down the b side.
        let after_h = down_a.last().copied().unwrap_or(across_t);
        let after_t = down_b.last().copied().unwrap_or(across_h);
        self.set_halfedge(across_h, y_first, h, after_h, e, cap);
        self.set_halfedge(across_t, x_first, t, after_t, edge_t, cap);
        if let Some(&lowest) = down_a.first() {
            self.halfedge_mut(lowest).next = across_t;
        }
        if let Some(&lowest) = down_b.first() {
            self.halfedge_mut(lowest).next = across_h;
        }

        self.face_mut(cap).halfedge = across_h;
        self.discard_vertex(a);
        self.discard_vertex(b);

        Some(cap)
    }

    /// Give every edge of `fan` except the first its own copy of the fan's
    /// vertex, joined by new edges inside the faces between them.
    ///
    /// Returns the copies and the cap-side connector half-edges, where
    /// `down[k]` runs from `copies[k + 1]` to `copies[k]` and is linked to
    /// `down[k - 1]`.
    fn bevel_endpoint(&mut self, fan: &[HalfEdgeId<I>], cap: FaceId<I>) -> (Vec<VertexId<I>>, Vec<HalfEdgeId<I>>) {
        let start = *self.position(self.origin(fan[0]));
        let mut copies = Vec::with_capacity(fan.len() - 1);
        for &out in &fan[1..] {
            let x = self.new_vertex(start);
            self.halfedge_mut(out).origin = x;
            self.vertex_mut(x).halfedge = out;
            copies.push(x);
        }

        let mut down: Vec<HalfEdgeId<I>> = Vec::with_capacity(fan.len().saturating_sub(2));
        for i in 2..fan.len() {
            let edge = self.new_edge();
            let up = self.new_halfedge();
            let dn = self.new_halfedge();
            let incoming = self.twin(fan[i - 1]);
            let side = self.face_of(fan[i]);
            let below = down.last().copied().unwrap_or_else(HalfEdgeId::invalid);

            self.set_halfedge(up, copies[i - 2], dn, fan[i], edge, side);
            self.set_halfedge(dn, copies[i - 1], up, below, edge, cap);
            self.halfedge_mut(incoming).next = up;
            self.edge_mut(edge).halfedge = up;
            down.push(dn);
        }
        (copies, down)
    }

    /// Inset a face: the face keeps its handle but moves onto a fresh copy of
    /// its corners, joined to the old corners by a ring of quads.
    ///
    /// New corners start at the positions they were copied from; move them
    /// with [`Self::bevel_face_positions`]. An `n`-gon gains `n` vertices,
    /// `2n` edges and `n` faces.
    pub fn bevel_face(&mut self, f: FaceId<I>) -> Option<FaceId<I>> {
        if self.is_boundary_face(f) {
            log::trace!("bevel of {f:?} declined: boundary loop");
            return None;
        }
        let ring: Vec<HalfEdgeId<I>> = self.face_halfedges(f).collect();
        let n = ring.len();
        let old: Vec<VertexId<I>> = ring.iter().map(|&h| self.origin(h)).collect();
        let new: Vec<VertexId<I>> = old.iter().map(|&u| self.new_vertex(*self.position(u))).collect();

        let inner: Vec<HalfEdgeId<I>> = (0..n).map(|_| self.new_halfedge()).collect();
        let outer: Vec<HalfEdgeId<I>> = (0..n).map(|_| self.new_halfedge()).collect();
        let rise: Vec<HalfEdgeId<I>> = (0..n).map(|_| self.new_halfedge()).collect();
        let fall: Vec<HalfEdgeId<I>> = (0..n).map(|_| self.new_halfedge()).collect();
        let sides: Vec<FaceId<I>> = (0..n).map(|_| self.new_face(false)).collect();

        for i in 0..n {
            let j = (i + 1) % n;
            let before = (i + n - 1) % n;
            let ring_edge = self.new_edge();
            let spoke = self.new_edge();

            self.set_halfedge(inner[i], new[i], outer[i], inner[j], ring_edge, f);
            // Side quad i: old[i] -> old[j] -> new[j] -> new[i] -> old[i].
            self.halfedge_mut(ring[i]).next = rise[j];
            self.halfedge_mut(ring[i]).face = sides[i];
            self.set_halfedge(outer[i], new[j], inner[i], fall[i], ring_edge, sides[i]);
            self.set_halfedge(rise[i], old[i], fall[i], outer[before], spoke, sides[before]);
            self.set_halfedge(fall[i], new[i], rise[i], ring[i], spoke, sides[i]);

            self.edge_mut(ring_edge).halfedge = inner[i];
            self.edge_mut(spoke).halfedge = rise[i];
            self.vertex_mut(new[i]).halfedge = inner[i];
            self.face_mut(sides[i]).halfedge = ring[i];
        }
        self.face_mut(f).halfedge = inner[0];

        Some(f)
    }

    /// Slide the corners of a bevelled vertex along their edges.
    ///
    /// `start` holds one position per corner of `face`, in loop order from
    /// the face's half-edge, captured right after [`Self::bevel_vertex`].
    /// Returns false, leaving every position alone, if `start` has the wrong
    /// length or `tangent` is outside `[0, 1)`.
    pub fn bevel_vertex_positions(&mut self, face: FaceId<I>, start: &[Point3<f64>], tangent: f64) -> bool {
        self.slide_corners(face, start, tangent)
    }

    /// Slide the corners of a bevelled edge along the edges they sit on.
    ///
    /// Same contract as [`Self::bevel_vertex_positions`], with `face` the
    /// result of [`Self::bevel_edge`].
    pub fn bevel_edge_positions(&mut self, face: FaceId<I>, start: &[Point3<f64>], tangent: f64) -> bool {
        self.slide_corners(face, start, tangent)
    }

    /// Move each corner from its start position towards the far end of the
    /// original edge it lies on.
    fn slide_corners(&mut self, face: FaceId<I>, start: &[Point3<f64>], tangent: f64) -> bool {
        if !(0.0..1.0).contains(&tangent) {
            return false;
        }
        let loop_: Vec<HalfEdgeId<I>> = self.face_halfedges(face).collect();
        if loop_.len() != start.len() {
            return false;
        }
        for (&h, from) in loop_.iter().zip(start) {
            let far = self.dest(self.next(self.twin(h)));
            let to = from + (self.position(far) - from) * tangent;
            if to.coords.iter().all(|c| c.is_finite()) {
                self.set_position(self.origin(h), to);
            }
        }
        true
    }

    /// Place the corners of an inset face.
    ///
    /// Corner `i` moves to `start[i] + n * normal + (start[i] - start[i + 1]) * tangent`,
    /// with `n` the unit normal of the start polygon. Rejects the whole update
    /// when the tangent offset is outside [`BevelOffsets::TANGENT_RANGE`];
    /// corners whose result is not finite keep their position.
    pub fn bevel_face_positions(&mut self, face: FaceId<I>, start: &[Point3<f64>], offsets: &BevelOffsets) -> bool {
        if !BevelOffsets::TANGENT_RANGE.contains(&offsets.tangent) {
            log::trace!("bevel offset {} rejected", offsets.tangent);
            return false;
        }
        let corners: Vec<VertexId<I>> = self.face_vertices(face).collect();
        let n = corners.len();
        if n != start.len() {
            return false;
        }

        let normal_offset = if offsets.flip_orientation {
            -offsets.normal
        } else {
            offsets.normal
        };
        let lift = polygon_normal(start) * normal_offset;
        for (i, &v) in corners.iter().enumerate() {
            let spread = (start[i] - start[(i + 1) % n]) * offsets.tangent;
            let to = start[i] + lift + spread;
            if to.coords.iter().all(|c| c.is_finite()) {
                self.set_position(v, to);
            }
        }
        true
    }
}
