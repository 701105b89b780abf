//! Finalization and connectivity checking.
//!
//! [`HalfEdgeMesh::finalize`] is the commit barrier for deferred erases and
//! [`HalfEdgeMesh::check`] walks the whole mesh verifying:
//!
//! 1. twin symmetry: `twin(twin(h)) == h`, `twin(h) != h`
//! 2. closed face loops of at least three sides (boundary loops excepted)
//! 3. edge ownership: both half-edges of a pair share the edge, which points at one of them
//! 4. single manifold fan per vertex, starting at its stored half-edge
//! 5. no face visits a vertex twice
//! 6. no two edges join the same pair of vertices
//!
//! Every reference held by a live element must name a live element.

use std::collections::HashSet;

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Remove every discarded element. Returns how many were removed.
    ///
    /// Handles of surviving elements are unchanged.
    pub fn finalize(&mut self) -> usize {
        self.vertices.finalize()
            + self.edges.finalize()
            + self.faces.finalize()
            + self.halfedges.finalize()
    }

    /// Finalize pending erases, then check every connectivity invariant.
    pub fn validate(&mut self) -> Result<()> {
        let removed = self.finalize();
        if removed > 0 {
            log::trace!("finalize removed {} elements", removed);
        }
        self.check().inspect_err(|err| log::warn!("mesh validation failed: {}", err))
    }

    /// True if [`Self::check`] passes.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Check every connectivity invariant without modifying the mesh.
    pub fn check(&self) -> Result<()> {
        self.check_halfedges()?;
        self.check_edges()?;
        self.check_faces()?;
        self.check_vertices()?;
        self.check_distinct_edges()
    }

    fn check_halfedges(&self) -> Result<()> {
        for h in self.halfedge_ids() {
            let he = *self.halfedge(h);
            if !self.halfedge_alive(he.twin) || !self.halfedge_alive(he.next) {
                return Err(MeshError::invariant(
                    "live references",
                    format!("{h:?} links to a removed half-edge"),
                ));
            }
            if !self.vertex_alive(he.origin) || !self.edge_alive(he.edge) || !self.face_alive(he.face) {
                return Err(MeshError::invariant(
                    "live references",
                    format!("{h:?} references a removed vertex, edge or face"),
                ));
            }
            if he.twin == h || self.twin(he.twin) != h {
                return Err(MeshError::invariant("twin", format!("{h:?} <-> {:?}", he.twin)));
            }
            if self.edge_of(he.twin) != he.edge {
                return Err(MeshError::invariant(
                    "edge",
                    format!("{h:?} and its twin {:?} own different edges", he.twin),
                ));
            }
            if self.origin(he.next) != self.origin(he.twin) {
                return Err(MeshError::invariant(
                    "face loop",
                    format!("{:?} does not start where {h:?} ends", he.next),
                ));
            }
            if he.origin == self.origin(he.twin) {
                return Err(MeshError::invariant("face loop", format!("{h:?} is a self loop")));
            }
        }
        Ok(())
    }

    fn check_edges(&self) -> Result<()> {
        for e in self.edge_ids() {
            let h = self.edge_halfedge(e);
            if !self.halfedge_alive(h) || self.edge_of(h) != e {
                return Err(MeshError::invariant(
                    "edge",
                    format!("{e:?} representative {h:?} does not belong to it"),
                ));
            }
        }
        Ok(())
    }

    fn check_distinct_edges(&self) -> Result<()> {
        let mut pairs: HashSet<(VertexId<I>, VertexId<I>)> = HashSet::with_capacity(self.num_edges());
        for e in self.edge_ids() {
            let [a, b] = self.edge_vertices(e);
            if !pairs.insert((a.min(b), a.max(b))) {
                return Err(MeshError::invariant(
                    "multi-edge",
                    format!("{a:?} and {b:?} are joined by more than one edge"),
                ));
            }
        }
        Ok(())
    }

    fn check_faces(&self) -> Result<()> {
        let limit = self.num_halfedges();
        let mut visited: HashSet<HalfEdgeId<I>> = HashSet::with_capacity(limit);

        let faces: Vec<FaceId<I>> = self.face_ids().chain(self.boundary_ids()).collect();
        for f in faces {
            let start = self.face_halfedge(f);
            if !self.halfedge_alive(start) {
                return Err(MeshError::invariant(
                    "face loop",
                    format!("{f:?} has no live half-edge"),
                ));
            }

            let mut corners: HashSet<VertexId<I>> = HashSet::new();
            let mut h = start;
            let mut sides = 0;
            loop {
                if self.face_of(h) != f {
                    return Err(MeshError::invariant(
                        "face loop",
                        format!("{h:?} in loop of {f:?} belongs to {:?}", self.face_of(h)),
                    ));
                }
                if !visited.insert(h) {
                    return Err(MeshError::invariant(
                        "face loop",
                        format!("{h:?} appears in more than one loop"),
                    ));
                }
                if !corners.insert(self.origin(h)) {
                    return Err(MeshError::invariant(
                        "distinct corners",
                        format!("{f:?} visits {:?} twice", self.origin(h)),
                    ));
                }
                sides += 1;
                if sides > limit {
                    return Err(MeshError::invariant("face loop", format!("{f:?} does not close")));
                }
                h = self.next(h);
                if h == start {
                    break;
                }
            }

            if sides < 3 && !self.is_boundary_face(f) {
                return Err(MeshError::invariant(
                    "face loop",
                    format!("{f:?} has only {sides} sides"),
                ));
            }
        }

        if visited.len() != self.num_halfedges() {
            return Err(MeshError::invariant(
                "face loop",
                format!(
                    "{} half-edges are not reachable from any face",
                    self.num_halfedges() - visited.len()
                ),
            ));
        }
        Ok(())
    }

    fn check_vertices(&self) -> Result<()> {
        let mut outgoing = vec![0usize; self.vertices.slot_count()];
        for h in self.halfedge_ids() {
            outgoing[self.origin(h).index()] += 1;
        }

        for v in self.vertex_ids() {
            let start = self.vertex_halfedge(v);
            if !self.halfedge_alive(start) || self.origin(start) != v {
                return Err(MeshError::invariant(
                    "vertex fan",
                    format!("{v:?} stores {start:?} which does not leave it"),
                ));
            }

            let expected = outgoing[v.index()];
            let mut h = start;
            let mut count = 0;
            loop {
                if self.origin(h) != v {
                    return Err(MeshError::invariant(
                        "vertex fan",
                        format!("fan of {v:?} reaches {h:?} leaving {:?}", self.origin(h)),
                    ));
                }
                count += 1;
                if count > expected {
                    return Err(MeshError::invariant(
                        "vertex fan",
                        format!("fan of {v:?} does not close"),
                    ));
                }
                h = self.next(self.twin(h));
                if h == start {
                    break;
                }
            }
            if count != expected {
                return Err(MeshError::invariant(
                    "vertex fan",
                    format!("{v:?} has {expected} outgoing half-edges but its fan visits {count}"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{primitives, EdgeId};

    #[test]
    fn test_primitives_are_valid() {
        let mut tet: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let mut cube: HalfEdgeMesh = primitives::cube().unwrap();
        let mut grid: HalfEdgeMesh = primitives::triangle_grid(3).unwrap();
        assert!(tet.validate().is_ok());
        assert!(cube.validate().is_ok());
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_broken_twin_is_reported() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let h = HalfEdgeId::new(0);
        let other = HalfEdgeId::new(4);
        mesh.halfedge_mut(h).twin = other;

        let err = mesh.validate().unwrap_err();
        assert!(matches!(err, MeshError::InvariantViolation { .. }));
        assert!(!mesh.is_valid());
    }

    #[test]
    fn test_dangling_reference_is_reported() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let e: EdgeId = mesh.edge_ids().next().unwrap();
        mesh.discard_edge(e);

        let err = mesh.validate().unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvariantViolation { invariant: "live references", .. }
        ));
    }

    #[test]
    fn test_wrong_vertex_halfedge_is_reported() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let v = VertexId::new(0);
        let foreign = mesh
            .halfedge_ids()
            .find(|&h| mesh.origin(h) != v)
            .unwrap();
        mesh.vertex_mut(v).halfedge = foreign;
        assert!(matches!(
            mesh.check(),
            Err(MeshError::InvariantViolation { invariant: "vertex fan", .. })
        ));
    }

    #[test]
    fn test_finalize_counts_removed() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        assert_eq!(mesh.finalize(), 0);
        let f = mesh.face_ids().next().unwrap();
        mesh.discard_face(f);
        assert_eq!(mesh.finalize(), 1);
        assert_eq!(mesh.num_pending(), 0);
    }
}
