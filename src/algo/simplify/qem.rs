//! Greedy collapse loop driven by quadric error metrics.

use std::cmp::Ordering;
use std::collections::HashMap;

use nalgebra::Point3;

use crate::algo::{require_triangles, Progress};
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, FaceId, HalfEdgeMesh, MeshIndex, VertexId};

use super::{MutablePriorityQueue, Quadric, SimplifyOptions};

/// A scored collapse candidate.
///
/// Records order by cost, with ties broken by edge handle so that equal
/// costs still give a total order.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRecord<I: MeshIndex = u32> {
    /// The edge to collapse.
    pub edge: EdgeId<I>,
    /// Where the merged vertex goes.
    pub optimal: Point3<f64>,
    /// Quadric error at `optimal`.
    pub cost: f64,
}

impl<I: MeshIndex> PartialEq for EdgeRecord<I> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<I: MeshIndex> Eq for EdgeRecord<I> {}

impl<I: MeshIndex> PartialOrd for EdgeRecord<I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I: MeshIndex> Ord for EdgeRecord<I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

/// Simplify a triangle mesh by repeated edge collapse.
///
/// Performs [`SimplifyOptions::compute_deletions`] collapses (a quarter of
/// the face count by default), each removing two faces from a closed mesh.
/// Returns the number of collapses actually made, which is lower when the
/// error bound is hit or no remaining collapse is feasible.
///
/// Fails without touching the mesh when it is not a triangle mesh or when the
/// requested deletions would leave fewer than one face
/// ([`MeshError::InsufficientFaces`]).
pub fn simplify<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, options: &SimplifyOptions) -> Result<usize> {
    simplify_internal(mesh, options, None)
}

/// Simplify with progress reporting.
///
/// See [`simplify`] for details.
pub fn simplify_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &SimplifyOptions,
    progress: &Progress,
) -> Result<usize> {
    simplify_internal(mesh, options, Some(progress))
}

fn simplify_internal<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &SimplifyOptions,
    progress: Option<&Progress>,
) -> Result<usize> {
    options.validate()?;
    require_triangles(mesh)?;
    mesh.finalize();

    let faces = mesh.num_faces();
    let deletions = options.compute_deletions(faces);
    if deletions >= faces.saturating_sub(1) {
        return Err(MeshError::InsufficientFaces { faces, deletions });
    }

    let mut state = Collapses::new(mesh, options.preserve_boundary);
    let mut parked: Vec<EdgeId<I>> = Vec::new();
    let mut done = 0;

    while done < deletions {
        let Some(record) = state.pop() else {
            break;
        };
        if let Some(max_error) = options.max_error {
            if record.cost > max_error {
                log::debug!("simplify stopped at cost {:.3e} (limit {max_error:.3e})", record.cost);
                break;
            }
        }
        if !mesh.edge_alive(record.edge) {
            continue;
        }
        let [a, b] = mesh.edge_vertices(record.edge);
        let touching: Vec<EdgeId<I>> = mesh.vertex_edges(a).chain(mesh.vertex_edges(b)).collect();
        let Some(v) = mesh.collapse_edge_commit(record.edge) else {
            parked.push(record.edge);
            continue;
        };
        for e in touching {
            state.retract(e);
        }

        mesh.set_position(v, record.optimal);
        let gone = if v == a { b } else { a };
        state.merge_quadrics(v, gone);
        let around: Vec<EdgeId<I>> = mesh.vertex_edges(v).collect();
        for e in around {
            state.track(mesh, e);
        }
        done += 1;

        // A collapse changes the neighbourhood, so earlier refusals get another chance.
        for e in parked.drain(..) {
            if mesh.edge_alive(e) {
                state.track(mesh, e);
            }
        }

        if let Some(p) = progress {
            p.report_sub(done, deletions, 0, 1, "Simplifying");
        }
    }

    log::debug!(
        "simplify: {done} of {deletions} collapses, {} faces left, {} edges parked",
        mesh.num_faces(),
        parked.len()
    );
    if let Some(p) = progress {
        p.report(1, 1, "Simplification complete");
    }
    mesh.validate()?;
    Ok(done)
}

/// Queue and per-vertex quadrics of one simplification run.
struct Collapses<I: MeshIndex> {
    queue: MutablePriorityQueue<EdgeRecord<I>>,
    records: HashMap<EdgeId<I>, EdgeRecord<I>>,
    quadrics: HashMap<VertexId<I>, Quadric>,
    preserve_boundary: bool,
}

impl<I: MeshIndex> Collapses<I> {
    fn new(mesh: &HalfEdgeMesh<I>, preserve_boundary: bool) -> Self {
        let mut quadrics: HashMap<VertexId<I>, Quadric> = HashMap::with_capacity(mesh.num_vertices());
        for f in mesh.face_ids() {
            let q = face_quadric(mesh, f);
            for v in mesh.face_vertices(f) {
                *quadrics.entry(v).or_default() += q;
            }
        }

        let mut state = Self {
            queue: MutablePriorityQueue::new(),
            records: HashMap::with_capacity(mesh.num_edges()),
            quadrics,
            preserve_boundary,
        };
        let edges: Vec<EdgeId<I>> = mesh.edge_ids().collect();
        for e in edges {
            state.track(mesh, e);
        }
        state
    }

    fn quadric(&self, v: VertexId<I>) -> Quadric {
        self.quadrics.get(&v).copied().unwrap_or_default()
    }

    fn record(&self, mesh: &HalfEdgeMesh<I>, e: EdgeId<I>) -> Option<EdgeRecord<I>> {
        let [a, b] = mesh.edge_vertices(e);
        if self.preserve_boundary && (mesh.is_boundary_vertex(a) || mesh.is_boundary_vertex(b)) {
            return None;
        }
        let combined = self.quadric(a) + self.quadric(b);
        let optimal = combined.optimal(mesh.position(a), mesh.position(b));
        Some(EdgeRecord {
            edge: e,
            optimal,
            cost: combined.evaluate(&optimal),
        })
    }

    /// Queue a fresh record for `e` unless one is already queued.
    fn track(&mut self, mesh: &HalfEdgeMesh<I>, e: EdgeId<I>) {
        if self.records.contains_key(&e) {
            return;
        }
        if let Some(record) = self.record(mesh, e) {
            self.queue.insert(record);
            self.records.insert(e, record);
        }
    }

    fn retract(&mut self, e: EdgeId<I>) {
        if let Some(record) = self.records.remove(&e) {
            self.queue.remove(&record);
        }
    }

    fn pop(&mut self) -> Option<EdgeRecord<I>> {
        let record = self.queue.pop()?;
        self.records.remove(&record.edge);
        Some(record)
    }

    fn merge_quadrics(&mut self, survivor: VertexId<I>, gone: VertexId<I>) {
        let merged = self.quadric(survivor) + self.quadric(gone);
        self.quadrics.remove(&gone);
        self.quadrics.insert(survivor, merged);
    }
}

fn face_quadric<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, f: FaceId<I>) -> Quadric {
    Quadric::from_plane(&mesh.face_normal(f), &mesh.face_centroid(f))
}
