//! Isotropic remeshing driver.

use crate::algo::{require_triangles, Progress};
use crate::error::Result;
use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex};

use super::{collapse_point, tangential_smooth, target_valence, valence_deviation, RemeshOptions};

/// Split passes per round; each pass halves every edge still too long.
const MAX_SPLIT_PASSES: usize = 16;

/// Performs isotropic remeshing on a triangle mesh.
///
/// The target length is fixed once on entry, either from
/// [`RemeshOptions::target_length`] or as the mean edge length of the input,
/// so later rounds do not chase a drifting goal.
///
/// Fails with [`crate::error::MeshError::NotTriangleMesh`] if any face is not
/// a triangle and with [`crate::error::MeshError::InvalidParameter`] for
/// out-of-range options; the mesh is untouched in both cases.
pub fn isotropic_remesh<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, options: &RemeshOptions) -> Result<()> {
    isotropic_remesh_internal(mesh, options, None)
}

/// Performs isotropic remeshing with progress reporting.
///
/// See [`isotropic_remesh`] for details.
pub fn isotropic_remesh_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RemeshOptions,
    progress: &Progress,
) -> Result<()> {
    isotropic_remesh_internal(mesh, options, Some(progress))
}

fn isotropic_remesh_internal<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &RemeshOptions,
    progress: Option<&Progress>,
) -> Result<()> {
    options.validate()?;
    require_triangles(mesh)?;
    mesh.finalize();

    let target = options.target_length.unwrap_or_else(|| mesh.mean_edge_length());
    if options.iterations == 0 || target <= 0.0 {
        return Ok(());
    }
    let high = target * 4.0 / 3.0;
    let low = target * 4.0 / 5.0;

    let total_steps = options.iterations * 4;
    for round in 0..options.iterations {
        let base = round * 4;

        let split = split_long_edges(mesh, high, options.preserve_boundary, progress, base, total_steps);
        let collapsed = collapse_short_edges(mesh, low, high, options.preserve_boundary, progress, base + 1, total_steps);

        if let Some(p) = progress {
            p.report(base + 2, total_steps, "Flipping edges");
        }
        let flipped = flip_to_improve_valence(mesh);

        if let Some(p) = progress {
            p.report(base + 3, total_steps, "Smoothing");
        }
        for _ in 0..options.smoothing_iterations {
            tangential_smooth(mesh, options.smoothing_lambda, options.preserve_boundary, options.parallel);
        }

        log::debug!(
            "remesh round {}: {split} splits, {collapsed} collapses, {flipped} flips, mean edge {:.4} (target {target:.4})",
            round + 1,
            mesh.mean_edge_length()
        );
    }

    if let Some(p) = progress {
        p.report(total_steps, total_steps, "Isotropic remeshing complete");
    }
    mesh.validate()
}

fn split_long_edges<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    high: f64,
    preserve_boundary: bool,
    progress: Option<&Progress>,
    step: usize,
    total_steps: usize,
) -> usize {
    let mut total = 0;
    for _ in 0..MAX_SPLIT_PASSES {
        let long: Vec<EdgeId<I>> = mesh
            .edge_ids()
            .filter(|&e| mesh.edge_length(e) > high)
            .filter(|&e| !(preserve_boundary && mesh.is_boundary_edge(e)))
            .collect();
        if long.is_empty() {
            break;
        }
        for (i, &e) in long.iter().enumerate() {
            if mesh.split_edge(e).is_some() {
                total += 1;
            }
            if let Some(p) = progress {
                if i % 256 == 0 {
                    p.report_sub(i, long.len(), step, total_steps, "Splitting edges");
                }
            }
        }
    }
    total
}

fn collapse_short_edges<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    low: f64,
    high: f64,
    preserve_boundary: bool,
    progress: Option<&Progress>,
    step: usize,
    total_steps: usize,
) -> usize {
    let candidates: Vec<EdgeId<I>> = mesh.edge_ids().collect();
    let mut total = 0;

    for (i, &e) in candidates.iter().enumerate() {
        if let Some(p) = progress {
            if i % 256 == 0 {
                p.report_sub(i, candidates.len(), step, total_steps, "Collapsing edges");
            }
        }
        // Earlier collapses in this pass may have removed or stretched the edge.
        if !mesh.edge_alive(e) || mesh.edge_length(e) >= low {
            continue;
        }
        let [a, b] = mesh.edge_vertices(e);
        if preserve_boundary && (mesh.is_boundary_vertex(a) || mesh.is_boundary_vertex(b)) {
            continue;
        }
        let merged = collapse_point(mesh, a, b);
        let stretches = mesh
            .vertex_neighbors(a)
            .chain(mesh.vertex_neighbors(b))
            .any(|w| (mesh.position(w) - merged).norm() > high);
        if stretches {
            continue;
        }
        if mesh.collapse_edge_commit(e).is_some() {
            total += 1;
        }
    }
    total
}

/// Flip interior edges whose flip lowers the summed valence deviation of the
/// four corners, undoing any flip that folds the two triangles over.
fn flip_to_improve_valence<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) -> usize {
    let edges: Vec<EdgeId<I>> = mesh.edge_ids().collect();
    let mut total = 0;

    for e in edges {
        if mesh.is_boundary_edge(e) {
            continue;
        }
        let h = mesh.edge_halfedge(e);
        let t = mesh.twin(h);
        let corners = [
            mesh.origin(h),
            mesh.origin(t),
            mesh.dest(mesh.next(h)),
            mesh.dest(mesh.next(t)),
        ];
        let valences = corners.map(|v| mesh.valence(v));
        let targets = corners.map(|v| target_valence(mesh, v));
        let before = valence_deviation(valences, targets, [0; 4]);
        let after = valence_deviation(valences, targets, [-1, -1, 1, 1]);
        if after >= before {
            continue;
        }

        let reference = mesh.face_normal(mesh.face_of(h)) + mesh.face_normal(mesh.face_of(t));
        if mesh.flip_edge(e).is_none() {
            continue;
        }
        let h = mesh.edge_halfedge(e);
        let folded = [mesh.face_of(h), mesh.face_of(mesh.twin(h))]
            .iter()
            .any(|&f| mesh.face_normal(f).dot(&reference) <= 0.0);
        if folded {
            mesh.flip_edge(e);
        } else {
            total += 1;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeshError;
    use crate::mesh::primitives;

    #[test]
    fn test_rejects_quads() {
        let mut mesh: HalfEdgeMesh = primitives::cube().unwrap();
        let result = isotropic_remesh(&mut mesh, &RemeshOptions::default());
        assert!(matches!(result, Err(MeshError::NotTriangleMesh { .. })));
        assert_eq!(mesh.num_faces(), 6);
    }

    #[test]
    fn test_rejects_bad_options() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let result = isotropic_remesh(&mut mesh, &RemeshOptions::with_target_length(0.0));
        assert!(matches!(result, Err(MeshError::InvalidParameter { .. })));
        assert_eq!(mesh.num_faces(), 20);
    }

    #[test]
    fn test_refines_towards_target() {
        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let start = mesh.mean_edge_length();
        let target = start * 0.4;

        isotropic_remesh(&mut mesh, &RemeshOptions::with_target_length(target)).unwrap();

        let mean = mesh.mean_edge_length();
        assert!((mean - target).abs() < (start - target).abs());
        assert!(mesh.num_faces() > 20);
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_coarsens_towards_target() {
        let mut mesh: HalfEdgeMesh = primitives::triangle_grid(8).unwrap();
        let start = mesh.mean_edge_length();
        let rim_before = mesh.boundary_ids().map(|f| mesh.face_degree(f)).sum::<usize>();
        let options = RemeshOptions::with_target_length(start * 2.0).sequential();

        isotropic_remesh(&mut mesh, &options).unwrap();

        assert!(mesh.mean_edge_length() > start);
        assert!(mesh.num_faces() < 128);
        let rim_after = mesh.boundary_ids().map(|f| mesh.face_degree(f)).sum::<usize>();
        assert_eq!(rim_before, rim_after);
        assert!(mesh.vertices().all(|(_, v)| v.position.z.abs() < 1e-12));
        assert!(mesh.check().is_ok());
    }

    #[test]
    fn test_progress_reaches_end() {
        use std::sync::{Arc, Mutex};

        let last = Arc::new(Mutex::new((0, 0)));
        let sink = Arc::clone(&last);
        let progress = Progress::new(move |step, total, _| *sink.lock().unwrap() = (step, total));

        let mut mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        let options = RemeshOptions::default().with_iterations(2);
        isotropic_remesh_with_progress(&mut mesh, &options, &progress).unwrap();
        assert_eq!(*last.lock().unwrap(), (8, 8));
    }
}
