//! Loop subdivision for triangle meshes.

use nalgebra::{Point3, Vector3};

use crate::algo::{map_ids, require_triangles, Progress};
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, HalfEdgeMesh, MeshIndex, VertexId};

use super::SubdivideOptions;

/// Performs Loop subdivision on a triangle mesh.
///
/// Each round quadruples the number of triangles. It is carried out with the
/// local operators, so handles of the original vertices stay valid:
///
/// 1. compute the smoothed position of every old vertex and the position of
///    the vertex each edge will receive
/// 2. split every original edge, marking the inserted vertex as new and the
///    edges it grows towards the opposite corners as new
/// 3. flip every new edge joining an old and a new vertex
/// 4. move every vertex to its computed position
///
/// # Rules
///
/// - **Interior vertex**: `(1 - n β) v + β Σ neighbours`, with `β = 3/16`
///   for valence 3 and `3 / (8n)` otherwise
/// - **Boundary vertex**: `3/4 v + 1/8 (left + right)`
/// - **Interior edge**: `3/8 (a + b) + 1/8 (c + d)`
/// - **Boundary edge**: midpoint
///
/// Fails with [`MeshError::NotTriangleMesh`] before touching the mesh if
/// any face is not a triangle.
pub fn loop_subdivide<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, options: &SubdivideOptions) -> Result<()> {
    loop_subdivide_with_progress(mesh, options, &Progress::none())
}

/// Loop subdivision with progress reporting.
pub fn loop_subdivide_with_progress<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<()> {
    require_triangles(mesh)?;
    for round in 0..options.iterations {
        progress.report(round, options.iterations, "Loop subdivision");
        loop_subdivide_once(mesh, options.parallel)?;
        log::debug!(
            "Loop round {}: {} vertices, {} faces",
            round + 1,
            mesh.num_vertices(),
            mesh.num_faces()
        );
    }
    progress.report(options.iterations, options.iterations, "Loop subdivision");
    Ok(())
}

fn loop_subdivide_once<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, parallel: bool) -> Result<()> {
    let vertices: Vec<VertexId<I>> = mesh.vertex_ids().collect();
    let edges: Vec<EdgeId<I>> = mesh.edge_ids().collect();
    let vertex_points = map_ids(&vertices, parallel, |v| smoothed_vertex(mesh, v));
    let edge_points = map_ids(&edges, parallel, |e| edge_vertex(mesh, e));

    for (&v, p) in vertices.iter().zip(vertex_points) {
        let vertex = mesh.vertex_mut(v);
        vertex.new_position = p;
        vertex.is_new = false;
    }
    for (&e, p) in edges.iter().zip(edge_points) {
        let edge = mesh.edge_mut(e);
        edge.new_position = p;
        edge.is_new = false;
    }

    for &e in &edges {
        let ends = mesh.edge_vertices(e);
        let target = mesh.edge(e).new_position;
        let m = mesh
            .split_edge(e)
            .ok_or_else(|| MeshError::InvalidState(format!("Loop subdivision could not split {e:?}")))?;

        let vertex = mesh.vertex_mut(m);
        vertex.new_position = target;
        vertex.is_new = true;
        let spokes: Vec<EdgeId<I>> = mesh
            .vertex_halfedges(m)
            .filter(|&h| !ends.contains(&mesh.dest(h)))
            .map(|h| mesh.edge_of(h))
            .collect();
        for spoke in spokes {
            mesh.edge_mut(spoke).is_new = true;
        }
    }

    let to_flip: Vec<EdgeId<I>> = mesh
        .edge_ids()
        .filter(|&e| {
            let [a, b] = mesh.edge_vertices(e);
            mesh.edge(e).is_new && mesh.vertex(a).is_new != mesh.vertex(b).is_new
        })
        .collect();
    for e in to_flip {
        if mesh.flip_edge(e).is_none() {
            log::warn!("Loop subdivision left {e:?} unflipped");
        }
    }

    let all: Vec<VertexId<I>> = mesh.vertex_ids().collect();
    for v in all {
        let vertex = mesh.vertex_mut(v);
        vertex.position = vertex.new_position;
    }
    Ok(())
}

fn loop_beta(valence: usize) -> f64 {
    if valence == 3 {
        3.0 / 16.0
    } else {
        3.0 / (8.0 * valence as f64)
    }
}

fn smoothed_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Point3<f64> {
    let p = mesh.position(v).coords;

    if mesh.is_boundary_vertex(v) {
        let rim: Vec<Vector3<f64>> = mesh
            .vertex_halfedges(v)
            .filter(|&h| mesh.is_boundary_edge(mesh.edge_of(h)))
            .map(|h| mesh.position(mesh.dest(h)).coords)
            .collect();
        return match rim.as_slice() {
            [left, right] => Point3::from(p * 0.75 + (left + right) * 0.125),
            _ => Point3::from(p),
        };
    }

    let (sum, n) = mesh
        .vertex_neighbors(v)
        .fold((Vector3::zeros(), 0usize), |(sum, n), w| (sum + mesh.position(w).coords, n + 1));
    if n == 0 {
        return Point3::from(p);
    }
    let beta = loop_beta(n);
    Point3::from(p * (1.0 - n as f64 * beta) + sum * beta)
}

fn edge_vertex<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, e: EdgeId<I>) -> Point3<f64> {
    if mesh.is_boundary_edge(e) {
        return mesh.edge_midpoint(e);
    }
    let h = mesh.edge_halfedge(e);
    let t = mesh.twin(h);
    let a = mesh.position(mesh.origin(h)).coords;
    let b = mesh.position(mesh.origin(t)).coords;
    let c = mesh.position(mesh.dest(mesh.next(h))).coords;
    let d = mesh.position(mesh.dest(mesh.next(t))).coords;
    Point3::from((a + b) * 0.375 + (c + d) * 0.125)
}
