//! Small procedural meshes.
//!
//! Used as fixtures by tests, benchmarks and the command-line tool.

use nalgebra::Point3;

use super::builder::{build_from_polygons, build_from_quads, build_from_triangles};
use super::halfedge::HalfEdgeMesh;
use super::index::MeshIndex;
use crate::error::Result;

/// Closed tetrahedron: 4 vertices, 6 edges, 4 triangles.
pub fn tetrahedron<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    build_from_triangles(&positions, &[[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]])
}

/// Closed unit cube made of quads: 8 vertices, 12 edges, 6 faces.
pub fn cube<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let positions = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    build_from_quads(
        &positions,
        &[
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ],
    )
}

/// Regular icosahedron: 12 vertices, 30 edges, 20 triangles.
pub fn icosahedron<I: MeshIndex>() -> Result<HalfEdgeMesh<I>> {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let positions = [
        Point3::new(-1.0, t, 0.0),
        Point3::new(1.0, t, 0.0),
        Point3::new(-1.0, -t, 0.0),
        Point3::new(1.0, -t, 0.0),
        Point3::new(0.0, -1.0, t),
        Point3::new(0.0, 1.0, t),
        Point3::new(0.0, -1.0, -t),
        Point3::new(0.0, 1.0, -t),
        Point3::new(t, 0.0, -1.0),
        Point3::new(t, 0.0, 1.0),
        Point3::new(-t, 0.0, -1.0),
        Point3::new(-t, 0.0, 1.0),
    ];
    build_from_triangles(
        &positions,
        &[
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ],
    )
}

/// Flat `n x n` grid of unit squares in the XY plane, each cut into two
/// triangles. Open surface with one boundary loop.
pub fn triangle_grid<I: MeshIndex>(n: usize) -> Result<HalfEdgeMesh<I>> {
    let positions = grid_points(n);
    let mut triangles = Vec::with_capacity(n * n * 2);
    for [v00, v10, v11, v01] in grid_cells(n) {
        triangles.push([v00, v10, v11]);
        triangles.push([v00, v11, v01]);
    }
    build_from_triangles(&positions, &triangles)
}

/// Flat `n x n` grid of unit quads in the XY plane.
pub fn quad_grid<I: MeshIndex>(n: usize) -> Result<HalfEdgeMesh<I>> {
    let positions = grid_points(n);
    let quads: Vec<Vec<usize>> = grid_cells(n).map(|cell| cell.to_vec()).collect();
    build_from_polygons(&positions, &quads)
}

fn grid_points(n: usize) -> Vec<Point3<f64>> {
    (0..=n)
        .flat_map(|j| (0..=n).map(move |i| Point3::new(i as f64, j as f64, 0.0)))
        .collect()
}

fn grid_cells(n: usize) -> impl Iterator<Item = [usize; 4]> {
    let stride = n + 1;
    (0..n).flat_map(move |j| {
        (0..n).map(move |i| {
            let v00 = j * stride + i;
            [v00, v00 + 1, v00 + 1 + stride, v00 + stride]
        })
    })
}
