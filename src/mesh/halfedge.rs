//! Half-edge mesh storage, traversal and geometry queries.
//!
//! Every half-edge belongs to exactly one face. Holes and the outer rim of an
//! open surface are represented by *boundary faces*: face records with
//! [`Face::boundary`] set, whose loop runs along the rim. This keeps every
//! vertex fan closed, so traversal never has to special-case a missing twin.

use nalgebra::{Point3, Vector3};

use super::arena::Arena;
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex record.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// Position in 3D space.
    pub position: Point3<f64>,
    /// One outgoing half-edge.
    pub halfedge: HalfEdgeId<I>,
    /// Scratch position written by subdivision rules.
    pub new_position: Point3<f64>,
    /// Marks vertices inserted during Loop subdivision.
    pub is_new: bool,
}

impl<I: MeshIndex> Vertex<I> {
    /// Vertex at `position` with no connectivity yet.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
            new_position: position,
            is_new: false,
        }
    }
}

/// An undirected edge record.
#[derive(Debug, Clone)]
pub struct Edge<I: MeshIndex = u32> {
    /// Either of the two half-edges of this edge.
    pub halfedge: HalfEdgeId<I>,
    /// Scratch position written by subdivision rules.
    pub new_position: Point3<f64>,
    /// Marks edges created by splits during Loop subdivision.
    pub is_new: bool,
}

impl<I: MeshIndex> Default for Edge<I> {
    fn default() -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
            new_position: Point3::origin(),
            is_new: false,
        }
    }
}

/// A face record: a polygon, or a boundary loop when `boundary` is set.
#[derive(Debug, Clone)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge of the loop.
    pub halfedge: HalfEdgeId<I>,
    /// Scratch position written by subdivision rules.
    pub new_position: Point3<f64>,
    /// True for hole / rim loops.
    pub boundary: bool,
}

impl<I: MeshIndex> Face<I> {
    /// Face record without a loop yet.
    pub fn new(boundary: bool) -> Self {
        Self {
            halfedge: HalfEdgeId::invalid(),
            new_position: Point3::origin(),
            boundary,
        }
    }
}

/// A directed half-edge record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// Vertex this half-edge leaves from.
    pub origin: VertexId<I>,
    /// Oppositely oriented half-edge of the same edge.
    pub twin: HalfEdgeId<I>,
    /// Next half-edge counter-clockwise around the face.
    pub next: HalfEdgeId<I>,
    /// Owning edge.
    pub edge: EdgeId<I>,
    /// Owning face.
    pub face: FaceId<I>,
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self {
            origin: VertexId::invalid(),
            twin: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            edge: EdgeId::invalid(),
            face: FaceId::invalid(),
        }
    }
}

/// A polygon mesh in half-edge form.
///
/// Elements live in per-kind arenas addressed by typed handles. Removal is
/// deferred: `discard_*` marks an element, [`HalfEdgeMesh::finalize`] removes
/// every marked element and [`HalfEdgeMesh::validate`] additionally checks the
/// connectivity invariants.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Arena<Vertex<I>>,
    pub(crate) edges: Arena<Edge<I>>,
    pub(crate) faces: Arena<Face<I>>,
    pub(crate) halfedges: Arena<HalfEdge<I>>,
    pub(crate) boundary_faces: usize,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create an empty mesh with room for roughly the given element counts.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Euler estimate for a triangle mesh: E ~ 3V, F ~ 2V.
        let num_halfedges = num_faces * 3;
        Self {
            vertices: Arena::with_capacity(num_vertices),
            edges: Arena::with_capacity(num_halfedges / 2),
            faces: Arena::with_capacity(num_faces),
            halfedges: Arena::with_capacity(num_halfedges),
            boundary_faces: 0,
        }
    }

    // ==================== Counts ====================

    /// Number of live vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of live real faces (boundary loops excluded).
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len() - self.boundary_faces
    }

    /// Number of live boundary loops.
    #[inline]
    pub fn num_boundary_loops(&self) -> usize {
        self.boundary_faces
    }

    /// Number of live half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of discarded elements waiting for [`Self::finalize`].
    pub fn num_pending(&self) -> usize {
        self.vertices.pending() + self.edges.pending() + self.faces.pending() + self.halfedges.pending()
    }

    /// Euler characteristic `V - E + F` (boundary loops not counted as faces).
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    // ==================== Accessors ====================

    /// Vertex record.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        self.vertices.get(id.index())
    }

    /// Mutable vertex record.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        self.vertices.get_mut(id.index())
    }

    /// Edge record.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        self.edges.get(id.index())
    }

    /// Mutable edge record.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId<I>) -> &mut Edge<I> {
        self.edges.get_mut(id.index())
    }

    /// Face record.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        self.faces.get(id.index())
    }

    /// Mutable face record.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        self.faces.get_mut(id.index())
    }

    /// Half-edge record.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        self.halfedges.get(id.index())
    }

    /// Mutable half-edge record.
    #[inline]
    pub fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        self.halfedges.get_mut(id.index())
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Move a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId<I>, position: Point3<f64>) {
        self.vertex_mut(v).position = position;
    }

    /// True if the vertex exists and has not been discarded.
    #[inline]
    pub fn vertex_alive(&self, v: VertexId<I>) -> bool {
        v.is_valid() && self.vertices.is_live(v.index())
    }

    /// True if the edge exists and has not been discarded.
    #[inline]
    pub fn edge_alive(&self, e: EdgeId<I>) -> bool {
        e.is_valid() && self.edges.is_live(e.index())
    }

    /// True if the face exists and has not been discarded.
    #[inline]
    pub fn face_alive(&self, f: FaceId<I>) -> bool {
        f.is_valid() && self.faces.is_live(f.index())
    }

    /// True if the half-edge exists and has not been discarded.
    #[inline]
    pub fn halfedge_alive(&self, h: HalfEdgeId<I>) -> bool {
        h.is_valid() && self.halfedges.is_live(h.index())
    }

    // ==================== Factories ====================

    /// Allocate a vertex at `position`. Its half-edge must be set by the caller.
    pub fn new_vertex(&mut self, position: Point3<f64>) -> VertexId<I> {
        VertexId::new(self.vertices.push(Vertex::new(position)))
    }

    /// Allocate an unlinked edge.
    pub fn new_edge(&mut self) -> EdgeId<I> {
        EdgeId::new(self.edges.push(Edge::default()))
    }

    /// Allocate an unlinked half-edge.
    pub fn new_halfedge(&mut self) -> HalfEdgeId<I> {
        HalfEdgeId::new(self.halfedges.push(HalfEdge::default()))
    }

    /// Allocate a face record, optionally a boundary loop.
    pub fn new_face(&mut self, boundary: bool) -> FaceId<I> {
        if boundary {
            self.boundary_faces += 1;
        }
        FaceId::new(self.faces.push(Face::new(boundary)))
    }

    // ==================== Deferred erase ====================

    /// Mark a vertex for removal at the next [`Self::finalize`].
    pub fn discard_vertex(&mut self, v: VertexId<I>) {
        self.vertices.erase(v.index());
    }

    /// Mark an edge for removal at the next [`Self::finalize`].
    pub fn discard_edge(&mut self, e: EdgeId<I>) {
        self.edges.erase(e.index());
    }

    /// Mark a half-edge for removal at the next [`Self::finalize`].
    pub fn discard_halfedge(&mut self, h: HalfEdgeId<I>) {
        self.halfedges.erase(h.index());
    }

    /// Mark a face for removal at the next [`Self::finalize`].
    pub fn discard_face(&mut self, f: FaceId<I>) {
        let boundary = self.face(f).boundary;
        if self.faces.erase(f.index()) && boundary {
            self.boundary_faces -= 1;
        }
    }

    // ==================== Navigation ====================

    /// Oppositely oriented half-edge.
    #[inline]
    pub fn twin(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(h).twin
    }

    /// Next half-edge around the face.
    #[inline]
    pub fn next(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(h).next
    }

    /// Previous half-edge around the face, found by walking the loop.
    pub fn prev(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        let mut current = h;
        loop {
            let next = self.next(current);
            if next == h {
                return current;
            }
            current = next;
        }
    }

    /// Vertex a half-edge leaves from.
    #[inline]
    pub fn origin(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(h).origin
    }

    /// Vertex a half-edge points to.
    #[inline]
    pub fn dest(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.origin(self.twin(h))
    }

    /// Edge a half-edge belongs to.
    #[inline]
    pub fn edge_of(&self, h: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(h).edge
    }

    /// Face a half-edge belongs to.
    #[inline]
    pub fn face_of(&self, h: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(h).face
    }

    /// Representative half-edge of an edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId<I>) -> HalfEdgeId<I> {
        self.edge(e).halfedge
    }

    /// Representative half-edge of a face.
    #[inline]
    pub fn face_halfedge(&self, f: FaceId<I>) -> HalfEdgeId<I> {
        self.face(f).halfedge
    }

    /// Outgoing half-edge of a vertex.
    #[inline]
    pub fn vertex_halfedge(&self, v: VertexId<I>) -> HalfEdgeId<I> {
        self.vertex(v).halfedge
    }

    /// Both endpoints of an edge, origin of its representative first.
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let h = self.edge_halfedge(e);
        [self.origin(h), self.dest(h)]
    }

    /// Outgoing half-edge from `from` to `to`, if the two are adjacent.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&h| self.dest(h) == to)
    }

    // ==================== Boundary ====================

    /// True for hole / rim loops.
    #[inline]
    pub fn is_boundary_face(&self, f: FaceId<I>) -> bool {
        self.face(f).boundary
    }

    /// True if the half-edge runs along a boundary loop.
    #[inline]
    pub fn is_boundary_halfedge(&self, h: HalfEdgeId<I>) -> bool {
        self.is_boundary_face(self.face_of(h))
    }

    /// True if either side of the edge is a boundary loop.
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let h = self.edge_halfedge(e);
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(self.twin(h))
    }

    /// True if any face around the vertex is a boundary loop.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        self.vertex_halfedges(v).any(|h| self.is_boundary_halfedge(h))
    }

    /// True if the surface has at least one hole or rim.
    pub fn has_boundary(&self) -> bool {
        self.boundary_faces > 0
    }

    // ==================== Iteration ====================

    /// Live vertices in insertion order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertices.live_indices().map(VertexId::new)
    }

    /// Live vertices with their records.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<I>)> + '_ {
        self.vertices.iter_live().map(|(i, v)| (VertexId::new(i), v))
    }

    /// Live edges in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.edges.live_indices().map(EdgeId::new)
    }

    /// Live real faces in insertion order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter_live()
            .filter(|(_, f)| !f.boundary)
            .map(|(i, _)| FaceId::new(i))
    }

    /// Live boundary loops in insertion order.
    pub fn boundary_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces
            .iter_live()
            .filter(|(_, f)| f.boundary)
            .map(|(i, _)| FaceId::new(i))
    }

    /// Live half-edges in insertion order.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.halfedges.live_indices().map(HalfEdgeId::new)
    }

    /// Outgoing half-edges of a vertex, starting at its stored half-edge.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, self.vertex_halfedge(v))
    }

    /// Outgoing half-edges of `origin(h)`, starting at `h`.
    pub fn vertex_halfedges_from(&self, h: HalfEdgeId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, h)
    }

    /// Adjacent vertices.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(move |h| self.dest(h))
    }

    /// Incident edges.
    pub fn vertex_edges(&self, v: VertexId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.vertex_halfedges(v).map(move |h| self.edge_of(h))
    }

    /// Incident real faces.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v)
            .map(move |h| self.face_of(h))
            .filter(move |&f| !self.is_boundary_face(f))
    }

    /// Half-edges of a face loop, starting at its stored half-edge.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, self.face_halfedge(f))
    }

    /// Corners of a face in loop order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(move |h| self.origin(h))
    }

    /// Edges of a face in loop order.
    pub fn face_edges(&self, f: FaceId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.face_halfedges(f).map(move |h| self.edge_of(h))
    }

    /// Corner positions of a face in loop order.
    pub fn face_positions(&self, f: FaceId<I>) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    /// Number of sides of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    /// Number of incident edges.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// First real face that is not a triangle, with its degree.
    pub fn first_non_triangle(&self) -> Option<(FaceId<I>, usize)> {
        self.face_ids()
            .map(|f| (f, self.face_degree(f)))
            .find(|&(_, degree)| degree != 3)
    }

    /// True if every real face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.first_non_triangle().is_none()
    }

    // ==================== Geometry ====================

    /// Unit normal of a face (Newell's method), zero if degenerate.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        polygon_normal(&self.face_positions(f))
    }

    /// Area of a (possibly non-planar) polygonal face.
    pub fn face_area(&self, f: FaceId<I>) -> f64 {
        newell_vector(&self.face_positions(f)).norm() * 0.5
    }

    /// Mean of the face corners.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        centroid(self.face_vertices(f).map(|v| *self.position(v)))
    }

    /// Area-weighted unit normal over the incident real faces.
    pub fn vertex_normal(&self, v: VertexId<I>) -> Vector3<f64> {
        let sum = self
            .vertex_faces(v)
            .fold(Vector3::zeros(), |acc, f| acc + newell_vector(&self.face_positions(f)));
        sum.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }

    /// Midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId<I>) -> Point3<f64> {
        let [a, b] = self.edge_vertices(e);
        nalgebra::center(self.position(a), self.position(b))
    }

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeId<I>) -> f64 {
        let [a, b] = self.edge_vertices(e);
        (self.position(b) - self.position(a)).norm()
    }

    /// Mean length over all live edges, zero for an empty mesh.
    pub fn mean_edge_length(&self) -> f64 {
        let n = self.num_edges();
        if n == 0 {
            return 0.0;
        }
        self.edge_ids().map(|e| self.edge_length(e)).sum::<f64>() / n as f64
    }

    /// Axis-aligned bounds of the live vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.vertices().map(|(_, v)| v.position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(lo, hi), p| {
            (lo.inf(&p), hi.sup(&p))
        }))
    }

    /// Total area of the real faces.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }
}

/// Newell's vector: twice the area times the normal of a polygon.
fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    (0..n).fold(Vector3::zeros(), |acc, i| {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        acc + Vector3::new(
            (p.y - q.y) * (p.z + q.z),
            (p.z - q.z) * (p.x + q.x),
            (p.x - q.x) * (p.y + q.y),
        )
    })
}

/// Unit normal of a closed polygon, zero if it has no area.
pub fn polygon_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    newell_vector(points)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::zeros)
}

/// Mean of a set of points, the origin if empty.
pub fn centroid(points: impl IntoIterator<Item = Point3<f64>>) -> Point3<f64> {
    let (sum, count) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, n), p| (sum + p.coords, n + 1));
    if count == 0 {
        Point3::origin()
    } else {
        Point3::from(sum / count as f64)
    }
}

/// Iterator over the outgoing half-edges of a vertex.
///
/// Steps with `next(twin(h))`: if `h` leaves `v`, its twin arrives at `v` and
/// the half-edge after the twin leaves `v` again, one face further around.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: Option<HalfEdgeId<I>>,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start.is_valid().then_some(start),
        }
    }
}

impl<I: MeshIndex> Iterator for VertexHalfEdgeIter<'_, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let next = self.mesh.next(self.mesh.twin(result));
        self.current = (next != self.start).then_some(next);
        Some(result)
    }
}

/// Iterator over the half-edges of a face loop.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: Option<HalfEdgeId<I>>,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, start: HalfEdgeId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start.is_valid().then_some(start),
        }
    }
}

impl<I: MeshIndex> Iterator for FaceHalfEdgeIter<'_, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        let next = self.mesh.next(result);
        self.current = (next != self.start).then_some(next);
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_triangle_has_boundary_loop() {
        let mesh: HalfEdgeMesh = crate::mesh::build_from_triangles(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        )
        .unwrap();

        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_boundary_loops(), 1);
        assert_eq!(mesh.num_edges(), 3);
        assert_eq!(mesh.num_halfedges(), 6);
        assert!(mesh.vertex_ids().all(|v| mesh.is_boundary_vertex(v)));

        let rim = mesh.boundary_ids().next().unwrap();
        assert_eq!(mesh.face_degree(rim), 3);
        assert!(mesh.vertex_faces(VertexId::new(0)).all(|f| !mesh.is_boundary_face(f)));
        assert_relative_eq!(mesh.surface_area(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_fan_and_loop_traversal() {
        let mesh: HalfEdgeMesh = primitives::icosahedron().unwrap();
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.valence(v), 5);
            assert!(mesh.vertex_halfedges(v).all(|h| mesh.origin(h) == v));
        }
        for f in mesh.face_ids() {
            assert_eq!(mesh.face_degree(f), 3);
            for h in mesh.face_halfedges(f) {
                assert_eq!(mesh.face_of(h), f);
                assert_eq!(mesh.next(mesh.prev(h)), h);
            }
        }
    }

    #[test]
    fn test_cube_geometry() {
        let mesh: HalfEdgeMesh = primitives::cube().unwrap();
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_relative_eq!(mesh.surface_area(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.mean_edge_length(), 1.0, epsilon = 1e-12);

        for f in mesh.face_ids() {
            let n = mesh.face_normal(f);
            let c = mesh.face_centroid(f);
            // Outward normals point away from the cube center.
            assert!(n.dot(&(c - Point3::new(0.5, 0.5, 0.5))) > 0.0);
            assert_relative_eq!(mesh.face_area(f), 1.0, epsilon = 1e-12);
        }

        let (lo, hi) = mesh.bounding_box().unwrap();
        assert_eq!(lo, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(hi, Point3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_find_halfedge() {
        let mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let a = VertexId::new(0);
        let b = VertexId::new(1);
        let h = mesh.find_halfedge(a, b).unwrap();
        assert_eq!(mesh.origin(h), a);
        assert_eq!(mesh.dest(h), b);
        assert_eq!(mesh.edge_vertices(mesh.edge_of(h)).len(), 2);
    }

    #[test]
    fn test_discard_is_deferred() {
        let mut mesh: HalfEdgeMesh = primitives::tetrahedron().unwrap();
        let f = mesh.face_ids().next().unwrap();
        mesh.discard_face(f);
        assert_eq!(mesh.num_faces(), 3);
        assert_eq!(mesh.num_pending(), 1);
        assert!(!mesh.face_alive(f));
        // Record is still readable before finalize.
        assert!(mesh.face_halfedge(f).is_valid());
    }

    #[test]
    fn test_polygon_normal_degenerate() {
        let pts = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        assert_eq!(polygon_normal(&pts), Vector3::zeros());
        assert_eq!(centroid(pts), Point3::new(1.0, 0.0, 0.0));
    }
}
