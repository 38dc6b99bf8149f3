//! Half-edge mesh store.
//!
//! The [`Mesh`] owns three flat element tables (vertices, half-edges, faces)
//! plus an `edge_map` from directed vertex pairs to half-edge ids for O(1)
//! lookup. An external loader drives construction: it inserts vertices and
//! both directions of every edge, then either supplies faces explicitly via
//! [`Mesh::add_face`] or lets [`Mesh::generate_faces`] discover them from the
//! edge graph and the vertex normals. [`Mesh::postprocess`] finalizes the
//! structure: it pairs opposite half-edges, flags the boundary and sorts every
//! vertex star into rotational order.
//!
//! # Orientation
//!
//! Face discovery cannot tell clockwise from counterclockwise until a vertex
//! normal fixes the orientation. [`Mesh::order_star`] resolves this once per
//! build: it computes the signed dual-cell area and reverses the star lists
//! when the sign comes out negative. Topological operations preserve the
//! orientation locally from then on.

use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use super::elements::{Face, HalfEdge, Vertex};
use super::geometry::signed_angle;
use crate::error::{MeshError, Result};
use crate::plot::PlotArea;

/// A half-edge surface mesh with dual-cell geometry caches.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,

    /// Directed `(from, to)` pair to half-edge id.
    pub(crate) edge_map: HashMap<(usize, usize), usize>,

    /// Boundary vertex pairs, both orientations, for O(1) membership tests.
    pub(crate) boundary_pairs: HashSet<(usize, usize)>,

    /// Ids of all boundary half-edges.
    pub(crate) boundary_edges: Vec<usize>,

    /// Boundary half-edges queued for obtuse-triangle removal.
    pub(crate) obtuse_boundary: VecDeque<usize>,

    /// True while every non-hole face is a triangle.
    pub(crate) is_triangulation: bool,

    /// Centre-dispatch toggle: circumcenters for triangles when set, plain
    /// geometric centres otherwise.
    pub(crate) circumcenter: bool,

    pub(crate) plot: PlotArea,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            edge_map: HashMap::new(),
            boundary_pairs: HashSet::new(),
            boundary_edges: Vec::new(),
            obtuse_boundary: VecDeque::new(),
            is_triangulation: true,
            circumcenter: true,
            plot: PlotArea::default(),
        }
    }

    /// Clean up the entire mesh data structure.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.edge_map.clear();
        self.boundary_pairs.clear();
        self.boundary_edges.clear();
        self.obtuse_boundary.clear();
        self.is_triangulation = true;
        self.plot.clear();
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces, hole faces included.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, v: usize) -> &Vertex {
        &self.vertices[v]
    }

    /// Get a mutable vertex by id.
    #[inline]
    pub fn vertex_mut(&mut self, v: usize) -> &mut Vertex {
        &mut self.vertices[v]
    }

    /// Get a half-edge by id.
    #[inline]
    pub fn edge(&self, e: usize) -> &HalfEdge {
        &self.edges[e]
    }

    /// Get a face by id.
    #[inline]
    pub fn face(&self, f: usize) -> &Face {
        &self.faces[f]
    }

    /// Set the position of a vertex. Derived quantities stay stale until the
    /// next dual-mesh refresh.
    #[inline]
    pub fn set_position(&mut self, v: usize, r: Point3<f64>) {
        self.vertices[v].r = r;
    }

    /// Set the outward unit normal of a vertex.
    #[inline]
    pub fn set_normal(&mut self, v: usize, normal: Vector3<f64>) {
        self.vertices[v].normal = normal;
    }

    /// Attach an external dual handle to a half-edge.
    #[inline]
    pub fn set_edge_dual(&mut self, e: usize, dual: usize) {
        self.edges[e].dual = dual;
    }

    /// Look up a half-edge by its directed vertex pair.
    #[inline]
    pub fn find_edge(&self, from: usize, to: usize) -> Option<usize> {
        self.edge_map.get(&(from, to)).copied()
    }

    /// True while every non-hole face is a triangle.
    #[inline]
    pub fn is_triangulation(&self) -> bool {
        self.is_triangulation
    }

    /// Ids of all boundary half-edges.
    #[inline]
    pub fn boundary_edges(&self) -> &[usize] {
        &self.boundary_edges
    }

    /// O(1) test whether `(u, v)` (either direction) is a boundary edge.
    #[inline]
    pub fn is_boundary_pair(&self, u: usize, v: usize) -> bool {
        self.boundary_pairs.contains(&(u, v))
    }

    // ==================== Construction ====================

    /// Add a vertex and return its id.
    ///
    /// Ids are assigned densely in insertion order, so rebuilding the same
    /// topology after [`Mesh::reset`] reproduces identical ids.
    pub fn add_vertex(&mut self, r: Point3<f64>, normal: Vector3<f64>) -> usize {
        let id = self.vertices.len();
        self.vertices.push(Vertex::new(id, r, normal));
        id
    }

    /// Add a directed half-edge from `u` to `v` unless the pair is already
    /// present. Returns the id of the inserted half-edge, if any.
    ///
    /// The opposite direction is added by a separate call; both must exist
    /// before [`Mesh::postprocess`] can pair them. Vertex ids out of range
    /// are a caller-contract violation and panic.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Option<usize> {
        if self.edge_map.contains_key(&(u, v)) {
            return None;
        }
        let id = self.edges.len();
        self.edges.push(HalfEdge::new(id, u, v));
        self.vertices[u].add_edge(id);
        self.vertices[u].add_neighbour(v);
        self.edge_map.insert((u, v), id);
        Some(id)
    }

    /// Add a face from an externally supplied, cyclically ordered vertex
    /// list. All bounding edges must already exist.
    ///
    /// A non-hole face with more than three sides downgrades the mesh from a
    /// triangulation, disabling the flip-based operations.
    pub fn add_face(&mut self, verts: &[usize]) -> Result<usize> {
        let id = self.faces.len();
        let mut face = Face::new(id);
        face.vertices = verts.to_vec();

        let n = verts.len();
        let mut face_edges = Vec::with_capacity(n);
        for i in 0..n {
            let u = verts[i];
            let v = verts[(i + 1) % n];
            let e = self
                .edge_map
                .get(&(u, v))
                .copied()
                .ok_or_else(|| MeshError::inconsistent(format!("face edge ({u},{v}) missing")))?;
            face_edges.push(e);
        }
        for i in 0..n {
            let e = face_edges[i];
            self.edges[e].face = id;
            self.edges[e].next = face_edges[(i + 1) % n];
        }
        face.edges = face_edges;
        for &v in verts {
            self.vertices[v].add_face(id);
        }
        if n > 3 {
            self.is_triangulation = false;
        }
        self.faces.push(face);
        Ok(id)
    }

    // ==================== Face discovery ====================

    /// Discover faces by walking unvisited half-edges.
    ///
    /// From the head of each edge the walk continues along the unvisited
    /// outgoing candidate that turns least to the left of the incoming
    /// direction, measured about the head's normal. Every closed walk becomes
    /// a face; walks with more than three sides are the hole faces that soak
    /// up the boundary.
    pub fn generate_faces(&mut self) -> Result<()> {
        self.is_triangulation = true;
        for seed_edge in 0..self.edges.len() {
            if self.edges[seed_edge].visited {
                continue;
            }
            self.edges[seed_edge].visited = true;
            let seed = self.edges[seed_edge].from;
            let mut vp = seed;
            let mut vn = self.edges[seed_edge].to;

            let face_id = self.faces.len();
            let mut face = Face::new(face_id);
            face.vertices.push(seed);
            face.vertices.push(vn);
            face.edges.push(seed_edge);
            let mut prev_edge = seed_edge;

            while vn != seed {
                let ri = self.vertices[vn].r - self.vertices[vp].r;
                let normal = self.vertices[vn].normal;
                let mut best: Option<(usize, f64)> = None;
                for &e in &self.vertices[vn].edges {
                    let cand = &self.edges[e];
                    if cand.visited || cand.to == vp {
                        continue;
                    }
                    let rj = self.vertices[cand.to].r - self.vertices[vn].r;
                    let turn = PI - signed_angle(&ri, &rj, &normal);
                    if best.map_or(true, |(_, t)| turn < t) {
                        best = Some((e, turn));
                    }
                }
                let (e, _) = best.ok_or_else(|| {
                    MeshError::inconsistent(format!(
                        "face walk dead-ends at vertex {vn}: no unvisited outgoing edge"
                    ))
                })?;
                self.edges[e].visited = true;
                let to = self.edges[e].to;
                if to != seed {
                    face.vertices.push(to);
                }
                face.edges.push(e);
                self.edges[prev_edge].next = e;
                prev_edge = e;
                vp = vn;
                vn = to;
                if vn == seed {
                    // close the cycle back onto the seed edge
                    self.edges[prev_edge].next = seed_edge;
                }
            }

            if face.vertices.len() > 3 {
                face.is_hole = true;
            }
            for &v in &face.vertices {
                self.vertices[v].add_face(face_id);
            }
            for &e in &face.edges {
                self.edges[e].face = face_id;
            }
            self.faces.push(face);
        }
        Ok(())
    }

    // ==================== Finalization ====================

    /// Finalize the structure after loading: rebuild the boundary sets from
    /// the hole faces, pair every half-edge with its opposite and, when
    /// `order` is set, sort every vertex star.
    pub fn postprocess(&mut self, order: bool) -> Result<()> {
        self.boundary_pairs.clear();
        self.boundary_edges.clear();
        for f in 0..self.faces.len() {
            if !self.faces[f].is_hole {
                continue;
            }
            let verts = self.faces[f].vertices.clone();
            for v in verts {
                self.vertices[v].boundary = true;
            }
            let face_edges = self.faces[f].edges.clone();
            for e in face_edges {
                let (from, to) = (self.edges[e].from, self.edges[e].to);
                self.edges[e].boundary = true;
                self.boundary_pairs.insert((from, to));
                self.boundary_pairs.insert((to, from));
                self.boundary_edges.push(e);
            }
        }
        for e in 0..self.edges.len() {
            let (from, to) = (self.edges[e].from, self.edges[e].to);
            let pair = self.edge_map.get(&(to, from)).copied().ok_or_else(|| {
                MeshError::inconsistent(format!("half-edge ({from},{to}) has no opposite"))
            })?;
            self.edges[e].pair = pair;
            self.edges[pair].pair = e;
        }
        if order {
            for v in 0..self.vertices.len() {
                self.order_star(v)?;
            }
        }
        Ok(())
    }

    /// Sort the star of vertex `v` so that consecutive outgoing half-edges
    /// share a face, then fix the chirality against the vertex normal.
    ///
    /// Rebuilds the aligned `neigh` and `faces` lists, rotates boundary stars
    /// so the hole face sits last, and rebuilds `dual` from the final edge
    /// order (hole faces contribute no dual handle).
    pub fn order_star(&mut self, v: usize) -> Result<()> {
        self.vertices[v].dual.clear();
        self.vertices[v].neigh.clear();
        self.vertices[v].faces.clear();

        if self.vertices[v].edges.is_empty() {
            self.vertices[v].attached = false;
            return Ok(());
        }

        let star = self.vertices[v].edges.clone();
        let mut ordered = Vec::with_capacity(star.len());
        let mut last = star[0];
        ordered.push(last);
        while ordered.len() < star.len() {
            let face = self.edges[last].face;
            let next = star
                .iter()
                .copied()
                .find(|&e| !ordered.contains(&e) && self.edges[self.edges[e].pair].face == face);
            match next {
                Some(e) => {
                    ordered.push(e);
                    last = e;
                }
                None => {
                    return Err(MeshError::inconsistent(format!(
                        "star of vertex {v} does not close into a fan"
                    )))
                }
            }
        }

        let neigh: Vec<usize> = ordered.iter().map(|&e| self.edges[e].to).collect();
        let faces: Vec<usize> = ordered.iter().map(|&e| self.edges[e].face).collect();
        let vert = &mut self.vertices[v];
        vert.edges = ordered;
        vert.neigh = neigh;
        vert.faces = faces;
        vert.ordered = true;

        if self.vertices[v].boundary {
            self.rotate_boundary_star(v);
        }
        // The walk order is consistent but its chirality is arbitrary until
        // checked against the vertex normal.
        let area = self.dual_area(v)?;
        if area < 0.0 {
            {
                let vert = &mut self.vertices[v];
                vert.area = -area;
                vert.edges.reverse();
                vert.neigh.reverse();
                vert.faces.reverse();
            }
            if self.vertices[v].boundary {
                self.rotate_boundary_star(v);
            }
        }

        let dual: Vec<usize> = self.vertices[v]
            .edges
            .iter()
            .map(|&e| &self.edges[e])
            .filter(|e| !self.faces[e.face].is_hole)
            .map(|e| e.dual)
            .collect();
        self.vertices[v].dual = dual;
        Ok(())
    }

    /// Rotate the star lists of a boundary vertex so the hole face is last.
    fn rotate_boundary_star(&mut self, v: usize) {
        let hole_pos = {
            let vert = &self.vertices[v];
            vert.faces
                .iter()
                .position(|&f| self.faces[f].is_hole)
                .map(|p| if p == vert.faces.len() - 1 { 0 } else { p + 1 })
        };
        if let Some(pos) = hole_pos {
            let vert = &mut self.vertices[v];
            vert.edges.rotate_left(pos);
            vert.neigh.rotate_left(pos);
            vert.faces.rotate_left(pos);
        }
    }

    // ==================== Queries ====================

    /// The vertex of a triangle opposite to half-edge `e`.
    ///
    /// Defined only for interior half-edges of triangular faces.
    pub fn opposite_vertex(&self, e: usize) -> Result<usize> {
        let edge = &self.edges[e];
        if edge.boundary {
            return Err(MeshError::BoundaryEdge { edge: e });
        }
        let face = &self.faces[edge.face];
        if face.n_sides() > 3 {
            return Err(MeshError::NotATriangle { face: face.id });
        }
        face.vertices
            .iter()
            .copied()
            .find(|&v| v != edge.from && v != edge.to)
            .ok_or_else(|| {
                MeshError::inconsistent(format!(
                    "face {} has no vertex opposite half-edge {e}",
                    face.id
                ))
            })
    }

    // ==================== Validation ====================

    /// Check the structural invariants: pair involution, edge-map agreement,
    /// face/next cycles, star list alignment and boundary bookkeeping.
    ///
    /// The `next` cycles of hole faces are exempt, since obtuse-boundary
    /// pruning deliberately leaves them unreconstructed.
    pub fn validate(&self) -> Result<()> {
        if self.edge_map.len() != self.edges.len() {
            return Err(MeshError::inconsistent(format!(
                "edge map holds {} entries for {} half-edges",
                self.edge_map.len(),
                self.edges.len()
            )));
        }
        for (i, edge) in self.edges.iter().enumerate() {
            if edge.id != i {
                return Err(MeshError::inconsistent(format!(
                    "half-edge at slot {i} carries id {}",
                    edge.id
                )));
            }
            if edge.pair == i || edge.pair >= self.edges.len() {
                return Err(MeshError::inconsistent(format!("half-edge {i} pair is invalid")));
            }
            if self.edges[edge.pair].pair != i {
                return Err(MeshError::inconsistent(format!(
                    "pair involution broken at half-edge {i}"
                )));
            }
            if self.edge_map.get(&(edge.from, edge.to)) != Some(&i) {
                return Err(MeshError::inconsistent(format!(
                    "edge map disagrees with half-edge {i} ({} -> {})",
                    edge.from, edge.to
                )));
            }
            if edge.boundary && !self.faces[edge.face].is_hole {
                return Err(MeshError::inconsistent(format!(
                    "boundary half-edge {i} belongs to non-hole face {}",
                    edge.face
                )));
            }
        }
        for face in &self.faces {
            for &e in &face.edges {
                if self.edges[e].face != face.id {
                    return Err(MeshError::inconsistent(format!(
                        "half-edge {e} does not point back to face {}",
                        face.id
                    )));
                }
            }
            if face.is_hole {
                continue;
            }
            let n = face.n_sides();
            let start = face.edges[0];
            let mut e = start;
            for step in 0..n {
                e = self.edges[e].next;
                if e >= self.edges.len() || (e == start) != (step == n - 1) {
                    return Err(MeshError::inconsistent(format!(
                        "next cycle of face {} does not close in {n} steps",
                        face.id
                    )));
                }
            }
        }
        for vert in &self.vertices {
            if vert.ordered
                && (vert.edges.len() != vert.neigh.len() || vert.edges.len() != vert.faces.len())
            {
                return Err(MeshError::inconsistent(format!(
                    "star lists of vertex {} are misaligned",
                    vert.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{hexagon_fan, square_fan};
    use nalgebra::{Point3, Vector3};

    use super::*;

    #[test]
    fn test_add_edge_is_idempotent() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::origin(), Vector3::z());
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
        assert_eq!(mesh.add_edge(0, 1), Some(0));
        assert_eq!(mesh.add_edge(0, 1), None);
        assert_eq!(mesh.add_edge(1, 0), Some(1));
        assert_eq!(mesh.num_edges(), 2);
        assert_eq!(mesh.vertex(0).neigh, vec![1]);
    }

    #[test]
    fn test_hexagon_discovery() {
        let mesh = hexagon_fan();
        // 6 triangles plus one hole face
        assert_eq!(mesh.num_faces(), 7);
        assert_eq!(mesh.faces.iter().filter(|f| f.is_hole).count(), 1);
        assert!(mesh.is_triangulation());
        assert_eq!(mesh.num_edges(), 24);

        let hole = mesh.faces.iter().find(|f| f.is_hole).unwrap();
        assert_eq!(hole.n_sides(), 6);
        for &e in &hole.edges {
            assert!(mesh.edge(e).boundary);
        }
        mesh.validate().unwrap();
    }

    #[test]
    fn test_hexagon_star_ordering() {
        let mesh = hexagon_fan();
        let centre = mesh.vertex(0);
        assert!(centre.ordered);
        assert!(!centre.boundary);
        assert_eq!(centre.edges.len(), 6);
        assert_eq!(centre.neigh.len(), 6);
        assert_eq!(centre.faces.len(), 6);
        // consecutive faces in the star share an edge
        for k in 0..6 {
            let f = &mesh.faces[centre.faces[k]];
            let fnext = &mesh.faces[centre.faces[(k + 1) % 6]];
            let shared = f.vertices.iter().filter(|v| fnext.vertices.contains(v)).count();
            assert_eq!(shared, 2);
        }
        for outer in 1..7 {
            let vert = mesh.vertex(outer);
            assert!(vert.boundary);
            // hole face last
            let last = *vert.faces.last().unwrap();
            assert!(mesh.face(last).is_hole);
            assert!(!mesh.face(vert.faces[0]).is_hole);
            // first edge's pair is a boundary half-edge entering the vertex
            let first = vert.edges[0];
            assert!(mesh.edge(mesh.edge(first).pair).boundary);
        }
    }

    #[test]
    fn test_pairing_and_edge_map() {
        let mesh = square_fan();
        for e in 0..mesh.num_edges() {
            let edge = mesh.edge(e);
            assert_eq!(mesh.edge(edge.pair).pair, e);
            assert_ne!(edge.pair, e);
            assert_eq!(mesh.find_edge(edge.from, edge.to), Some(e));
            assert_eq!(mesh.edge(edge.pair).from, edge.to);
            assert_eq!(mesh.edge(edge.pair).to, edge.from);
        }
    }

    #[test]
    fn test_next_cycles_close() {
        let mesh = hexagon_fan();
        for face in mesh.faces.iter().filter(|f| !f.is_hole) {
            let start = face.edges[0];
            let mut e = start;
            for _ in 0..face.n_sides() {
                e = mesh.edge(e).next;
            }
            assert_eq!(e, start);
        }
    }

    #[test]
    fn test_opposite_vertex() {
        let mesh = hexagon_fan();
        let e = mesh.find_edge(0, 1).unwrap();
        let opp = mesh.opposite_vertex(e).unwrap();
        assert!(opp == 2 || opp == 6);

        let boundary = mesh.boundary_edges()[0];
        assert!(matches!(
            mesh.opposite_vertex(boundary),
            Err(MeshError::BoundaryEdge { .. })
        ));
    }

    #[test]
    fn test_postprocess_rejects_unpaired_edge() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::origin(), Vector3::z());
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0), Vector3::z());
        mesh.add_edge(0, 1);
        assert!(matches!(
            mesh.postprocess(false),
            Err(MeshError::InconsistentTopology { .. })
        ));
    }

    #[test]
    fn test_reset_determinism() {
        let mut first = hexagon_fan();
        let ids: Vec<(usize, usize, usize)> =
            first.edges.iter().map(|e| (e.id, e.from, e.to)).collect();
        let map: Vec<((usize, usize), usize)> = {
            let mut m: Vec<_> = first.edge_map.iter().map(|(&k, &v)| (k, v)).collect();
            m.sort();
            m
        };

        first.reset();
        assert_eq!(first.num_vertices(), 0);
        assert_eq!(first.num_edges(), 0);
        assert_eq!(first.num_faces(), 0);

        let rebuilt = hexagon_fan();
        let ids2: Vec<(usize, usize, usize)> =
            rebuilt.edges.iter().map(|e| (e.id, e.from, e.to)).collect();
        let mut map2: Vec<_> = rebuilt.edge_map.iter().map(|(&k, &v)| (k, v)).collect();
        map2.sort();
        assert_eq!(ids, ids2);
        assert_eq!(map, map2);
    }
}
