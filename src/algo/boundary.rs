//! Obtuse-boundary pruning.
//!
//! A boundary triangle whose angle opposite the boundary edge is obtuse
//! sticks out of the tissue as a thin spike; pruning removes its boundary
//! edge pair and lets the hole face absorb the triangle. Removal renumbers
//! the edge and face tables, so every surviving reference is patched with a
//! fixed policy: references past both removed ids drop by two, references
//! between them by one.
//!
//! Removal deliberately leaves the `next` cycles along the resurrected hole
//! boundary inconsistent; callers that need them must rebuild faces.

use log::debug;

use crate::error::{MeshError, Result};
use crate::mesh::elements::INVALID;
use crate::mesh::Mesh;

impl Mesh {
    /// Refresh the `boundary` and `obtuse` flags of every non-hole face and
    /// requeue the boundary edges of obtuse boundary triangles that have not
    /// been attempted yet.
    ///
    /// Uses the cached interior angles, so the dual mesh must be current.
    pub fn update_face_properties(&mut self) -> Result<()> {
        self.obtuse_boundary.clear();
        for f in 0..self.faces.len() {
            self.faces[f].boundary = false;
            self.faces[f].obtuse = false;
            if self.faces[f].is_hole {
                continue;
            }
            let face_edges = self.faces[f].edges.clone();
            for &e in &face_edges {
                if self.edges[self.edges[e].pair].boundary {
                    self.faces[f].boundary = true;
                    break;
                }
            }
            for &e in &face_edges {
                let pair = self.edges[e].pair;
                if !self.edges[pair].boundary {
                    continue;
                }
                let apex = self.opposite_vertex(e)?;
                if self.faces[f].angle_at(apex).is_some_and(|cos| cos < 0.0) {
                    self.faces[f].obtuse = true;
                    if !self.edges[e].attempted_removal {
                        self.obtuse_boundary.push_back(pair);
                    }
                    break;
                }
            }
        }
        Ok(())
    }

    /// Remove every obtuse boundary triangle, repeatedly, until none is left.
    ///
    /// Returns the number of removed edge pairs.
    pub fn remove_obtuse_boundary(&mut self) -> Result<usize> {
        for edge in &mut self.edges {
            edge.attempted_removal = false;
        }
        self.update_face_properties()?;
        let mut removed = 0;
        while let Some(e) = self.obtuse_boundary.front().copied() {
            if self.remove_edge_pair(e)? {
                removed += 1;
            }
            self.update_face_properties()?;
        }
        debug!("obtuse-boundary pruning removed {removed} edge pairs");
        Ok(removed)
    }

    /// Remove boundary half-edge `e` together with its pair, absorbing the
    /// incident triangle into the hole face.
    ///
    /// Returns `Ok(false)` without structural changes when `e` is not a
    /// boundary half-edge, or when every vertex of the doomed triangle is
    /// already on the boundary (removing it would detach an interior region).
    /// Both half-edges are marked `attempted_removal` regardless.
    pub fn remove_edge_pair(&mut self, e: usize) -> Result<bool> {
        let ep = self.edges[e].pair;
        self.edges[e].attempted_removal = true;
        self.edges[ep].attempted_removal = true;
        if !self.edges[e].boundary {
            return Ok(false);
        }

        // the triangle to remove sits across the pair; `e` itself belongs to
        // the hole face
        let face_id = self.edges[ep].face;
        let hole_id = self.edges[e].face;
        if self.faces[face_id].is_hole || !self.faces[hole_id].is_hole {
            return Err(MeshError::inconsistent(format!(
                "boundary half-edge {e} is not paired across a hole face"
            )));
        }
        if self.faces[face_id].n_sides() != 3 {
            return Err(MeshError::NotATriangle { face: face_id });
        }
        if self.faces[face_id]
            .vertices
            .iter()
            .all(|&v| self.vertices[v].boundary)
        {
            return Ok(false);
        }

        let v1 = self.edges[e].from;
        let v2 = self.edges[ep].from;

        self.vertices[v1].remove_neighbour(v2);
        self.vertices[v2].remove_neighbour(v1);
        self.vertices[v1].remove_edge(e);
        self.vertices[v2].remove_edge(ep);
        self.vertices[v1].remove_face(face_id);
        self.vertices[v2].remove_face(face_id);

        self.edge_map.remove(&(v1, v2));
        self.edge_map.remove(&(v2, v1));

        // hand the rest of the triangle over to the hole face
        let mut affected = Vec::with_capacity(3);
        for vv in self.faces[face_id].vertices.clone() {
            if vv != v1 && vv != v2 {
                self.vertices[vv].remove_face(face_id);
                self.vertices[vv].add_face(hole_id);
                self.faces[hole_id].vertices.push(vv);
                self.vertices[vv].boundary = true;
            }
            affected.push(vv);
        }
        for ee in self.faces[face_id].edges.clone() {
            if ee != e && ee != ep {
                self.edges[ee].face = hole_id;
                self.edges[ee].boundary = true;
                self.faces[hole_id].edges.push(ee);
                self.boundary_edges.push(ee);
            }
        }

        let e1 = e.min(ep);
        let e2 = e.max(ep);
        self.edges.remove(e2);
        self.edges.remove(e1);
        self.faces.remove(face_id);

        self.renumber_after_removal(e1, e2, face_id);

        for v in affected {
            self.order_star(v)?;
        }
        debug!("removed boundary edge pair ({v1},{v2}) and face {face_id}");
        Ok(true)
    }

    /// Patch every surviving reference after deleting half-edges `e1 < e2`
    /// and face `f`: ids past `e2` drop by two, ids between by one, face ids
    /// past `f` by one. References *to* the removed half-edges are left as
    /// they are, which strands the `next` cycle of the hole face.
    fn renumber_after_removal(&mut self, e1: usize, e2: usize, f: usize) {
        let remap = |r: usize| {
            if r == INVALID {
                r
            } else if r > e2 {
                r - 2
            } else if r > e1 {
                r - 1
            } else {
                r
            }
        };

        for (idx, edge) in self.edges.iter_mut().enumerate() {
            edge.id = idx;
            edge.pair = remap(edge.pair);
            edge.next = remap(edge.next);
            if edge.face != INVALID && edge.face > f {
                edge.face -= 1;
            }
        }
        self.boundary_edges.retain(|&b| b != e1 && b != e2);
        for b in &mut self.boundary_edges {
            *b = remap(*b);
        }
        for vert in &mut self.vertices {
            for ee in &mut vert.edges {
                *ee = remap(*ee);
            }
            for ff in &mut vert.faces {
                if *ff > f {
                    *ff -= 1;
                }
            }
        }
        for val in self.edge_map.values_mut() {
            *val = remap(*val);
        }
        for (idx, face) in self.faces.iter_mut().enumerate() {
            face.id = idx;
            for ee in &mut face.edges {
                *ee = remap(*ee);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{obtuse_pocket, obtuse_ridge};

    #[test]
    fn test_all_boundary_spike_is_refused() {
        // the spike is obtuse, but all three of its vertices already sit on
        // the boundary, so removal would strand it
        let mut mesh = obtuse_ridge();
        let counts = (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces());
        let removed = mesh.remove_obtuse_boundary().unwrap();
        assert_eq!(removed, 0);
        assert_eq!(
            counts,
            (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces())
        );
        // both half-edges of the spike edge are flagged as attempted
        let e = mesh.find_edge(0, 1).unwrap();
        assert!(mesh.edge(e).attempted_removal);
        assert!(mesh.edge(mesh.edge(e).pair).attempted_removal);
    }

    #[test]
    fn test_update_face_properties_flags_obtuse() {
        let mut mesh = obtuse_pocket();
        mesh.update_face_properties().unwrap();
        let flagged: Vec<usize> = (0..mesh.num_faces())
            .filter(|&f| mesh.face(f).obtuse)
            .collect();
        assert_eq!(flagged.len(), 1);
        // the flagged face is the spike over the long bottom edge
        let face = mesh.face(flagged[0]);
        assert!(face.vertices.contains(&0) && face.vertices.contains(&1));
        assert!(!mesh.obtuse_boundary.is_empty());
    }

    #[test]
    fn test_remove_obtuse_boundary_absorbs_spike() {
        let mut mesh = obtuse_pocket();
        let edges_before = mesh.num_edges();
        let faces_before = mesh.num_faces();
        assert!(!mesh.vertex(2).boundary);

        let removed = mesh.remove_obtuse_boundary().unwrap();
        assert_eq!(removed, 1);
        assert_eq!(mesh.num_edges(), edges_before - 2);
        assert_eq!(mesh.num_faces(), faces_before - 1);

        // the long bottom edge is gone and the apex joined the boundary
        assert!(mesh.find_edge(0, 1).is_none());
        assert!(mesh.find_edge(1, 0).is_none());
        assert!(mesh.vertex(2).boundary);

        // surviving references are consistent after renumbering
        for e in 0..mesh.num_edges() {
            assert_eq!(mesh.edge(e).id, e);
            assert_eq!(mesh.edge(mesh.edge(e).pair).pair, e);
            assert_eq!(
                mesh.find_edge(mesh.edge(e).from, mesh.edge(e).to),
                Some(e)
            );
        }
        for v in [0, 1, 2] {
            assert_eq!(mesh.vertex(v).edges.len(), mesh.vertex(v).faces.len());
        }
    }

    #[test]
    fn test_pruning_is_idempotent() {
        let mut mesh = obtuse_pocket();
        mesh.remove_obtuse_boundary().unwrap();
        // a second sweep finds nothing new
        assert_eq!(mesh.remove_obtuse_boundary().unwrap(), 0);
    }
}
