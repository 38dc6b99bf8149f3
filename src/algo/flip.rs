//! Edge flipping and equiangulation.
//!
//! An edge flip replaces the diagonal shared by two triangles with the
//! opposite diagonal, keeping every structural invariant intact.
//! Equiangulation drives the flip until the triangulation is locally
//! Delaunay: an interior edge flips while the interior angles opposite to it
//! sum to more than a straight angle.

use log::{debug, warn};

use crate::error::{MeshError, Result};
use crate::mesh::geometry::wrap_angle;
use crate::mesh::Mesh;

impl Mesh {
    /// Flip half-edge `e` and its pair.
    ///
    /// Returns `Ok(false)` without touching the mesh when the mesh is not a
    /// triangulation or the edge lies on the boundary. On success the two
    /// incident triangles are rebuilt, the stars of the four involved
    /// vertices reordered and their dual areas and perimeters refreshed;
    /// face Jacobians elsewhere stay stale until the next dual-mesh update.
    pub fn edge_flip(&mut self, e: usize) -> Result<bool> {
        if !self.is_triangulation {
            return Ok(false);
        }
        let ep = self.edges[e].pair;
        if self.edges[e].boundary || self.edges[ep].boundary {
            return Ok(false);
        }

        let f = self.edges[e].face;
        let fp = self.edges[ep].face;

        // the four ring edges around the diagonal
        let e1 = self.edges[e].next;
        let e2 = self.edges[e1].next;
        let e3 = self.edges[ep].next;
        let e4 = self.edges[e3].next;
        if self.edges[e2].next != e || self.edges[e4].next != ep {
            return Err(MeshError::inconsistent(format!(
                "half-edge {e} does not close a pair of triangles"
            )));
        }

        let v1 = self.edges[e].from;
        let v2 = self.edges[ep].from;
        let v3 = self.opposite_vertex(e)?;
        let v4 = self.opposite_vertex(ep)?;

        // rewire the diagonal onto the opposite vertex pair
        self.edges[e].from = v4;
        self.edges[e].to = v3;
        self.edges[ep].from = v3;
        self.edges[ep].to = v4;

        self.edges[e].next = e2;
        self.edges[e2].next = e3;
        self.edges[e3].next = e;

        self.edges[ep].next = e4;
        self.edges[e4].next = e1;
        self.edges[e1].next = ep;

        self.edges[e3].face = f;
        self.edges[e1].face = fp;

        // carry the dual handles with the edges that switch faces
        self.edges[e3].dual = self.edges[e2].dual;
        self.edges[e1].dual = self.edges[e4].dual;

        self.faces[f].vertices = vec![self.edges[e].from, self.edges[e2].from, self.edges[e3].from];
        self.faces[f].edges = vec![e, e2, e3];
        self.compute_angles(f);
        self.compute_centre(f);

        self.faces[fp].vertices =
            vec![self.edges[ep].from, self.edges[e4].from, self.edges[e1].from];
        self.faces[fp].edges = vec![ep, e4, e1];
        self.compute_angles(fp);
        self.compute_centre(fp);

        self.vertices[v1].remove_neighbour(v2);
        self.vertices[v1].remove_edge(e);
        self.vertices[v1].remove_face(fp);

        self.vertices[v2].remove_neighbour(v1);
        self.vertices[v2].remove_edge(ep);
        self.vertices[v2].remove_face(f);

        self.vertices[v3].add_neighbour(v4);
        self.vertices[v4].add_neighbour(v3);

        self.vertices[v4].add_edge(e);
        self.vertices[v3].add_edge(ep);

        self.vertices[v3].add_face(fp);
        self.vertices[v4].add_face(f);

        self.edge_map.remove(&(v1, v2));
        self.edge_map.remove(&(v2, v1));
        self.edge_map.insert((v3, v4), ep);
        self.edge_map.insert((v4, v3), e);

        for v in [v1, v2, v3, v4] {
            self.order_star(v)?;
        }
        for v in [v1, v2, v3, v4] {
            self.dual_area(v)?;
            self.dual_perimeter(v)?;
        }

        debug!("flipped edge {e}: diagonal ({v1},{v2}) -> ({v3},{v4})");
        Ok(true)
    }

    /// Flip interior edges until the triangulation is locally Delaunay.
    ///
    /// An edge flips while the signed interior angles opposite to it sum past
    /// a straight angle (the wrapped sum turns negative). Passes repeat until
    /// one completes without a flip; the total number of flips is bounded by
    /// `10 |E|`, beyond which the call aborts with
    /// [`MeshError::ConvergenceFailed`].
    ///
    /// Returns the number of flips performed. No-op on non-triangulations.
    pub fn equiangulate(&mut self) -> Result<usize> {
        if !self.is_triangulation {
            return Ok(0);
        }
        let max_flips = 10 * self.edges.len().max(1);
        let mut total = 0;
        let mut flipped = true;
        while flipped {
            flipped = false;
            for e in 0..self.edges.len() {
                let ep = self.edges[e].pair;
                if self.edges[e].boundary || self.edges[ep].boundary {
                    continue;
                }
                let w1 = self.opposite_vertex(e)?;
                let w2 = self.opposite_vertex(ep)?;
                let (Some(a1), Some(a2)) = (
                    self.faces[self.edges[e].face].signed_angle_at(w1),
                    self.faces[self.edges[ep].face].signed_angle_at(w2),
                ) else {
                    continue;
                };
                if wrap_angle(a1 + a2) < 0.0 {
                    if !self.edge_flip(e)? {
                        continue;
                    }
                    total += 1;
                    if total > max_flips {
                        warn!("equiangulation did not settle after {total} flips");
                        return Err(MeshError::ConvergenceFailed { iterations: total });
                    }
                    flipped = true;
                }
            }
        }
        Ok(total)
    }
}
