//! Flattening of the dual tessellation for external rendering.
//!
//! [`Mesh::plot_area`] turns the dual cells into a shared point list plus one
//! index polygon per cell, the layout external plotting consumes directly.
//! The buffer lives on the mesh and is reused on every call; callers only
//! read it.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::error::Result;
use crate::mesh::Mesh;

/// Flattened dual tessellation: shared points, one index polygon per dual
/// cell, and the cell areas and perimeters aligned with the polygons.
#[derive(Debug, Clone, Default)]
pub struct PlotArea {
    /// Polygon corner positions: boundary vertex positions first (when
    /// requested), then the unique non-hole face centres.
    pub points: Vec<Point3<f64>>,

    /// One list of indices into `points` per emitted dual cell, in
    /// rotational order.
    pub sides: Vec<Vec<usize>>,

    /// Dual-cell areas, aligned with `sides`.
    pub area: Vec<f64>,

    /// Dual-cell perimeters, aligned with `sides`.
    pub perim: Vec<f64>,
}

impl PlotArea {
    pub(crate) fn clear(&mut self) {
        self.points.clear();
        self.sides.clear();
        self.area.clear();
        self.perim.clear();
    }
}

impl Mesh {
    /// Flatten the dual cells of all attached vertices into the mesh-owned
    /// plot buffer.
    ///
    /// Interior cells list their face-centre indices in star order. When
    /// `include_boundary` is set, boundary cells are emitted too, led by the
    /// index of the vertex position itself and followed by the real face
    /// centres `0..n-2` in the same rotational order.
    pub fn plot_area(&mut self, include_boundary: bool) -> Result<&PlotArea> {
        let mut points = Vec::new();
        let mut bnd_vert: HashMap<usize, usize> = HashMap::new();
        let mut face_idx: HashMap<usize, usize> = HashMap::new();

        for v in 0..self.vertices.len() {
            let vert = &self.vertices[v];
            if vert.attached && vert.boundary && include_boundary {
                bnd_vert.insert(vert.id, points.len());
                points.push(vert.r);
            }
        }
        for v in 0..self.vertices.len() {
            if !self.vertices[v].attached {
                continue;
            }
            for f in self.vertices[v].faces.clone() {
                let face = &self.faces[f];
                if !face.is_hole && !face_idx.contains_key(&face.id) {
                    face_idx.insert(face.id, points.len());
                    points.push(face.rc);
                }
            }
        }

        let mut sides = Vec::new();
        let mut area = Vec::new();
        let mut perim = Vec::new();
        for v in 0..self.vertices.len() {
            if !self.vertices[v].attached {
                continue;
            }
            let boundary = self.vertices[v].boundary;
            if !boundary {
                let cell: Vec<usize> = self.vertices[v].faces.iter().map(|f| face_idx[f]).collect();
                sides.push(cell);
                area.push(self.dual_area(v)?);
                perim.push(self.dual_perimeter(v)?);
            } else if include_boundary {
                let vert = &self.vertices[v];
                let mut cell = Vec::with_capacity(vert.faces.len());
                cell.push(bnd_vert[&vert.id]);
                for f in &vert.faces[..vert.faces.len() - 1] {
                    cell.push(face_idx[f]);
                }
                sides.push(cell);
                area.push(self.dual_area(v)?);
                perim.push(self.dual_perimeter(v)?);
            }
        }

        self.plot.points = points;
        self.plot.sides = sides;
        self.plot.area = area;
        self.plot.perim = perim;
        Ok(&self.plot)
    }
}
