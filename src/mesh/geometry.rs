//! Geometry kernel: face centres, interior angles, dual-cell areas and
//! perimeters, circumradii and the boundary angle factor.
//!
//! All quantities are cached on the entity they describe and refreshed by
//! [`Mesh::generate_dual_mesh`] / [`Mesh::update_dual_mesh`]. Consumers must
//! order refresh before read, or accept stale values.
//!
//! # Dual cells
//!
//! The dual cell of a vertex is the polygon through the centres of its
//! incident faces, in star order. For boundary vertices the hole face
//! contributes no centre and the contour closes through the vertex position
//! itself.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use super::Mesh;
use crate::error::{MeshError, Result};

/// Signed angle from `a` to `b` about `axis`, in `(-pi, pi]`.
#[inline]
pub(crate) fn signed_angle(a: &Vector3<f64>, b: &Vector3<f64>, axis: &Vector3<f64>) -> f64 {
    a.cross(b).dot(axis).atan2(a.dot(b))
}

/// Wrap an angle into `(-pi, pi]`.
#[inline]
pub(crate) fn wrap_angle(theta: f64) -> f64 {
    theta.sin().atan2(theta.cos())
}

impl Mesh {
    /// Refresh angles and centres of every non-hole face.
    pub fn generate_dual_mesh(&mut self) {
        for f in 0..self.faces.len() {
            if self.faces[f].is_hole {
                continue;
            }
            self.compute_angles(f);
            self.compute_centre(f);
        }
    }

    /// Refresh angles, centres and centre Jacobians of every non-hole face,
    /// then the angle-factor gradients of every vertex.
    pub fn update_dual_mesh(&mut self) {
        for f in 0..self.faces.len() {
            if self.faces[f].is_hole {
                continue;
            }
            self.compute_angles(f);
            self.compute_centre(f);
            self.fc_jacobian(f);
        }
        for v in 0..self.vertices.len() {
            self.angle_factor_deriv(v);
        }
    }

    /// Compute the centre of face `f`: the circumcenter for triangles (unless
    /// the geometric-centre toggle is set), the geometric centre otherwise.
    pub fn compute_centre(&mut self, f: usize) {
        let geometric = self.faces[f].n_sides() > 3 || !self.circumcenter;
        if geometric {
            self.compute_geometric_centre(f);
        } else {
            self.compute_circumcentre(f);
        }
    }

    /// Circumcenter of a triangular face in barycentric form.
    ///
    /// With squared edge lengths `a2`, `b2`, `c2` and `L2` their sum, the
    /// weights are `lambda_q = q2 * (L2 - 2 q2)`; the form coincides with the
    /// Cartesian circumcenter for non-degenerate triangles and admits the
    /// closed-form derivatives used by the Jacobian kernel.
    fn compute_circumcentre(&mut self, f: usize) {
        let face = &self.faces[f];
        if face.n_sides() > 3 {
            return;
        }
        let ri = self.vertices[face.vertices[0]].r.coords;
        let rj = self.vertices[face.vertices[1]].r.coords;
        let rk = self.vertices[face.vertices[2]].r.coords;

        let rjk = rj - rk;
        let rki = rk - ri;
        let rij = ri - rj;

        let rjk_2 = rjk.norm_squared();
        let rki_2 = rki.norm_squared();
        let rij_2 = rij.norm_squared();
        let l_2 = rjk_2 + rki_2 + rij_2;
        let lambda_1 = rjk_2 * (l_2 - 2.0 * rjk_2);
        let lambda_2 = rki_2 * (l_2 - 2.0 * rki_2);
        let lambda_3 = rij_2 * (l_2 - 2.0 * rij_2);
        let lambda = lambda_1 + lambda_2 + lambda_3;

        self.faces[f].rc = Point3::from((lambda_1 * ri + lambda_2 * rj + lambda_3 * rk) / lambda);
    }

    /// Geometric centre: the arithmetic mean of the face vertex positions.
    fn compute_geometric_centre(&mut self, f: usize) {
        let face = &self.faces[f];
        let n = face.n_sides() as f64;
        let mut rc = Vector3::zeros();
        for &v in &face.vertices {
            rc += self.vertices[v].r.coords;
        }
        self.faces[f].rc = Point3::from(rc / n);
    }

    /// Compute the interior angles at each vertex of face `f`.
    ///
    /// Fills both caches: the cosine (the user-visible quantity, aligned with
    /// the face vertex list) and the signed angle about the vertex normal
    /// (consumed by the equiangulation flip test).
    pub fn compute_angles(&mut self, f: usize) {
        let n = self.faces[f].n_sides();
        let mut angles = Vec::with_capacity(n);
        let mut signed = Vec::with_capacity(n);
        for i in 0..n {
            let i_m = if i == 0 { n - 1 } else { i - 1 };
            let i_p = if i == n - 1 { 0 } else { i + 1 };
            let face = &self.faces[f];
            let ri = self.vertices[face.vertices[i]].r;
            let ri_m = self.vertices[face.vertices[i_m]].r;
            let ri_p = self.vertices[face.vertices[i_p]].r;
            let dr1 = (ri_p - ri).normalize();
            let dr2 = (ri_m - ri).normalize();
            angles.push(dr1.dot(&dr2));
            signed.push(signed_angle(&dr1, &dr2, &self.vertices[face.vertices[i]].normal));
        }
        self.faces[f].angles = angles;
        self.faces[f].signed_angles = signed;
    }

    /// Signed dual-cell area of vertex `v`.
    ///
    /// `A = 1/2 sum_mu (r_mu x r_mu+1) . N`, with `r_mu` running over the
    /// ordered incident face centres; for boundary vertices the contour
    /// closes through the vertex position. The sign reports the star
    /// chirality during ordering; the stored `area` is made positive there.
    pub fn dual_area(&mut self, v: usize) -> Result<f64> {
        if !self.vertices[v].attached {
            return Ok(0.0);
        }
        if !self.vertices[v].ordered {
            return Err(MeshError::StarNotOrdered { vertex: v });
        }

        let vert = &self.vertices[v];
        let normal = vert.normal;
        let n = vert.faces.len();
        let mut area = 0.0;
        if !vert.boundary {
            for f in 0..n {
                let rc = self.faces[vert.faces[f]].rc.coords;
                let rc_next = self.faces[vert.faces[(f + 1) % n]].rc.coords;
                area += rc.cross(&rc_next).dot(&normal);
            }
        } else if n >= 2 {
            // hole face last: centres 0..n-1 are real, endpoints tie to the vertex
            let r = vert.r.coords;
            area = r.cross(&self.faces[vert.faces[0]].rc.coords).dot(&normal);
            for f in 0..n - 2 {
                let rc = self.faces[vert.faces[f]].rc.coords;
                let rc_next = self.faces[vert.faces[f + 1]].rc.coords;
                area += rc.cross(&rc_next).dot(&normal);
            }
            area += self.faces[vert.faces[n - 2]].rc.coords.cross(&r).dot(&normal);
        }
        area *= 0.5;

        self.vertices[v].area = area;
        Ok(area)
    }

    /// Dual-cell perimeter of vertex `v`: the length of the contour used by
    /// [`Mesh::dual_area`].
    pub fn dual_perimeter(&mut self, v: usize) -> Result<f64> {
        if !self.vertices[v].attached {
            return Ok(0.0);
        }
        if !self.vertices[v].ordered {
            return Err(MeshError::StarNotOrdered { vertex: v });
        }

        let vert = &self.vertices[v];
        let n = vert.faces.len();
        let mut perim = 0.0;
        if !vert.boundary {
            for f in 0..n {
                let rc = self.faces[vert.faces[f]].rc;
                let rc_next = self.faces[vert.faces[(f + 1) % n]].rc;
                perim += (rc - rc_next).norm();
            }
        } else if n >= 2 {
            perim = (vert.r - self.faces[vert.faces[0]].rc).norm();
            for f in 0..n - 2 {
                let rc = self.faces[vert.faces[f]].rc;
                let rc_next = self.faces[vert.faces[f + 1]].rc;
                perim += (rc - rc_next).norm();
            }
            perim += (self.faces[vert.faces[n - 2]].rc - vert.r).norm();
        }

        self.vertices[v].perim = perim;
        Ok(perim)
    }

    /// Radius of the circumscribed circle of face `f`; 0 for non-triangles.
    pub fn circum_radius(&mut self, f: usize) -> f64 {
        let face = &self.faces[f];
        let radius = if face.n_sides() > 3 {
            0.0
        } else {
            (self.vertices[face.vertices[0]].r - face.rc).norm()
        };
        self.faces[f].radius = radius;
        radius
    }

    /// Area of face `f`, by fan triangulation from its first vertex.
    pub fn face_area(&mut self, f: usize) -> f64 {
        let face = &self.faces[f];
        let r0 = self.vertices[face.vertices[0]].r;
        let mut area = 0.0;
        for i in 1..face.n_sides() - 1 {
            let r1 = self.vertices[face.vertices[i]].r;
            let r2 = self.vertices[face.vertices[i + 1]].r;
            area += (r1 - r0).cross(&(r2 - r0)).norm();
        }
        area *= 0.5;
        self.faces[f].area = area;
        area
    }

    /// Scaling factor for the native cell area of a boundary vertex:
    /// `zeta = (2 pi - theta) / 2 pi` where `theta` is the turn from the
    /// first to the last real face centre about the vertex.
    ///
    /// Interior vertices score 1; detached vertices and boundary corners with
    /// fewer than three incident faces score 0.
    pub fn angle_factor(&self, v: usize) -> f64 {
        let vert = &self.vertices[v];
        if !vert.boundary {
            return 1.0;
        }
        if vert.faces.len() < 3 || !vert.attached {
            return 0.0;
        }

        let f1 = &self.faces[vert.faces[0]];
        let fn_ = &self.faces[vert.faces[vert.faces.len() - 2]];
        let u1 = f1.rc - vert.r;
        let un = fn_.rc - vert.r;

        let mut angle = (u1.dot(&un) / (u1.norm() * un.norm())).clamp(-1.0, 1.0).acos();
        if u1.cross(&un).dot(&vert.normal) > 0.0 {
            angle = 2.0 * PI - angle;
        }
        (2.0 * PI - angle) / (2.0 * PI)
    }
}
