//! Differential kernel: exact derivatives of the dual-vertex positions.
//!
//! The barycentric circumcenter admits closed-form gradients, which is the
//! reason the geometry kernel uses it instead of the Cartesian construction.
//! [`Mesh::fc_jacobian`] differentiates the weights `lambda_q = q2 (L2 - 2 q2)`
//! through the quotient rule and assembles one 3x3 matrix per triangle
//! vertex. [`Mesh::angle_factor_deriv`] chains those matrices into the
//! gradient of the boundary angle factor.

use std::f64::consts::PI;

use nalgebra::Matrix3;

use super::Mesh;

impl Mesh {
    /// Compute the Jacobians of the centre of triangle `f` with respect to
    /// each of its vertices, stored as `drcdr[p]` aligned with the face
    /// vertex list.
    ///
    /// No-op for faces with more than three sides. Degenerate (collinear)
    /// triangles are the caller's responsibility: the weight sum must stay
    /// away from zero.
    pub fn fc_jacobian(&mut self, f: usize) {
        if self.faces[f].n_sides() > 3 {
            return;
        }

        let ri = self.vertices[self.faces[f].vertices[0]].r.coords;
        let rj = self.vertices[self.faces[f].vertices[1]].r.coords;
        let rk = self.vertices[self.faces[f].vertices[2]].r.coords;

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

        // d(alpha^2)/dr is linear in the edge vectors; the product rule over
        // lambda_q = q2 (L2 - 2 q2) gives the nine gradients below.
        let dl1_dri = 2.0 * rjk_2 * (-rki + rij);
        let dl2_dri = -2.0 * (rjk_2 + rij_2 - 2.0 * rki_2) * rki + 2.0 * rki_2 * rij;
        let dl3_dri = 2.0 * (rjk_2 + rki_2 - 2.0 * rij_2) * rij - 2.0 * rij_2 * rki;

        let dl1_drj = 2.0 * (rki_2 + rij_2 - 2.0 * rjk_2) * rjk - 2.0 * rjk_2 * rij;
        let dl2_drj = 2.0 * rki_2 * (rjk - rij);
        let dl3_drj = -2.0 * (rjk_2 + rki_2 - 2.0 * rij_2) * rij + 2.0 * rij_2 * rjk;

        let dl1_drk = -2.0 * (rki_2 + rij_2 - 2.0 * rjk_2) * rjk + 2.0 * rjk_2 * rki;
        let dl2_drk = 2.0 * (rjk_2 + rij_2 - 2.0 * rki_2) * rki - 2.0 * rki_2 * rjk;
        let dl3_drk = 2.0 * rij_2 * (-rjk + rki);

        let dlam_dri = dl1_dri + dl2_dri + dl3_dri;
        let dlam_drj = dl1_drj + dl2_drj + dl3_drj;
        let dlam_drk = dl1_drk + dl2_drk + dl3_drk;

        let inv_lambda_2 = 1.0 / (lambda * lambda);

        // quotient rule: d(lambda_q / Lambda)
        let dl1_div_dri = inv_lambda_2 * (lambda * dl1_dri - lambda_1 * dlam_dri);
        let dl2_div_dri = inv_lambda_2 * (lambda * dl2_dri - lambda_2 * dlam_dri);
        let dl3_div_dri = inv_lambda_2 * (lambda * dl3_dri - lambda_3 * dlam_dri);

        let dl1_div_drj = inv_lambda_2 * (lambda * dl1_drj - lambda_1 * dlam_drj);
        let dl2_div_drj = inv_lambda_2 * (lambda * dl2_drj - lambda_2 * dlam_drj);
        let dl3_div_drj = inv_lambda_2 * (lambda * dl3_drj - lambda_3 * dlam_drj);

        let dl1_div_drk = inv_lambda_2 * (lambda * dl1_drk - lambda_1 * dlam_drk);
        let dl2_div_drk = inv_lambda_2 * (lambda * dl2_drk - lambda_2 * dlam_drk);
        let dl3_div_drk = inv_lambda_2 * (lambda * dl3_drk - lambda_3 * dlam_drk);

        let l1_div = lambda_1 / lambda;
        let l2_div = lambda_2 / lambda;
        let l3_div = lambda_3 / lambda;

        let eye = Matrix3::identity();
        let d_dri = ri * dl1_div_dri.transpose()
            + rj * dl2_div_dri.transpose()
            + rk * dl3_div_dri.transpose()
            + l1_div * eye;
        let d_drj = ri * dl1_div_drj.transpose()
            + rj * dl2_div_drj.transpose()
            + rk * dl3_div_drj.transpose()
            + l2_div * eye;
        let d_drk = ri * dl1_div_drk.transpose()
            + rj * dl2_div_drk.transpose()
            + rk * dl3_div_drk.transpose()
            + l3_div * eye;

        self.faces[f].drcdr = vec![d_dri, d_drj, d_drk];
    }

    /// Compute the gradient of the angle-deficit factor of boundary vertex
    /// `v` with respect to the vertex itself and each of its neighbours.
    ///
    /// Stores the result in `angle_def`: entry 0 for the vertex, entry
    /// `e + 1` for the head of star edge `e`. Only the endpoints of the first
    /// and last real faces contribute; the remaining entries stay zero.
    /// Interior vertices store nothing, and the star's first and last real
    /// faces must be triangles with current Jacobians.
    pub fn angle_factor_deriv(&mut self, v: usize) {
        if !self.vertices[v].boundary {
            return;
        }
        self.vertices[v].angle_def.clear();

        let n_faces = self.vertices[v].faces.len();
        if !self.vertices[v].attached || n_faces < 2 {
            return;
        }
        let f1 = self.vertices[v].faces[0];
        let fn_ = self.vertices[v].faces[n_faces - 2];
        if self.faces[f1].n_sides() != 3 || self.faces[fn_].n_sides() != 3 {
            return;
        }

        let r = self.vertices[v].r;
        let normal = self.vertices[v].normal;
        let u1 = self.faces[f1].rc - r;
        let un = self.faces[fn_].rc - r;

        let sign = if u1.cross(&un).dot(&normal) < 0.0 { 1.0 } else { -1.0 };

        let len1 = u1.norm();
        let lenn = un.norm();
        let len1_2 = len1 * len1;
        let lenn_2 = lenn * lenn;
        let u1_dot_un = u1.dot(&un);
        let u1_hat = u1 / len1;
        let un_hat = un / lenn;

        let j1_v = self.faces[f1].jacobian_for(v);
        let jn_v = self.faces[fn_].jacobian_for(v);

        // d/dr_v of cos(theta) = (u1 . un) / (|u1||un|); the identity terms
        // come from u = rc - r_v depending on r_v directly.
        let d_r = 1.0 / (len1 * lenn)
            * (j1_v.tr_mul(&un) - un + jn_v.tr_mul(&u1) - u1)
            - u1_dot_un / (len1_2 * lenn_2)
                * (len1 * jn_v.tr_mul(&un_hat) - len1 * un_hat + lenn * j1_v.tr_mul(&u1_hat)
                    - lenn * u1_hat);

        let cos_2 = u1_dot_un * u1_dot_un / (len1_2 * lenn_2);
        let fact = if cos_2.abs() < 1.0 {
            sign / (2.0 * PI) * 1.0 / (1.0 - cos_2).sqrt()
        } else {
            0.0
        };

        self.vertices[v].angle_def.push(fact * d_r);

        let n_edges = self.vertices[v].edges.len();
        for _ in 0..n_edges {
            self.vertices[v].angle_def.push(nalgebra::Vector3::zeros());
        }

        for e in 0..n_edges {
            if e <= 1 {
                let vj = self.edges[self.vertices[v].edges[e]].to;
                let j1_j = self.faces[f1].jacobian_for(vj);
                let d_rj = 1.0 / (len1 * lenn) * j1_j.tr_mul(&un)
                    - u1_dot_un / (len1_2 * lenn_2) * (lenn * j1_j.tr_mul(&u1_hat));
                self.vertices[v].angle_def[e + 1] += fact * d_rj;
            }
            if e + 2 >= n_edges {
                let vk = self.edges[self.vertices[v].edges[e]].to;
                let jn_k = self.faces[fn_].jacobian_for(vk);
                let d_rk = 1.0 / (len1 * lenn) * jn_k.tr_mul(&u1)
                    - u1_dot_un / (len1_2 * lenn_2) * (len1 * jn_k.tr_mul(&un_hat));
                self.vertices[v].angle_def[e + 1] += fact * d_rk;
            }
        }
    }
}
