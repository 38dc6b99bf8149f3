//! # dualcell
//!
//! A half-edge surface mesh engine with dual-cell geometry, built as the
//! spatial core of a soft-active-matter tissue simulator.
//!
//! The mesh represents a tissue as a cell complex embedded in 3D: a
//! triangulated surface whose *dual* tessellation carries the physics. Every
//! vertex owns one dual cell, the polygon through the centres of its incident
//! faces, and the engine keeps that cell's area, perimeter and analytic
//! derivatives current while the driver moves the vertices and remeshes.
//!
//! ## Features
//!
//! - **Half-edge store**: flat element tables with an O(1) directed edge map,
//!   hole faces marking boundary components, rotationally ordered vertex stars
//! - **Dual geometry**: circumcenters (in the barycentric form that admits
//!   closed-form gradients), dual areas and perimeters, circumradii, boundary
//!   angle-deficit factors
//! - **Differential kernel**: exact Jacobians of face centres and gradients of
//!   the boundary angle factor, for force computations downstream
//! - **Remeshing**: edge flips, Delaunay equiangulation, obtuse-boundary
//!   pruning
//!
//! ## Quick Start
//!
//! ```
//! use dualcell::prelude::*;
//! use nalgebra::{Point3, Vector3};
//!
//! // a square fan: centre plus four corner vertices
//! let mut mesh = Mesh::new();
//! let pts = [
//!     (0.0_f64, 0.0, 0.0),
//!     (1.0, 1.0, 0.0),
//!     (-1.0, 1.0, 0.0),
//!     (-1.0, -1.0, 0.0),
//!     (1.0, -1.0, 0.0),
//! ];
//! for (x, y, z) in pts {
//!     mesh.add_vertex(Point3::new(x, y, z), Vector3::z());
//! }
//! for [u, v] in [[0, 1], [0, 2], [0, 3], [0, 4], [1, 2], [2, 3], [3, 4], [4, 1]] {
//!     mesh.add_edge(u, v);
//!     mesh.add_edge(v, u);
//! }
//! mesh.generate_faces().unwrap();
//! mesh.postprocess(true).unwrap();
//! mesh.generate_dual_mesh();
//!
//! assert_eq!(mesh.num_faces(), 5); // four triangles and the hole
//! assert_eq!(mesh.angle_factor(0), 1.0);
//! let area = mesh.dual_area(0).unwrap();
//! assert!(area > 0.0);
//! ```
//!
//! ## Driver Protocol
//!
//! Per simulation step the driver writes vertex positions and normals
//! directly ([`Mesh::set_position`](mesh::Mesh::set_position),
//! [`Mesh::set_normal`](mesh::Mesh::set_normal)), calls
//! [`Mesh::update_dual_mesh`](mesh::Mesh::update_dual_mesh) and then reads
//! areas, perimeters, centres, Jacobians and angle factors. Topological
//! operations ([`Mesh::equiangulate`](mesh::Mesh::equiangulate),
//! [`Mesh::remove_obtuse_boundary`](mesh::Mesh::remove_obtuse_boundary))
//! leave distant caches stale, so they are followed by another refresh.
//!
//! The engine is single-threaded by design; parallelism belongs at the
//! per-mesh level, outside this crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod plot;

/// Prelude module for convenient imports.
///
/// ```
/// use dualcell::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{Face, HalfEdge, Mesh, Vertex, INVALID};
    pub use crate::plot::PlotArea;
}

// Re-export nalgebra for convenience
pub use nalgebra;

#[cfg(test)]
pub(crate) mod testutil;
