//! Topological mesh operations.
//!
//! This module contains the moves that change mesh topology while keeping
//! every structural invariant intact:
//!
//! - **Edge flipping / equiangulation**: swap triangle diagonals until the
//!   triangulation is locally Delaunay
//! - **Obtuse-boundary pruning**: absorb spiky boundary triangles into the
//!   hole face
//!
//! All operations leave derived quantities beyond the directly affected
//! vertices stale; the driver refreshes them with
//! [`Mesh::update_dual_mesh`](crate::mesh::Mesh::update_dual_mesh).

pub mod boundary;
pub mod flip;
