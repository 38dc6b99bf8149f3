//! Half-edge mesh data structure and dual-cell geometry.
//!
//! The mesh is split across four modules:
//!
//! - [`elements`]: the passive vertex, half-edge and face records
//! - [`topology`]: the [`Mesh`] store, construction, face discovery,
//!   finalization and star ordering
//! - [`geometry`]: centres, angles, dual areas/perimeters and the boundary
//!   angle factor
//! - [`jacobian`]: exact derivatives of face centres and of the angle factor

pub mod elements;
pub mod geometry;
pub mod jacobian;
pub mod topology;

pub use elements::{Face, HalfEdge, Vertex, INVALID};
pub use topology::Mesh;
