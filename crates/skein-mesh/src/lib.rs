//! # skein-mesh
//!
//! Body representation for the skein mass-spring solver.
//!
//! ## Key Types
//!
//! - [`Body`]: vertices, springs, and either cloth faces or hair strands.
//! - [`Spring`]: a closed set of spring kinds with per-spring stiffness.
//! - [`Topology`]: edge adjacency used to build cloth springs.
//! - Procedural generators for benchmark bodies (quad cloth, hair strands).

pub mod body;
pub mod generators;
pub mod normals;
pub mod spring;
pub mod topology;

pub use body::{Body, BodyKind, Goal, Strand, Vertex};
pub use normals::Face;
pub use spring::{Spring, SpringKind};
pub use topology::Topology;
