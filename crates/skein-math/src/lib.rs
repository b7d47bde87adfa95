//! # skein-math
//!
//! Linear algebra for the skein implicit mass-spring solver.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Mat3`, `Quat`)
//! - A symmetric 3×3 block-sparse matrix over a fixed-capacity pattern
//! - Block-vector helpers used by the conjugate-gradient loop
//! - Rotation and outer-product helpers for spring Jacobians

pub mod rotation;
pub mod sparse;
pub mod vector;

// Re-export glam types as the canonical math types for skein.
pub use glam::{Mat3, Quat, Vec3};
