//! # skein-types
//!
//! Shared error types and physical constants for the skein cloth and
//! hair solver.
//!
//! This crate has zero domain logic. It defines the vocabulary that all
//! other skein crates share.

pub mod constants;
pub mod error;

pub use error::{SkeinError, SkeinResult};
