//! # skein-solver
//!
//! Implicit mass-spring integration for cloth and hair.
//!
//! ## Key Types
//!
//! - [`Simulation`] — per-body frame stepper owning the solver state
//! - [`ImplicitSolverState`] — motion buffers and block-sparse Jacobians
//! - [`SimulationConfig`] — stiffness, damping, timing and solver limits
//! - [`SolverResult`] — per-frame convergence statistics
//! - [`ContactSource`], [`ForceField`], [`ExtraCollisionPass`] — hooks for
//!   collision detection and effectors

pub mod accumulate;
pub mod collaborators;
pub mod config;
pub mod constraints;
pub mod continuum;
pub mod forces;
pub mod implicit;
pub mod result;
pub mod simulation;
pub mod state;
pub mod strands;

pub use collaborators::{
    CollisionContact, ContactSource, ExtraCollisionPass, ForceField, NoField, NullContactSource,
    UniformWind,
};
pub use config::{CollisionConfig, HairConfig, SimulationConfig};
pub use constraints::VertexConstraint;
pub use continuum::GridSnapshot;
pub use result::{SolverResult, SolverStatus, SubstepResult};
pub use simulation::{FrameReport, Simulation};
pub use state::ImplicitSolverState;
