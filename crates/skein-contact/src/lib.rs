//! # skein-contact
//!
//! Reference collision collaborators for the skein solver.
//!
//! - [`ColliderSet`] — analytic colliders as a [`skein_solver::ContactSource`]
//! - [`ProjectionPass`] — position projection as a
//!   [`skein_solver::ExtraCollisionPass`] for cloth
//!
//! Shapes: [`SphereCollider`], [`GroundPlane`].

pub mod collider;
pub mod collision_pipeline;
pub mod ground_plane;
pub mod projection;
pub mod sphere;

pub use collider::{Collider, ColliderDesc, SurfaceSample};
pub use collision_pipeline::ColliderSet;
pub use ground_plane::GroundPlane;
pub use projection::{ContactResult, ProjectionPass};
pub use sphere::SphereCollider;
