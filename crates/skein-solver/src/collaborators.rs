//! Interfaces to the systems around the solver core.
//!
//! Collision detection, effector evaluation and the legacy cloth
//! collision pass live outside the solver. The orchestrator only sees
//! them through these traits.

use serde::{Deserialize, Serialize};
use skein_math::Vec3;

/// A vertex-versus-collider contact for one substep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionContact {
    /// Index of the colliding vertex.
    pub vertex: usize,
    /// Unit contact normal, pointing away from the collider.
    pub normal: Vec3,
    /// Signed distance from the vertex to the collider surface.
    pub distance: f32,
    /// The contact is predicted rather than current.
    pub in_future: bool,
    /// Collider point velocity at the start of the substep.
    pub collider_velocity_old: Vec3,
    /// Collider point velocity at the end of the substep.
    pub collider_velocity_new: Vec3,
}

impl CollisionContact {
    /// A current contact against a static collider.
    pub fn resting(vertex: usize, normal: Vec3, distance: f32) -> Self {
        Self {
            vertex,
            normal,
            distance,
            in_future: false,
            collider_velocity_old: Vec3::ZERO,
            collider_velocity_new: Vec3::ZERO,
        }
    }
}

/// Produces contacts for the current vertex state.
pub trait ContactSource {
    /// Finds contacts for the given positions and velocities over a
    /// substep of length `dt`.
    fn find_contacts(&mut self, positions: &[Vec3], velocities: &[Vec3], dt: f32) -> Vec<CollisionContact>;
}

/// Samples external forces (wind, effectors) per vertex.
pub trait ForceField {
    /// Force sample at a vertex.
    fn sample(&self, position: Vec3, velocity: Vec3, index: usize) -> Vec3;

    /// Returns true if the field is identically zero. Zero fields skip
    /// wind evaluation entirely.
    fn is_zero(&self) -> bool {
        false
    }
}

/// Position-based collision pass run after cloth positions are integrated.
pub trait ExtraCollisionPass {
    /// Corrects `new` positions in place given the substep's start
    /// positions `old`. Returns true if any position changed.
    fn correct(&mut self, old: &[Vec3], new: &mut [Vec3]) -> bool;
}

/// A contact source that never reports contacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullContactSource;

impl ContactSource for NullContactSource {
    fn find_contacts(&mut self, _positions: &[Vec3], _velocities: &[Vec3], _dt: f32) -> Vec<CollisionContact> {
        Vec::new()
    }
}

/// A force field that is zero everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoField;

impl ForceField for NoField {
    fn sample(&self, _position: Vec3, _velocity: Vec3, _index: usize) -> Vec3 {
        Vec3::ZERO
    }

    fn is_zero(&self) -> bool {
        true
    }
}

/// A spatially uniform wind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformWind(pub Vec3);

impl ForceField for UniformWind {
    fn sample(&self, _position: Vec3, _velocity: Vec3, _index: usize) -> Vec3 {
        self.0
    }
}
