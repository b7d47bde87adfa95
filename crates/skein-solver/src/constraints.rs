//! Per-vertex velocity constraints for the filtered CG solve.
//!
//! Each vertex carries a filter `S` that projects out its constrained
//! velocity directions and a prescribed velocity change `z` along
//! them. Pinned vertices fix all three directions; collisions fix the
//! contact normal.

use skein_math::rotation::orthogonal_projector;
use skein_math::{Mat3, Vec3};
use skein_types::constants::ALMOST_ZERO;

use crate::collaborators::CollisionContact;
use crate::config::CollisionConfig;

/// Velocity constraint on one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum VertexConstraint {
    /// Unconstrained.
    #[default]
    Free,
    /// All degrees of freedom fixed, `Δv = 0`. The velocity itself is
    /// prescribed from outside.
    Pinned,
    /// The normal direction is fixed to the prescribed `impulse`; the
    /// two tangent directions stay free.
    Collision { normal: Vec3, impulse: Vec3 },
}

impl VertexConstraint {
    #[inline]
    pub fn is_pinned(&self) -> bool {
        matches!(self, VertexConstraint::Pinned)
    }

    /// Filter matrix `S`.
    pub fn filter_matrix(&self) -> Mat3 {
        match *self {
            VertexConstraint::Free => Mat3::IDENTITY,
            VertexConstraint::Pinned => Mat3::ZERO,
            VertexConstraint::Collision { normal, .. } => orthogonal_projector(normal),
        }
    }

    /// Applies the filter to one vertex's vector.
    #[inline]
    pub fn filter(&self, v: Vec3) -> Vec3 {
        match *self {
            VertexConstraint::Free => v,
            VertexConstraint::Pinned => Vec3::ZERO,
            VertexConstraint::Collision { normal, .. } => v - normal * normal.dot(v),
        }
    }

    /// Prescribed velocity change `z`.
    #[inline]
    pub fn target(&self) -> Vec3 {
        match *self {
            VertexConstraint::Collision { impulse, .. } => impulse,
            _ => Vec3::ZERO,
        }
    }
}

/// Applies the per-vertex filters to a block vector in place.
pub fn filter_in_place(constraints: &[VertexConstraint], v: &mut [Vec3]) {
    for (c, vi) in constraints.iter().zip(v.iter_mut()) {
        *vi = c.filter(*vi);
    }
}

/// Computes the velocity change that resolves a contact, if any.
///
/// Responds only to current contacts within the collision margin whose
/// vertex approaches the collider. Repulsion pushes out of deep
/// penetrations but is capped at four times the bounce velocity; inside
/// the margin bounce is dropped.
pub fn collision_response(
    contact: &CollisionContact,
    velocity: Vec3,
    dt: f32,
    collision: &CollisionConfig,
) -> Option<Vec3> {
    let epsilon = collision.epsilon;
    let margin = contact.distance - epsilon;

    if margin > 0.0 || contact.in_future {
        return None;
    }

    let n = contact.normal;
    let v_rel_old = velocity - contact.collider_velocity_old;
    let v_rel_new = velocity - contact.collider_velocity_new;
    let v_nor_old = v_rel_old.dot(n);

    if v_nor_old >= -ALMOST_ZERO {
        return None;
    }

    let v_nor_new = v_rel_new.dot(n);
    let bounce = -v_nor_old * collision.restitution;
    let repulse = (-margin / dt).clamp(0.0, 4.0 * bounce);

    let impulse = if margin < -epsilon {
        n * (repulse.max(bounce) - v_nor_new)
    } else {
        n * (repulse - v_nor_new)
    };
    Some(impulse)
}

/// Rebuilds the constraint list for a substep.
///
/// Every pinned vertex gets a [`VertexConstraint::Pinned`]. Each contact
/// that produces a response adds a collision constraint, at most one
/// per vertex per substep: later contacts on an already responded
/// vertex are skipped. This is an approximation that avoids instability
/// from stacking several impulses.
///
/// `impulse_count` is reset and then counts the responses per vertex.
/// Returns the number of collision constraints added.
pub fn setup_constraints(
    constraints: &mut [VertexConstraint],
    pinned: &[bool],
    impulse_count: &mut [u32],
    velocities: &[Vec3],
    contacts: &[CollisionContact],
    collision: &CollisionConfig,
    dt: f32,
) -> usize {
    for ((c, &is_pinned), count) in constraints.iter_mut().zip(pinned).zip(impulse_count.iter_mut()) {
        *c = if is_pinned {
            VertexConstraint::Pinned
        } else {
            VertexConstraint::Free
        };
        *count = 0;
    }

    let mut added = 0;
    for contact in contacts {
        let v = contact.vertex;
        if v >= constraints.len() || pinned[v] || impulse_count[v] > 0 {
            continue;
        }
        let Some(impulse) = collision_response(contact, velocities[v], dt, collision) else {
            continue;
        };
        constraints[v] = VertexConstraint::Collision {
            normal: contact.normal,
            impulse,
        };
        impulse_count[v] += 1;
        added += 1;
    }
    added
}
