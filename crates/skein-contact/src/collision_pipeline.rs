//! A set of analytic colliders acting as the solver's contact source.
//!
//! Each query tests every vertex against every collider. Vertices
//! already within the margin produce current contacts; vertices that
//! will cross into it during the substep produce predicted
//! (`in_future`) contacts.

use skein_math::Vec3;
use skein_solver::{CollisionContact, ContactSource};

use crate::collider::{Collider, ColliderDesc};

/// Analytic colliders plus the contact margin.
pub struct ColliderSet {
    colliders: Vec<Box<dyn Collider>>,
    /// Distance below which a vertex counts as touching.
    pub margin: f32,
}

impl ColliderSet {
    /// Creates an empty set.
    pub fn new(margin: f32) -> Self {
        Self {
            colliders: Vec::new(),
            margin,
        }
    }

    /// Builds a set from scene descriptions.
    pub fn from_descs(descs: &[ColliderDesc], margin: f32) -> Self {
        let mut set = Self::new(margin);
        for desc in descs {
            set.colliders.push(desc.build());
        }
        set
    }

    /// Adds a collider.
    pub fn with(mut self, collider: impl Collider + 'static) -> Self {
        self.colliders.push(Box::new(collider));
        self
    }

    pub fn push(&mut self, collider: Box<dyn Collider>) {
        self.colliders.push(collider);
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Collider> {
        self.colliders.iter().map(|c| c.as_ref())
    }

    /// Moves all colliders forward by `dt`.
    pub fn advance(&mut self, dt: f32) {
        for c in &mut self.colliders {
            c.advance(dt);
        }
    }
}

impl ContactSource for ColliderSet {
    fn find_contacts(&mut self, positions: &[Vec3], velocities: &[Vec3], dt: f32) -> Vec<CollisionContact> {
        let mut contacts = Vec::new();

        for (vertex, (&p, &v)) in positions.iter().zip(velocities).enumerate() {
            for collider in &self.colliders {
                let now = collider.sample(p);
                let in_future = if now.distance < self.margin {
                    false
                } else if collider.sample(p + v * dt).distance < self.margin {
                    true
                } else {
                    continue;
                };

                let (old, new) = collider.velocity();
                contacts.push(CollisionContact {
                    vertex,
                    normal: now.normal,
                    distance: now.distance,
                    in_future,
                    collider_velocity_old: old,
                    collider_velocity_new: new,
                });
            }
        }

        contacts
    }
}
