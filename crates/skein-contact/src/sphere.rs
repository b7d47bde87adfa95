//! Analytical sphere collider.

use skein_math::Vec3;

use crate::collider::{Collider, SurfaceSample};

/// Sphere of a given radius, optionally moving at constant velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereCollider {
    pub center: Vec3,
    pub radius: f32,
    pub velocity: Vec3,
}

impl SphereCollider {
    /// Creates a static sphere collider.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            velocity: Vec3::ZERO,
        }
    }

    /// Sets a constant linear velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Collider for SphereCollider {
    fn sample(&self, p: Vec3) -> SurfaceSample {
        let offset = p - self.center;
        let dist = offset.length();
        // A point at the exact center is pushed out upward.
        let normal = if dist > 1e-6 { offset / dist } else { Vec3::Y };
        SurfaceSample {
            distance: dist - self.radius,
            normal,
        }
    }

    fn velocity(&self) -> (Vec3, Vec3) {
        (self.velocity, self.velocity)
    }

    fn advance(&mut self, dt: f32) {
        self.center += self.velocity * dt;
    }

    fn name(&self) -> &str {
        "sphere"
    }
}
