//! Analytic collider shapes.

use serde::{Deserialize, Serialize};
use skein_math::Vec3;

use crate::ground_plane::GroundPlane;
use crate::sphere::SphereCollider;

/// Closest-surface query against a collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Signed distance, negative inside the collider.
    pub distance: f32,
    /// Outward unit normal at the closest surface point.
    pub normal: Vec3,
}

/// A static or rigidly moving collision shape.
pub trait Collider: Send {
    /// Distance and normal of the surface closest to `p`.
    fn sample(&self, p: Vec3) -> SurfaceSample;

    /// Surface velocity at the start and end of the substep.
    fn velocity(&self) -> (Vec3, Vec3) {
        (Vec3::ZERO, Vec3::ZERO)
    }

    /// Advances a moving collider by `dt`.
    fn advance(&mut self, _dt: f32) {}

    /// Shape name, for logs and reports.
    fn name(&self) -> &str;
}

/// Serializable collider description, as found in scene files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderDesc {
    Sphere {
        center: [f32; 3],
        radius: f32,
        #[serde(default)]
        velocity: [f32; 3],
    },
    Ground {
        height: f32,
    },
}

impl ColliderDesc {
    /// Instantiates the described collider.
    pub fn build(&self) -> Box<dyn Collider> {
        match *self {
            ColliderDesc::Sphere {
                center,
                radius,
                velocity,
            } => Box::new(SphereCollider::new(Vec3::from(center), radius).with_velocity(Vec3::from(velocity))),
            ColliderDesc::Ground { height } => Box::new(GroundPlane::new(height)),
        }
    }
}
