//! Ground plane collider.
//!
//! A horizontal plane at `y = height`; everything below it is inside.

use skein_math::Vec3;

use crate::collider::{Collider, SurfaceSample};

/// Ground plane collision at a fixed Y height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    /// Height of the ground plane (Y coordinate).
    pub height: f32,
}

impl GroundPlane {
    /// Creates a new ground plane at the given height.
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Collider for GroundPlane {
    fn sample(&self, p: Vec3) -> SurfaceSample {
        SurfaceSample {
            distance: p.y - self.height,
            normal: Vec3::Y,
        }
    }

    fn name(&self) -> &str {
        "ground"
    }
}
