//! Position-projection collision pass for cloth.
//!
//! After the solver integrates positions, vertices that ended up within
//! `thickness` of a collider are projected back onto the offset surface
//! along the surface normal.

use skein_math::Vec3;
use skein_solver::ExtraCollisionPass;

use crate::collision_pipeline::ColliderSet;

/// Statistics of the last projection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContactResult {
    /// Number of vertex corrections applied.
    pub resolved_count: u32,
    /// Deepest penetration corrected.
    pub max_penetration: f32,
    /// Sum of all correction distances.
    pub total_correction: f32,
}

/// Projects penetrating vertices out of a collider set.
pub struct ProjectionPass<'a> {
    colliders: &'a ColliderSet,
    pub thickness: f32,
    pub last: ContactResult,
}

impl<'a> ProjectionPass<'a> {
    pub fn new(colliders: &'a ColliderSet, thickness: f32) -> Self {
        Self {
            colliders,
            thickness,
            last: ContactResult::default(),
        }
    }
}

impl ExtraCollisionPass for ProjectionPass<'_> {
    fn correct(&mut self, _old: &[Vec3], new: &mut [Vec3]) -> bool {
        let mut result = ContactResult::default();

        for p in new.iter_mut() {
            for collider in self.colliders.iter() {
                let s = collider.sample(*p);
                let depth = self.thickness - s.distance;
                if depth <= 0.0 {
                    continue;
                }
                *p += s.normal * depth;
                result.resolved_count += 1;
                result.max_penetration = result.max_penetration.max(depth);
                result.total_correction += depth;
            }
        }

        self.last = result;
        result.resolved_count > 0
    }
}
