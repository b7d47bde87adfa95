//! Rotation and outer-product helpers for spring Jacobians.

use glam::{Mat3, Quat, Vec3};

/// Outer product `a bᵀ`.
#[inline]
pub fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Projection onto the plane orthogonal to the unit vector `n`: `I − n nᵀ`.
#[inline]
pub fn orthogonal_projector(n: Vec3) -> Mat3 {
    Mat3::IDENTITY - outer(n, n)
}

/// Shortest-arc rotation mapping the direction of `from` onto the
/// direction of `to`.
///
/// Degenerate inputs (either vector near zero) give the identity.
pub fn rotation_between(from: Vec3, to: Vec3) -> Mat3 {
    let (Some(a), Some(b)) = (from.try_normalize(), to.try_normalize()) else {
        return Mat3::IDENTITY;
    };
    Mat3::from_quat(Quat::from_rotation_arc(a, b))
}
