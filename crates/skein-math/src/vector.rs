//! Block-vector helpers: one `Vec3` per vertex.
//!
//! Dot products accumulate in `f64` so the conjugate-gradient residual
//! stays meaningful on bodies with many thousands of vertices.

use glam::Vec3;

/// `Σ a[i] · b[i]`.
pub fn dot(a: &[Vec3], b: &[Vec3]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| f64::from(x.dot(*y)))
        .sum()
}

/// `Σ |a[i]|²`.
pub fn norm_squared(a: &[Vec3]) -> f64 {
    dot(a, a)
}

/// `y += s · x`.
pub fn add_scaled(y: &mut [Vec3], s: f32, x: &[Vec3]) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += *xi * s;
    }
}

/// `y = x + s · y`, the search-direction update.
pub fn scale_add(y: &mut [Vec3], x: &[Vec3], s: f32) {
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi = *xi + *yi * s;
    }
}

/// `out = a − b`.
pub fn sub(a: &[Vec3], b: &[Vec3], out: &mut [Vec3]) {
    for ((o, ai), bi) in out.iter_mut().zip(a).zip(b) {
        *o = *ai - *bi;
    }
}

/// Returns true if every component of every vector is finite.
pub fn all_finite(a: &[Vec3]) -> bool {
    a.iter().all(|v| v.is_finite())
}
