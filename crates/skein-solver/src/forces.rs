//! Force laws and their Jacobians.
//!
//! Every function here is pure: it evaluates one force term from vertex
//! state and returns the force together with its position and velocity
//! derivatives. Accumulation into the global system happens in
//! [`crate::accumulate`].

use skein_math::rotation::{orthogonal_projector, outer};
use skein_math::{Mat3, Vec3};
use skein_types::constants::{AIR_DENSITY, ALMOST_ZERO, FACE_WIND_SCALE};

/// Force on the first vertex of a two-vertex spring, and its Jacobians.
///
/// The second vertex receives `-f`. `dfdx`/`dfdv` are the derivatives of
/// the first vertex's force with respect to its own position/velocity;
/// the cross terms are their negation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringForce {
    pub f: Vec3,
    pub dfdx: Mat3,
    pub dfdv: Mat3,
}

/// Unit direction and length of `x_j − x_i`, `None` when degenerate.
fn direction(xi: Vec3, xj: Vec3) -> Option<(Vec3, f32)> {
    let d = xj - xi;
    let len = d.length();
    (len > ALMOST_ZERO).then(|| (d / len, len))
}

/// Linear spring between `i` and `j` (structural, shear, sewing).
///
/// `f_i = k(|d| − L)·d̂ + c((v_j − v_i)·d̂)·d̂` with `d = x_j − x_i`.
/// With `no_compress` the spring is slack below its rest length. A
/// positive `clamp` limits the stretch force magnitude.
///
/// The position Jacobian uses `min(1, L/|d|)` so it stays negative
/// semi-definite under compression.
#[allow(clippy::too_many_arguments)]
pub fn linear_spring(
    xi: Vec3,
    xj: Vec3,
    vi: Vec3,
    vj: Vec3,
    rest_length: f32,
    k: f32,
    damping: f32,
    no_compress: bool,
    clamp: f32,
) -> Option<SpringForce> {
    let (dir, len) = direction(xi, xj)?;

    if no_compress && len < rest_length {
        return None;
    }

    let mut stretch = k * (len - rest_length);
    if clamp > 0.0 && stretch > clamp {
        stretch = clamp;
    }

    let vel = vj - vi;
    let f = dir * (stretch + damping * vel.dot(dir));

    let ddt = outer(dir, dir);
    let ratio = (rest_length / len).min(1.0);
    let dfdx = ((Mat3::IDENTITY - ddt) * ratio - Mat3::IDENTITY) * k;
    let dfdv = ddt * -damping;

    Some(SpringForce { f, dfdx, dfdv })
}

/// Choi–Ko bending polynomial over `x = |d|/L`.
fn fb(length: f32, rest_length: f32) -> f32 {
    let x = length / rest_length;
    let xx = x * x;
    -11.541 * xx * xx + 34.193 * xx * x - 39.083 * xx + 23.116 * x - 9.713
}

fn fb_deriv(length: f32, rest_length: f32) -> f32 {
    let x = length / rest_length;
    let xx = x * x;
    -46.164 * xx * x + 102.579 * xx - 78.166 * x + 23.116
}

/// Linear (Choi–Ko) bending spring, active only under compression.
///
/// The force magnitude is the larger of the bending polynomial and the
/// damped linear term `cb(|d| − L)`; both are negative, so the spring
/// pushes the vertices apart.
pub fn bending_spring(xi: Vec3, xj: Vec3, rest_length: f32, kb: f32, cb: f32) -> Option<SpringForce> {
    let (dir, len) = direction(xi, xj)?;
    if len >= rest_length || rest_length <= ALMOST_ZERO {
        return None;
    }

    let poly = kb * fb(len, rest_length);
    let linear = cb * (len - rest_length);
    let (magnitude, jacobian) = if poly < linear {
        (linear, -cb)
    } else {
        (poly, -kb * fb_deriv(len, rest_length))
    };

    Some(SpringForce {
        f: dir * magnitude,
        dfdx: outer(dir, dir) * jacobian,
        dfdv: Mat3::ZERO,
    })
}

/// Goal spring pulling a vertex toward `goal_x`.
///
/// `f = k·(x_goal − x) + c((v_goal − v)·d̂)·d̂`, `dfdx = −k·I`,
/// `dfdv = −c·d̂d̂ᵀ`. Returns `None` when the vertex sits on its goal.
pub fn goal_spring(x: Vec3, v: Vec3, goal_x: Vec3, goal_v: Vec3, k: f32, damping: f32) -> Option<SpringForce> {
    let extent = goal_x - x;
    let len = extent.length();
    if len <= ALMOST_ZERO {
        return None;
    }
    let dir = extent / len;

    let f = extent * k + dir * (damping * (goal_v - v).dot(dir));
    Some(SpringForce {
        f,
        dfdx: Mat3::IDENTITY * -k,
        dfdv: outer(dir, dir) * -damping,
    })
}

/// Angular bending force on the edge `j → k` toward `target`.
///
/// `f_k = kb(t − e_jk) − cb·(v_jk)⊥`, `f_j = −f_k`, where `⊥` removes
/// the component along the edge. The derivatives are exact in the
/// spring term and treat the edge direction as constant in the damping
/// term. The returned Jacobians are those of `f_k`; the `j` diagonal is
/// the same and the `(j, k)` block is their negation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngularForce {
    pub fk: Vec3,
    pub dfdx: Mat3,
    pub dfdv: Mat3,
}

/// Evaluates [`AngularForce`] for the edge `x_j → x_k`.
pub fn angular_bending(xj: Vec3, xk: Vec3, vj: Vec3, vk: Vec3, target: Vec3, kb: f32, cb: f32) -> AngularForce {
    let edge = xk - xj;
    let dir = edge.normalize_or_zero();
    let vel = vk - vj;
    let vel_ortho = vel - dir * vel.dot(dir);

    AngularForce {
        fk: (target - edge) * kb - vel_ortho * cb,
        dfdx: Mat3::IDENTITY * -kb,
        dfdv: orthogonal_projector(dir) * -cb,
    }
}

/// Pressure-like wind on a face, returned per face vertex.
///
/// Each vertex receives `scale·area/n · (w_v·n̂)·n̂` with `n` the number
/// of face vertices.
pub fn face_wind(normal: Vec3, area: f32, winds: &[Vec3]) -> Vec<Vec3> {
    let factor = FACE_WIND_SCALE * area / winds.len().max(1) as f32;
    winds.iter().map(|w| normal * (factor * w.dot(normal))).collect()
}

/// Wind on a single hair vertex.
#[inline]
pub fn vertex_wind(wind: Vec3, radius: f32) -> Vec3 {
    wind * (radius * AIR_DENSITY)
}

/// Wind on one end of a hair segment, from the segment's cross section
/// as seen by the wind.
///
/// The cross section blends the side profile (`π r² sin α`) with the
/// length along the wind (`r·len·|cos α|`), where `α` is the angle
/// between wind and segment.
pub fn edge_wind(dir: Vec3, length: f32, radius: f32, wind: Vec3) -> Vec3 {
    let wind_len = wind.length();
    if wind_len == 0.0 {
        return Vec3::ZERO;
    }
    let cos_alpha = (wind.dot(dir) / wind_len).clamp(-1.0, 1.0);
    let sin_alpha = (1.0 - cos_alpha * cos_alpha).max(0.0).sqrt();
    let cross_section = radius * (std::f32::consts::PI * radius * sin_alpha + length * cos_alpha.abs());
    wind * (AIR_DENSITY * cross_section)
}
