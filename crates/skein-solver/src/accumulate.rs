//! Force accumulation over a whole body.
//!
//! Evaluates gravity, drag, wind and every active spring at the current
//! state and adds forces and Jacobians into the solver state. Spring
//! stiffness is derived from the configuration each call, scaled by
//! the body's average structural spring length.

use skein_math::rotation::rotation_between;
use skein_math::{Mat3, Vec3};
use skein_mesh::{Body, SpringKind};
use skein_types::constants::FLT_EPSILON;

use crate::collaborators::ForceField;
use crate::config::SimulationConfig;
use crate::forces::{
    angular_bending, bending_spring, edge_wind, face_wind, goal_spring, linear_spring, vertex_wind,
};
use crate::state::{ImplicitSolverState, SpringSlots};
use crate::strands::StrandIndex;

/// Inputs to one force evaluation.
pub struct ForceContext<'a> {
    pub body: &'a Body,
    pub config: &'a SimulationConfig,
    pub strands: &'a StrandIndex,
    pub field: &'a dyn ForceField,
    /// Average structural rest length of the body.
    pub average_length: f32,
    /// Normalized time within the frame, `[0, 1]`.
    pub time: f32,
}

impl ForceContext<'_> {
    fn length_scale(&self) -> f32 {
        self.average_length + FLT_EPSILON
    }

    fn linear_stiffness(&self, s: f32) -> f32 {
        let c = self.config;
        (c.structural + s * (c.max_structural - c.structural).abs()) / self.length_scale()
    }

    fn bending_stiffness(&self, s: f32) -> f32 {
        let c = self.config;
        (c.bending + s * (c.max_bending - c.bending).abs()) / (20.0 * self.length_scale())
    }

    fn angular_stiffness(&self, s: f32) -> f32 {
        s * self.config.bending / (20.0 * self.length_scale())
    }

    fn bending_damping(&self) -> f32 {
        self.config.bending_damping / (20.0 * self.length_scale())
    }

    fn goal_position(&self, i: usize) -> Option<(Vec3, Vec3)> {
        let goal = self.body.vertices[i].goal?;
        let x = goal.start.lerp(goal.end, self.time);
        let v = (goal.end - goal.start) / self.config.frame_span();
        Some((x, v))
    }
}

/// Accumulates all forces of `ctx.body` into `state`.
///
/// The caller clears forces first.
pub fn accumulate_forces(state: &mut ImplicitSolverState, ctx: &ForceContext<'_>) {
    add_gravity(state, Vec3::from(ctx.config.gravity));
    add_drag(state, ctx.config.drag());

    if !ctx.field.is_zero() {
        add_wind(state, ctx);
    }

    add_spring_forces(state, ctx);

    if ctx.body.is_hair() {
        add_strand_bending(state, ctx);
    }
}

/// Gravity: `f += m·g`.
pub fn add_gravity(state: &mut ImplicitSolverState, gravity: Vec3) {
    for (f, &m) in state.f.iter_mut().zip(&state.mass) {
        *f += gravity * m;
    }
}

/// Isotropic air drag: `f −= drag·v`, `dF/dv −= drag·I`.
pub fn add_drag(state: &mut ImplicitSolverState, drag: f32) {
    if drag == 0.0 {
        return;
    }
    let jacobian = Mat3::IDENTITY * -drag;
    for i in 0..state.vertex_count() {
        state.f[i] -= state.v[i] * drag;
        state.dfdv.add_diagonal(i, jacobian);
    }
}

fn add_wind(state: &mut ImplicitSolverState, ctx: &ForceContext<'_>) {
    let n = state.vertex_count();
    for i in 0..n {
        state.scratch.wind[i] = ctx.field.sample(state.x[i], state.v[i], i);
    }

    let faces = ctx.body.faces();
    if !faces.is_empty() {
        let mut winds = Vec::with_capacity(4);
        for face in faces {
            let idx = face.indices();
            let (normal, area) = face.normal_and_area(&state.x);
            if area == 0.0 {
                continue;
            }
            winds.clear();
            winds.extend(idx.iter().map(|&v| state.scratch.wind[v]));
            for (&v, f) in idx.iter().zip(face_wind(normal, area, &winds)) {
                state.f[v] += f;
            }
        }
        return;
    }

    if !ctx.body.is_hair() {
        return;
    }

    if ctx.config.hair.edge_wind {
        for strand in ctx.body.strands() {
            for (i, j) in strand.segments() {
                let d = state.x[i] - state.x[j];
                let length = d.length();
                let dir = d.normalize_or_zero();
                let fi = edge_wind(dir, length, ctx.body.vertices[i].radius, state.scratch.wind[i]);
                let fj = edge_wind(dir, length, ctx.body.vertices[j].radius, state.scratch.wind[j]);
                state.f[i] += fi;
                state.f[j] += fj;
            }
        }
    } else {
        for (i, vert) in ctx.body.vertices.iter().enumerate() {
            state.f[i] += vertex_wind(state.scratch.wind[i], vert.radius);
        }
    }
}

fn add_spring_forces(state: &mut ImplicitSolverState, ctx: &ForceContext<'_>) {
    let config = ctx.config;
    let is_hair = ctx.body.is_hair();

    for (s, spring) in ctx.body.springs.iter().enumerate() {
        if !spring.active {
            continue;
        }

        match (spring.kind, state.spring_slots(s)) {
            (
                SpringKind::Structural { i, j, rest_length }
                | SpringKind::Shear { i, j, rest_length },
                SpringSlots::Pair(slot),
            ) => {
                let k = ctx.linear_stiffness(spring.stiffness);
                if let Some(force) = linear_spring(
                    state.x[i],
                    state.x[j],
                    state.v[i],
                    state.v[j],
                    rest_length,
                    k,
                    config.spring_damping,
                    config.no_compress,
                    0.0,
                ) {
                    state.apply_spring(i, j, slot, &force);
                }
            }
            (SpringKind::Sewing { i, j, rest_length }, SpringSlots::Pair(slot)) => {
                let k = ctx.linear_stiffness(spring.stiffness);
                if let Some(force) = linear_spring(
                    state.x[i],
                    state.x[j],
                    state.v[i],
                    state.v[j],
                    rest_length,
                    k,
                    config.spring_damping,
                    config.no_compress,
                    config.max_sewing_force,
                ) {
                    state.apply_spring(i, j, slot, &force);
                }
            }
            (SpringKind::Bending { i, j, rest_length }, SpringSlots::Pair(slot)) => {
                let kb = ctx.bending_stiffness(spring.stiffness);
                let cb = ctx.bending_damping();
                if let Some(force) = bending_spring(state.x[i], state.x[j], rest_length, kb, cb) {
                    state.apply_spring(i, j, slot, &force);
                }
            }
            (
                SpringKind::AngularBending {
                    j, k, rest_edge_jk, ..
                },
                SpringSlots::Triple { jk, .. },
            ) if !ctx.strands.chained.get(s).copied().unwrap_or(false) => {
                // Outside a strand chain there is no accumulated frame;
                // the rest edge is used as is.
                let kb = ctx.angular_stiffness(spring.stiffness);
                let force = angular_bending(
                    state.x[j],
                    state.x[k],
                    state.v[j],
                    state.v[k],
                    rest_edge_jk,
                    kb,
                    ctx.bending_damping(),
                );
                state.apply_angular(j, k, jk, &force);
            }
            (SpringKind::Goal { i }, _) => {
                if state.constraints[i].is_pinned() {
                    continue;
                }
                if is_hair {
                    add_hair_goal(state, ctx, i);
                } else {
                    add_cloth_goal(state, ctx, i, spring.stiffness);
                }
            }
            _ => {}
        }
    }
}

fn add_cloth_goal(state: &mut ImplicitSolverState, ctx: &ForceContext<'_>, i: usize, s: f32) {
    let Some((goal_x, goal_v)) = ctx.goal_position(i) else {
        return;
    };
    let c = ctx.config;
    let scaling = c.goal_spring + s * (c.max_structural - c.goal_spring).abs();
    let k = ctx.body.vertices[i].goal_weight() * scaling / ctx.length_scale();
    let damping = c.goal_friction * 0.01;

    if let Some(force) = goal_spring(state.x[i], state.v[i], goal_x, goal_v, k, damping) {
        state.apply_vertex_force(i, &force);
    }
}

fn add_hair_goal(state: &mut ImplicitSolverState, ctx: &ForceContext<'_>, i: usize) {
    let Some((goal_x, _)) = ctx.goal_position(i) else {
        return;
    };
    let hair = &ctx.config.hair;
    let weight = hair.goal_weight(ctx.strands.arclength[i], ctx.body.vertices[i].goal_weight());
    let k = hair.goal_stiffness * weight;
    if k == 0.0 {
        return;
    }
    let damping = k * hair.goal_damping;
    let root_velocity = ctx.strands.root_of[i].map_or(Vec3::ZERO, |r| state.v[r]);

    if let Some(force) = goal_spring(state.x[i], state.v[i], goal_x, root_velocity, k, damping) {
        state.apply_vertex_force(i, &force);
    }
}

/// Angular bending along each strand chain.
///
/// A relative frame between rest and current state is carried from the
/// root toward the tip. Each bend's target edge is its rest edge moved
/// into that frame; after the bend, the frame advances by the rest and
/// current rotations across the bend.
fn add_strand_bending(state: &mut ImplicitSolverState, ctx: &ForceContext<'_>) {
    let cb = ctx.bending_damping();

    for chain in &ctx.strands.bend_chains {
        let Some(&first) = chain.first() else {
            continue;
        };
        let SpringKind::AngularBending {
            i: root,
            j: second,
            rest_edge_ij: rest_root_edge,
            ..
        } = ctx.body.springs[first].kind
        else {
            continue;
        };

        let mut frame = rotation_between(rest_root_edge, state.x[second] - state.x[root]);

        // Hold the first segment toward its rest direction so the root
        // does not inject energy into the strand.
        let first_spring = &ctx.body.springs[first];
        if first_spring.active && !state.constraints[second].is_pinned() {
            let kb = ctx.angular_stiffness(first_spring.stiffness);
            let goal_x = state.x[root] + rest_root_edge;
            if let Some(force) = goal_spring(state.x[second], state.v[second], goal_x, state.v[root], kb, cb) {
                state.apply_vertex_force(second, &force);
            }
        }

        for &s in chain {
            let spring = &ctx.body.springs[s];
            let (
                SpringKind::AngularBending {
                    i,
                    j,
                    k,
                    rest_edge_ij,
                    rest_edge_jk,
                },
                SpringSlots::Triple { jk, .. },
            ) = (spring.kind, state.spring_slots(s))
            else {
                continue;
            };

            if spring.active {
                let target = frame * rest_edge_jk;
                let kb = ctx.angular_stiffness(spring.stiffness);
                let force = angular_bending(state.x[j], state.x[k], state.v[j], state.v[k], target, kb, cb);
                state.apply_angular(j, k, jk, &force);
            }

            let rot_state = rotation_between(state.x[j] - state.x[i], state.x[k] - state.x[j]);
            let rot_rest = rotation_between(rest_edge_ij, rest_edge_jk);
            frame = rot_state * frame * rot_rest.transpose();
        }
    }
}
