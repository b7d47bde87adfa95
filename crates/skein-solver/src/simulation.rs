//! Per-frame orchestration of the implicit solver.
//!
//! A frame is split into `steps_per_frame` substeps. Each substep sets
//! up constraints, accumulates forces, solves for velocities and
//! integrates positions. Pinned vertices follow their goal targets
//! exactly; contacts live for one substep only.

use serde::{Deserialize, Serialize};
use skein_math::Vec3;
use skein_mesh::Body;
use tracing::{debug, warn};

use crate::accumulate::{accumulate_forces, ForceContext};
use crate::collaborators::{ContactSource, ExtraCollisionPass, ForceField};
use crate::config::SimulationConfig;
use crate::constraints::setup_constraints;
use crate::continuum::{continuum_step, GridSnapshot};
use crate::implicit::{solve_positions, solve_velocities};
use crate::result::{SolverResult, SolverStatus};
use crate::state::ImplicitSolverState;
use crate::strands::StrandIndex;

/// Outcome of one simulated frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameReport {
    pub result: SolverResult,
    /// Hair continuum grid of the last substep, if the pass ran.
    pub grid: Option<GridSnapshot>,
}

/// Solver for one body across frames.
///
/// Storage is created lazily on the first frame and rebuilt whenever
/// the body's vertex or spring count changes.
#[derive(Debug, Default)]
pub struct Simulation {
    state: Option<ImplicitSolverState>,
    strands: StrandIndex,
    spring_count: usize,
}

impl Simulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solver state, available after the first frame.
    pub fn state(&self) -> Option<&ImplicitSolverState> {
        self.state.as_ref()
    }

    /// Drops all solver storage. The next frame rebuilds it.
    pub fn reset(&mut self) {
        self.state = None;
        self.strands = StrandIndex::default();
        self.spring_count = 0;
    }

    fn prepare(&mut self, body: &Body) -> &mut ImplicitSolverState {
        let stale = match &self.state {
            Some(state) => {
                state.vertex_count() != body.vertex_count() || self.spring_count != body.springs.len()
            }
            None => true,
        };

        if stale {
            debug!(
                vertices = body.vertex_count(),
                springs = body.springs.len(),
                blocks = body.count_off_diagonal_blocks(),
                "allocating solver state"
            );
            self.strands = StrandIndex::build(body);
            self.spring_count = body.springs.len();
            self.state = Some(ImplicitSolverState::new(body));
        }

        let state = self.state.get_or_insert_with(|| ImplicitSolverState::new(body));
        state.load_body(body);
        state
    }

    /// Advances `body` by one frame.
    ///
    /// Contacts are only queried for hair bodies with collisions
    /// enabled. The extra pass only runs for cloth bodies with
    /// collisions enabled. An invalid config leaves the body untouched
    /// and reports `INVALID_INPUT`.
    pub fn step_frame(
        &mut self,
        body: &mut Body,
        config: &SimulationConfig,
        contacts: &mut dyn ContactSource,
        field: &dyn ForceField,
        mut extra: Option<&mut dyn ExtraCollisionPass>,
    ) -> FrameReport {
        if let Err(e) = config.validate() {
            warn!(error = %e, "frame skipped");
            return FrameReport {
                result: SolverResult {
                    status: SolverStatus::INVALID_INPUT,
                    ..SolverResult::cleared()
                },
                grid: None,
            };
        }

        let span = config.frame_span();
        let dt = config.substep();
        let is_hair = body.is_hair();
        let average_length = body.average_structural_length();

        self.prepare(body);
        let Some(state) = self.state.as_mut() else {
            return FrameReport {
                result: SolverResult::cleared(),
                grid: None,
            };
        };
        let strands = &self.strands;

        // Strand roots are always held, flagged or not.
        let pinned: Vec<bool> = body
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| v.pinned || strands.root_of.get(i).copied().flatten() == Some(i))
            .collect();
        let mut impulse_count = vec![0u32; body.vertex_count()];

        for (i, vert) in body.vertices.iter().enumerate() {
            if pinned[i] {
                let (start, end) = vert.goal_targets();
                state.v[i] = (end - start) / span;
            }
        }

        let mut result = SolverResult::cleared();
        let mut grid = None;
        let mut step = 0.0f32;

        for substep in 0..config.steps_per_frame {
            let frame_contacts = if is_hair && config.collision.enabled {
                contacts.find_contacts(&state.x, &state.v, dt)
            } else {
                Vec::new()
            };

            let responses = setup_constraints(
                &mut state.constraints,
                &pinned,
                &mut impulse_count,
                &state.v,
                &frame_contacts,
                &config.collision,
                dt,
            );

            state.clear_forces();

            if config.velocity_damping != 1.0 {
                for (v, &is_pinned) in state.v.iter_mut().zip(&pinned) {
                    if !is_pinned {
                        *v *= config.velocity_damping;
                    }
                }
            }

            let ctx = ForceContext {
                body,
                config,
                strands,
                field,
                average_length,
                time: step / span,
            };
            accumulate_forces(state, &ctx);

            let sub = solve_velocities(state, dt, config.max_cg_iterations, config.cg_tolerance);
            result = result.merge(&sub, config.steps_per_frame);

            if is_hair {
                if let Some(snapshot) = continuum_step(state, body, &config.hair, dt) {
                    grid = Some(snapshot);
                }
            }

            solve_positions(state, dt);

            match extra.as_deref_mut() {
                Some(pass) if !is_hair && config.collision.enabled => {
                    extra_collision_solve(state, pass, &ctx, &pinned, dt, config);
                }
                _ => state.apply_result(),
            }

            let t = ((step + dt) / span).min(1.0);
            for (i, vert) in body.vertices.iter().enumerate() {
                if pinned[i] {
                    let (start, end) = vert.goal_targets();
                    state.x[i] = start.lerp(end, t);
                }
            }

            if !sub.status.contains(SolverStatus::SUCCESS) {
                warn!(
                    substep,
                    status = ?sub.status,
                    iterations = sub.iterations,
                    error = sub.error,
                    "velocity solve did not succeed"
                );
            }
            if responses > 0 {
                debug!(substep, responses, "collision constraints");
            }

            step += dt;
        }

        for (i, vert) in body.vertices.iter_mut().enumerate() {
            vert.position = state.x[i];
            vert.velocity = state.v[i];
            vert.impulse_count = impulse_count[i];
            if let Some(goal) = vert.goal.as_mut() {
                goal.start = goal.end;
            }
        }

        debug!(
            status = ?result.status,
            avg_iterations = result.avg_iterations,
            max_error = result.max_error,
            kinetic_energy = state.kinetic_energy(),
            "frame solved"
        );

        FrameReport { result, grid }
    }
}

/// Hands integrated cloth positions to the extra pass and re-solves
/// velocities once if it moved anything. The re-solve is not recorded.
fn extra_collision_solve(
    state: &mut ImplicitSolverState,
    pass: &mut dyn ExtraCollisionPass,
    ctx: &ForceContext<'_>,
    pinned: &[bool],
    dt: f32,
    config: &SimulationConfig,
) {
    let old = state.x.clone();
    let mut corrected = state.x_new.clone();

    if !pass.correct(&old, &mut corrected) {
        state.apply_result();
        return;
    }

    for (i, (&is_pinned, x)) in pinned.iter().zip(corrected).enumerate() {
        if is_pinned {
            continue;
        }
        state.x_new[i] = x;
        state.v_new[i] = (x - old[i]) / dt;
    }
    state.apply_result();

    state.clear_forces();
    accumulate_forces(state, ctx);
    let resolve = solve_velocities(state, dt, config.max_cg_iterations, config.cg_tolerance);
    if resolve.status != SolverStatus::SUCCESS {
        debug!(
            status = ?resolve.status,
            iterations = resolve.iterations,
            error = resolve.error,
            "post-collision velocity solve did not succeed"
        );
    }
    state.apply_result();
}

/// Total kinetic energy of a body's vertices.
pub fn body_kinetic_energy(body: &Body) -> f64 {
    body.vertices
        .iter()
        .map(|v| 0.5 * f64::from(v.mass) * f64::from(v.velocity.length_squared()))
        .sum()
}

/// Largest distance any vertex moved between two position sets.
pub fn max_displacement(before: &[Vec3], after: &[Vec3]) -> f32 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| a.distance(*b))
        .fold(0.0, f32::max)
}
