//! Benchmark runner — executes scenarios frame by frame and collects metrics.

use std::time::Instant;

use tracing::{debug, info};

use skein_contact::{ColliderSet, ProjectionPass};
use skein_math::Vec3;
use skein_mesh::Body;
use skein_solver::simulation::{body_kinetic_energy, max_displacement};
use skein_solver::{
    ContactSource, ExtraCollisionPass, ForceField, FrameReport, NoField, NullContactSource, Simulation,
    SimulationConfig, UniformWind,
};
use skein_telemetry::{EventBus, EventKind, SimulationEvent};
use skein_types::SkeinResult;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

/// Gravitational potential energy relative to the origin.
fn potential_energy(body: &Body, gravity: Vec3) -> f64 {
    body.vertices
        .iter()
        .map(|v| -f64::from(v.mass) * f64::from(gravity.dot(v.position)))
        .sum()
}

impl BenchmarkRunner {
    /// Run a single scenario.
    pub fn run(scenario: &Scenario, bus: &mut EventBus) -> SkeinResult<BenchmarkMetrics> {
        Self::run_with(scenario, bus, |_, _, _| {})
    }

    /// Run a single scenario, handing every finished frame to `observer`
    /// along with the body state and solver report.
    pub fn run_with<F>(scenario: &Scenario, bus: &mut EventBus, mut observer: F) -> SkeinResult<BenchmarkMetrics>
    where
        F: FnMut(u32, &Body, &FrameReport),
    {
        let config: &SimulationConfig = &scenario.config;
        config.validate()?;
        scenario.body.validate()?;

        let mut body = scenario.body.clone();
        let initial: Vec<Vec3> = body.vertices.iter().map(|v| v.position).collect();
        let mut colliders = ColliderSet::from_descs(&scenario.colliders, config.collision.epsilon);
        let gravity = Vec3::from(config.gravity);
        let field: Box<dyn ForceField> = match scenario.wind {
            Some(wind) => Box::new(UniformWind(wind)),
            None => Box::new(NoField),
        };

        info!(
            scenario = scenario.kind.name(),
            vertices = body.vertex_count(),
            springs = body.springs.len(),
            colliders = colliders.len(),
            "running scenario"
        );

        let mut simulation = Simulation::new();
        let mut frame_times: Vec<f64> = Vec::with_capacity(scenario.frames as usize);
        let mut total_iterations = 0.0f64;
        let mut total_substeps = 0u32;
        let mut max_iterations = 0u32;
        let mut max_error = 0.0f32;
        let mut converged_frames = 0u32;
        let mut contacts = 0u64;
        let mut sim_time = 0.0f64;

        let total_start = Instant::now();

        for frame in 0..scenario.frames {
            bus.emit(SimulationEvent::new(frame, EventKind::FrameBegin { sim_time }));

            let start = Instant::now();
            let (report, projected, deepest) = if body.is_hair() {
                let report = simulation.step_frame(&mut body, config, &mut colliders, field.as_ref(), None);
                let impulses: u32 = body.vertices.iter().map(|v| v.impulse_count).sum();
                (report, impulses, 0.0)
            } else {
                let mut pass = ProjectionPass::new(&colliders, config.collision.epsilon);
                let extra: Option<&mut dyn ExtraCollisionPass> = if colliders.is_empty() {
                    None
                } else {
                    Some(&mut pass)
                };
                let report = simulation.step_frame(
                    &mut body,
                    config,
                    &mut NullContactSource as &mut dyn ContactSource,
                    field.as_ref(),
                    extra,
                );
                (report, pass.last.resolved_count, pass.last.max_penetration)
            };
            let wall_time = start.elapsed().as_secs_f64();
            frame_times.push(wall_time);

            colliders.advance(config.frame_span());
            sim_time += f64::from(config.frame_span());

            let result = &report.result;
            total_iterations += f64::from(result.avg_iterations) * f64::from(result.substeps);
            total_substeps += result.substeps;
            max_iterations = max_iterations.max(result.max_iterations);
            max_error = max_error.max(result.max_error);
            if result.is_success() {
                converged_frames += 1;
            }
            contacts += u64::from(projected);

            bus.emit(SimulationEvent::new(
                frame,
                EventKind::Convergence {
                    status: result.status.bits(),
                    avg_iterations: result.avg_iterations,
                    max_iterations: result.max_iterations,
                    avg_error: result.avg_error,
                    max_error: result.max_error,
                    converged: result.is_success(),
                },
            ));
            if projected > 0 {
                bus.emit(SimulationEvent::new(
                    frame,
                    EventKind::Contacts {
                        count: projected,
                        max_penetration: deepest,
                    },
                ));
            }
            bus.emit(SimulationEvent::new(
                frame,
                EventKind::Energy {
                    kinetic: body_kinetic_energy(&body),
                    potential: potential_energy(&body, gravity),
                },
            ));
            if let Some(grid) = &report.grid {
                bus.emit(SimulationEvent::new(
                    frame,
                    EventKind::HairGrid {
                        resolution: grid.resolution,
                        max_density: grid.density.iter().copied().fold(0.0, f32::max),
                    },
                ));
            }
            bus.emit(SimulationEvent::new(frame, EventKind::FrameEnd { wall_time }));
            bus.flush();

            debug!(frame, wall_time, iterations = result.avg_iterations, "frame done");
            observer(frame, &body, &report);
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();
        let after: Vec<Vec3> = body.vertices.iter().map(|v| v.position).collect();

        let avg_frame = if frame_times.is_empty() {
            0.0
        } else {
            frame_times.iter().sum::<f64>() / frame_times.len() as f64
        };
        let min_frame = frame_times.iter().copied().fold(f64::MAX, f64::min);
        let max_frame = frame_times.iter().copied().fold(0.0, f64::max);
        let avg_iter = if total_substeps > 0 {
            (total_iterations / f64::from(total_substeps)) as f32
        } else {
            0.0
        };

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            total_wall_time,
            frames: scenario.frames,
            avg_frame_time: avg_frame,
            min_frame_time: if frame_times.is_empty() { 0.0 } else { min_frame },
            max_frame_time: max_frame,
            final_kinetic_energy: body_kinetic_energy(&body),
            max_displacement: max_displacement(&initial, &after),
            avg_iterations: avg_iter,
            max_iterations,
            max_error,
            converged_frames,
            contacts,
            vertex_count: body.vertex_count(),
            spring_count: body.springs.len(),
        })
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all(bus: &mut EventBus) -> SkeinResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let scenario = Scenario::from_kind(kind)?;
            results.push(Self::run(&scenario, bus)?);
        }
        Ok(results)
    }
}
