//! Integration tests for skein-solver.

use skein_math::Vec3;
use skein_mesh::generators::{hair_strands, quad_grid, strand_springs};
use skein_mesh::{Body, BodyKind, Goal, Spring, SpringKind, Strand, Vertex};
use skein_solver::constraints::{collision_response, setup_constraints};
use skein_solver::continuum::HairGrid;
use skein_solver::forces::{angular_bending, edge_wind, face_wind, goal_spring, linear_spring};
use skein_solver::{
    CollisionConfig, CollisionContact, ExtraCollisionPass, NoField, NullContactSource,
    ImplicitSolverState, Simulation, SimulationConfig, SolverResult, SolverStatus, SubstepResult,
    VertexConstraint,
};

fn pin(body: &mut Body, i: usize) {
    let v = body.vertices[i].clone();
    body.vertices[i] = v.pinned();
}

fn two_vertex_body(distance: f32, rest_length: f32) -> Body {
    let vertices = vec![
        Vertex::new(Vec3::ZERO, 1.0),
        Vertex::new(Vec3::new(distance, 0.0, 0.0), 1.0),
    ];
    let springs = vec![Spring::new(SpringKind::Structural {
        i: 0,
        j: 1,
        rest_length,
    })];
    Body::new(vertices, springs, BodyKind::Cloth { faces: vec![] }).unwrap()
}

fn weightless() -> SimulationConfig {
    SimulationConfig {
        gravity: [0.0, 0.0, 0.0],
        ..Default::default()
    }
}

fn all_finite(body: &Body) -> bool {
    body.vertices
        .iter()
        .all(|v| v.position.is_finite() && v.velocity.is_finite())
}

// ─── Solver State Tests ───────────────────────────────────────

#[test]
fn state_reserves_counted_blocks_for_cloth() {
    let body = quad_grid(2, 2, 1.0, 1.0, 0.1).unwrap();
    let state = ImplicitSolverState::new(&body);
    assert_eq!(state.off_diagonal_capacity(), body.count_off_diagonal_blocks());
    assert_eq!(state.off_diagonal_capacity(), 26);
    assert!(state.coupled_pairs() <= state.off_diagonal_capacity());
}

#[test]
fn state_reserves_counted_blocks_for_hair() {
    let body = hair_strands(2, 3, 1.0, 0.1, Vec3::NEG_Y, 0.01).unwrap();
    let state = ImplicitSolverState::new(&body);
    assert_eq!(state.off_diagonal_capacity(), 24);
    assert!(state.coupled_pairs() <= 24);
}

#[test]
#[should_panic(expected = "miscounted")]
fn state_rejects_undersized_capacity() {
    let body = quad_grid(2, 2, 1.0, 1.0, 0.1).unwrap();
    let _ = ImplicitSolverState::with_capacity(&body, body.count_off_diagonal_blocks() - 1);
}

#[test]
fn state_loads_body() {
    let body = two_vertex_body(1.0, 1.0);
    let state = ImplicitSolverState::new(&body);
    assert_eq!(state.vertex_count(), 2);
    assert_eq!(state.x[1], Vec3::X);
    assert_eq!(state.mass, vec![1.0, 1.0]);
    assert_eq!(state.kinetic_energy(), 0.0);
}

// ─── Force Law Tests ──────────────────────────────────────────

#[test]
fn stretched_spring_pulls_together() {
    let f = linear_spring(
        Vec3::ZERO,
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::ZERO,
        1.0,
        10.0,
        0.0,
        false,
        0.0,
    )
    .unwrap();
    // Force on the first vertex points toward the second.
    assert!((f.f.x - 10.0).abs() < 1e-5);
    assert!(f.f.y.abs() < 1e-6);
    // Stiffness along the spring is −k.
    assert!((f.dfdx.x_axis.x + 10.0).abs() < 1e-4);
}

#[test]
fn compressed_spring_pushes_apart() {
    let f = linear_spring(
        Vec3::ZERO,
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::ZERO,
        1.0,
        10.0,
        0.0,
        false,
        0.0,
    )
    .unwrap();
    assert!(f.f.x < 0.0);
}

#[test]
fn no_compress_spring_is_slack() {
    let f = linear_spring(
        Vec3::ZERO,
        Vec3::new(0.5, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::ZERO,
        1.0,
        10.0,
        5.0,
        true,
        0.0,
    );
    assert!(f.is_none());
}

#[test]
fn sewing_clamp_limits_stretch() {
    let f = linear_spring(
        Vec3::ZERO,
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::ZERO,
        1.0,
        10.0,
        0.0,
        false,
        3.0,
    )
    .unwrap();
    assert!((f.f.x - 3.0).abs() < 1e-5);
}

#[test]
fn spring_damping_opposes_separation() {
    let f = linear_spring(
        Vec3::ZERO,
        Vec3::X,
        Vec3::ZERO,
        Vec3::new(1.0, 0.0, 0.0),
        1.0,
        0.0,
        2.0,
        false,
        0.0,
    )
    .unwrap();
    // j moves away, so i is dragged along +x.
    assert!((f.f.x - 2.0).abs() < 1e-5);
    assert!((f.dfdv.x_axis.x + 2.0).abs() < 1e-5);
}

#[test]
fn goal_spring_pulls_to_goal() {
    let f = goal_spring(Vec3::ZERO, Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0), Vec3::ZERO, 3.0, 0.0).unwrap();
    assert!((f.f.y - 6.0).abs() < 1e-5);
    assert!((f.dfdx.y_axis.y + 3.0).abs() < 1e-6);
    assert!(goal_spring(Vec3::ONE, Vec3::ZERO, Vec3::ONE, Vec3::ZERO, 3.0, 0.0).is_none());
}

#[test]
fn angular_bending_at_target_is_zero() {
    let edge = Vec3::new(0.0, -1.0, 0.0);
    let f = angular_bending(Vec3::ZERO, edge, Vec3::ZERO, Vec3::ZERO, edge, 5.0, 1.0);
    assert!(f.fk.length() < 1e-6);
}

#[test]
fn angular_bending_restores_target() {
    let f = angular_bending(
        Vec3::ZERO,
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::ZERO,
        Vec3::ZERO,
        Vec3::new(0.0, -1.0, 0.0),
        5.0,
        0.0,
    );
    assert!(f.fk.x < 0.0);
    assert!(f.fk.y < 0.0);
}

#[test]
fn face_wind_splits_over_vertices() {
    let winds = [Vec3::new(0.0, 0.0, 10.0); 4];
    let forces = face_wind(Vec3::Z, 1.0, &winds);
    assert_eq!(forces.len(), 4);
    for f in forces {
        assert!((f.z - 0.05).abs() < 1e-6);
    }
}

#[test]
fn edge_wind_across_segment() {
    let f = edge_wind(Vec3::Y, 1.0, 1.0, Vec3::new(1.0, 0.0, 0.0));
    assert!((f.x - std::f32::consts::PI * 0.01).abs() < 1e-6);
    assert_eq!(edge_wind(Vec3::Y, 1.0, 1.0, Vec3::ZERO), Vec3::ZERO);
}

// ─── Constraint Tests ─────────────────────────────────────────

fn approaching_contact(distance: f32) -> CollisionContact {
    CollisionContact::resting(0, Vec3::Y, distance)
}

#[test]
fn one_impulse_per_vertex() {
    let mut constraints = vec![VertexConstraint::Free; 2];
    let mut counts = vec![0u32; 2];
    let velocities = vec![Vec3::new(0.0, -1.0, 0.0); 2];
    let contacts = vec![approaching_contact(0.0), approaching_contact(-0.01)];

    let added = setup_constraints(
        &mut constraints,
        &[false, false],
        &mut counts,
        &velocities,
        &contacts,
        &CollisionConfig::default(),
        0.01,
    );

    assert_eq!(added, 1);
    assert_eq!(counts, vec![1, 0]);
    assert!(matches!(constraints[0], VertexConstraint::Collision { .. }));
    assert_eq!(constraints[1], VertexConstraint::Free);
}

#[test]
fn future_contact_has_no_response() {
    let mut contact = approaching_contact(0.0);
    contact.in_future = true;
    let response = collision_response(&contact, Vec3::NEG_Y, 0.01, &CollisionConfig::default());
    assert!(response.is_none());
}

#[test]
fn separating_vertex_has_no_response() {
    let response = collision_response(&approaching_contact(0.0), Vec3::Y, 0.01, &CollisionConfig::default());
    assert!(response.is_none());
}

#[test]
fn pinned_vertex_ignores_contacts() {
    let mut constraints = vec![VertexConstraint::Free];
    let mut counts = vec![0u32];
    let added = setup_constraints(
        &mut constraints,
        &[true],
        &mut counts,
        &[Vec3::NEG_Y],
        &[approaching_contact(0.0)],
        &CollisionConfig::default(),
        0.01,
    );
    assert_eq!(added, 0);
    assert_eq!(constraints[0], VertexConstraint::Pinned);
}

#[test]
fn deep_contact_repulsion_is_capped() {
    let config = CollisionConfig {
        enabled: true,
        epsilon: 0.015,
        restitution: 0.5,
    };
    let impulse = collision_response(&approaching_contact(-0.05), Vec3::NEG_Y, 0.01, &config).unwrap();
    let bounce = 0.5;
    let v_after = -1.0 + impulse.y;
    assert!(v_after <= 4.0 * bounce + 1e-5);
    assert!((v_after - 2.0).abs() < 1e-4);
}

#[test]
fn shallow_contact_has_no_bounce() {
    let config = CollisionConfig {
        enabled: true,
        epsilon: 0.015,
        restitution: 0.5,
    };
    let impulse = collision_response(&approaching_contact(0.0), Vec3::NEG_Y, 1.0, &config).unwrap();
    // Only the repulsion 0.015/dt remains, the 0.5 bounce is dropped.
    assert!((-1.0 + impulse.y - 0.015).abs() < 1e-5);
}

#[test]
fn collision_filter_frees_tangents() {
    let c = VertexConstraint::Collision {
        normal: Vec3::Y,
        impulse: Vec3::new(0.0, 2.0, 0.0),
    };
    let filtered = c.filter(Vec3::new(1.0, 1.0, 1.0));
    assert_eq!(filtered, Vec3::new(1.0, 0.0, 1.0));
    assert_eq!(c.target(), Vec3::new(0.0, 2.0, 0.0));
    assert_eq!(VertexConstraint::Pinned.filter(Vec3::ONE), Vec3::ZERO);
}

// ─── Result Aggregation Tests ─────────────────────────────────

fn substep(status: SolverStatus, iterations: u32, error: f32) -> SubstepResult {
    SubstepResult {
        status,
        iterations,
        error,
    }
}

#[test]
fn merge_averages_and_extremes() {
    let result = [
        substep(SolverStatus::SUCCESS, 4, 0.1),
        substep(SolverStatus::SUCCESS, 8, 0.3),
        substep(SolverStatus::SUCCESS, 6, 0.2),
    ]
    .iter()
    .fold(SolverResult::cleared(), |acc, s| acc.merge(s, 3));

    assert!(result.is_success());
    assert_eq!(result.min_iterations, 4);
    assert_eq!(result.max_iterations, 8);
    assert!((result.avg_iterations - 6.0).abs() < 1e-5);
    assert!((result.min_error - 0.1).abs() < 1e-6);
    assert!((result.max_error - 0.3).abs() < 1e-6);
    assert!((result.avg_error - 0.2).abs() < 1e-6);
    assert_eq!(result.substeps, 3);
}

#[test]
fn merge_skips_errors_of_failed_steps() {
    let result = SolverResult::cleared()
        .merge(&substep(SolverStatus::SUCCESS, 3, 0.1), 2)
        .merge(&substep(SolverStatus::NO_CONVERGENCE, 100, 0.9), 2);

    assert!(!result.is_success());
    assert!(result.status.contains(SolverStatus::SUCCESS | SolverStatus::NO_CONVERGENCE));
    assert!((result.max_error - 0.1).abs() < 1e-6);
    assert_eq!(result.max_iterations, 100);
    assert_eq!(result.successful, 1);
}

// ─── Simulation Tests ─────────────────────────────────────────

#[test]
fn spring_at_rest_stays_put() {
    let mut body = two_vertex_body(1.0, 1.0);
    let mut sim = Simulation::new();
    let report = sim.step_frame(&mut body, &weightless(), &mut NullContactSource, &NoField, None);

    assert!(report.result.is_success());
    assert_eq!(body.vertices[0].position, Vec3::ZERO);
    assert_eq!(body.vertices[1].position, Vec3::X);
    assert_eq!(body.vertices[1].velocity, Vec3::ZERO);
}

#[test]
fn stretched_spring_contracts() {
    let mut body = two_vertex_body(1.5, 1.0);
    let mut sim = Simulation::new();
    sim.step_frame(&mut body, &weightless(), &mut NullContactSource, &NoField, None);

    let length = body.vertices[0].position.distance(body.vertices[1].position);
    assert!(length < 1.5);
    assert!(body.vertices[0].velocity.x > 0.0);
    assert!(body.vertices[1].velocity.x < 0.0);
}

#[test]
fn pinned_vertices_follow_goal() {
    let mut body = quad_grid(1, 1, 1.0, 1.0, 0.1).unwrap();
    pin(&mut body, 0);
    let start = body.vertices[0].position;
    let end = start + Vec3::new(0.1, 0.0, 0.0);
    body.vertices[0].goal = Some(Goal { start, end, weight: 1.0 });

    let config = SimulationConfig::default();
    let mut sim = Simulation::new();
    sim.step_frame(&mut body, &config, &mut NullContactSource, &NoField, None);

    let v = &body.vertices[0];
    assert!(v.position.distance(end) < 1e-5);
    let expected_v = (end - start) / config.frame_span();
    assert!(v.velocity.distance(expected_v) < 1e-3);
    // Goals roll forward.
    assert_eq!(v.goal.unwrap().start, end);
}

#[test]
fn static_pins_stay_exact() {
    let mut body = quad_grid(1, 1, 1.0, 1.0, 0.3).unwrap();
    pin(&mut body, 0);
    pin(&mut body, 1);
    let top = [body.vertices[0].position, body.vertices[1].position];

    let mut sim = Simulation::new();
    for _ in 0..5 {
        sim.step_frame(&mut body, &SimulationConfig::default(), &mut NullContactSource, &NoField, None);
    }

    assert_eq!(body.vertices[0].position, top[0]);
    assert_eq!(body.vertices[1].position, top[1]);
    assert_eq!(body.vertices[0].velocity, Vec3::ZERO);
}

#[test]
fn hanging_cloth_settles() {
    let mut body = quad_grid(1, 1, 1.0, 1.0, 0.3).unwrap();
    pin(&mut body, 0);
    pin(&mut body, 1);

    let config = SimulationConfig {
        structural: 500.0,
        max_structural: 500.0,
        spring_damping: 25.0,
        ..Default::default()
    };

    let mut sim = Simulation::new();
    for _ in 0..10 {
        let report = sim.step_frame(&mut body, &config, &mut NullContactSource, &NoField, None);
        assert!(!report.result.status.contains(SolverStatus::NUMERICAL_ISSUE));
    }

    assert!(all_finite(&body));
    for i in [2, 3] {
        assert!(body.vertices[i].velocity.length() < 0.05, "vertex {i} still moving");
        assert!(body.vertices[i].position.y < -0.5);
    }
}

#[test]
fn state_rebuilds_on_topology_change() {
    let mut sim = Simulation::new();
    let mut small = two_vertex_body(1.0, 1.0);
    sim.step_frame(&mut small, &weightless(), &mut NullContactSource, &NoField, None);
    assert_eq!(sim.state().map(|s| s.vertex_count()), Some(2));

    let mut grid = quad_grid(2, 2, 1.0, 1.0, 0.1).unwrap();
    sim.step_frame(&mut grid, &weightless(), &mut NullContactSource, &NoField, None);
    assert_eq!(sim.state().map(|s| s.vertex_count()), Some(9));
}

struct Floor(f32);

impl ExtraCollisionPass for Floor {
    fn correct(&mut self, _old: &[Vec3], new: &mut [Vec3]) -> bool {
        let mut changed = false;
        for p in new.iter_mut() {
            if p.y < self.0 {
                p.y = self.0;
                changed = true;
            }
        }
        changed
    }
}

#[test]
fn extra_pass_corrects_cloth() {
    let mut body = quad_grid(1, 1, 1.0, 1.0, 0.3).unwrap();
    pin(&mut body, 0);
    pin(&mut body, 1);

    let config = SimulationConfig {
        collision: CollisionConfig {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut floor = Floor(-0.45);
    let mut sim = Simulation::new();
    for _ in 0..5 {
        sim.step_frame(&mut body, &config, &mut NullContactSource, &NoField, Some(&mut floor));
    }

    assert!(all_finite(&body));
    for v in &body.vertices {
        assert!(v.position.y >= -0.45 - 1e-5);
    }
}

#[test]
fn extra_pass_with_starved_solver_stays_finite() {
    let mut body = quad_grid(1, 1, 1.0, 1.0, 0.3).unwrap();
    pin(&mut body, 0);
    pin(&mut body, 1);

    let config = SimulationConfig {
        max_cg_iterations: 1,
        cg_tolerance: 0.0,
        collision: CollisionConfig {
            enabled: true,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut floor = Floor(-0.45);
    let mut sim = Simulation::new();
    for _ in 0..5 {
        let report = sim.step_frame(&mut body, &config, &mut NullContactSource, &NoField, Some(&mut floor));
        assert!(report.result.status.contains(SolverStatus::NO_CONVERGENCE));
    }

    assert!(all_finite(&body));
    for v in &body.vertices {
        assert!(v.position.y >= -0.45 - 1e-5);
    }
}

#[test]
fn hair_roots_stay_and_grid_is_reported() {
    let mut body = hair_strands(2, 4, 0.4, 0.05, Vec3::NEG_Y, 0.01).unwrap();
    let roots: Vec<Vec3> = body.strands().iter().map(|s| body.vertices[s.vertices[0]].position).collect();

    let config = SimulationConfig::hair();
    let mut sim = Simulation::new();
    let mut last = None;
    for _ in 0..3 {
        last = Some(sim.step_frame(&mut body, &config, &mut NullContactSource, &NoField, None));
    }

    assert!(all_finite(&body));
    for (strand, root) in body.strands().iter().zip(&roots) {
        let vert = &body.vertices[strand.vertices[0]];
        assert_eq!(vert.position, *root);
        assert_eq!(vert.velocity, Vec3::ZERO);
    }
    let grid = last.and_then(|r| r.grid).expect("continuum enabled");
    assert_eq!(grid.velocity.len(), grid.node_count());
    assert!(grid.density.iter().any(|&d| d > 0.0));
}

#[test]
fn unflagged_strand_root_is_held() {
    let positions: Vec<Vec3> = (0..4).map(|k| Vec3::new(0.1 * k as f32, 0.0, 0.0)).collect();
    let vertices: Vec<Vertex> = positions.iter().map(|&p| Vertex::new(p, 0.01)).collect();
    let strands = vec![Strand {
        vertices: vec![0, 1, 2, 3],
    }];
    let springs = strand_springs(&positions, &strands);
    let mut body = Body::new(vertices, springs, BodyKind::Hair { strands }).unwrap();
    assert!(body.vertices.iter().all(|v| !v.pinned));

    let mut sim = Simulation::new();
    for _ in 0..2 {
        sim.step_frame(&mut body, &SimulationConfig::default(), &mut NullContactSource, &NoField, None);
    }

    assert!(all_finite(&body));
    assert_eq!(body.vertices[0].position, Vec3::ZERO);
    assert_eq!(body.vertices[0].velocity, Vec3::ZERO);
    assert!(body.vertices[3].position.y < -0.005, "tip should drop under gravity");
}

#[test]
fn invalid_config_leaves_body_untouched() {
    let mut body = quad_grid(2, 2, 1.0, 1.0, 0.1).unwrap();
    let before = body.clone();
    let mut sim = Simulation::new();

    let no_steps = SimulationConfig {
        steps_per_frame: 0,
        ..Default::default()
    };
    let report = sim.step_frame(&mut body, &no_steps, &mut NullContactSource, &NoField, None);
    assert_eq!(report.result.status, SolverStatus::INVALID_INPUT);
    assert!(!report.result.is_success());
    assert_eq!(body, before);

    let no_frame_rate = SimulationConfig {
        frame_rate: 0.0,
        ..Default::default()
    };
    let report = sim.step_frame(&mut body, &no_frame_rate, &mut NullContactSource, &NoField, None);
    assert_eq!(report.result.status, SolverStatus::INVALID_INPUT);
    assert!(report.grid.is_none());
    assert_eq!(body, before);
    assert!(sim.state().is_none());
}

#[test]
fn hair_without_continuum_reports_no_grid() {
    let mut body = hair_strands(1, 3, 0.3, 0.05, Vec3::NEG_Y, 0.01).unwrap();
    let config = SimulationConfig {
        gravity: [0.0, -9.81, 0.0],
        ..Default::default()
    };
    let mut sim = Simulation::new();
    let report = sim.step_frame(&mut body, &config, &mut NullContactSource, &NoField, None);
    assert!(report.grid.is_none());
}

// ─── Continuum Grid Tests ─────────────────────────────────────

#[test]
fn grid_resolution_is_capped() {
    let grid = HairGrid::new(0.001, Vec3::ZERO, Vec3::splat(10.0));
    assert!(grid.resolution().iter().all(|&r| r <= 64));
    assert!(grid.cell_size() > 0.001);
}

#[test]
fn grid_density_follows_segments() {
    let mut grid = HairGrid::new(0.1, Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
    grid.add_segment(Vec3::ZERO, Vec3::X, Vec3::new(1.0, 0.0, 0.0), Vec3::X);
    grid.normalize();

    let (density, velocity, _) = grid.interpolate(Vec3::new(0.5, 0.0, 0.0));
    assert!(density > 0.0);
    assert!((velocity.x - 1.0).abs() < 1e-4);

    let (far, _, _) = grid.interpolate(Vec3::new(0.5, 0.8, 0.0));
    assert_eq!(far, 0.0);
}

// ─── Config Tests ─────────────────────────────────────────────

#[test]
fn default_config_is_valid() {
    assert!(SimulationConfig::default().validate().is_ok());
    assert!(SimulationConfig::hair().validate().is_ok());
    assert!(SimulationConfig::high_quality().validate().is_ok());
}

#[test]
fn config_rejects_zero_substeps() {
    let config = SimulationConfig {
        steps_per_frame: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn config_substep_size() {
    let config = SimulationConfig::default();
    assert!((config.substep() - 1.0 / 120.0).abs() < 1e-7);
}

#[test]
fn config_json_roundtrip() {
    let config = SimulationConfig::hair();
    let json = serde_json::to_string(&config).unwrap();
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn config_partial_json_uses_defaults() {
    let config: SimulationConfig = serde_json::from_str(r#"{ "steps_per_frame": 10 }"#).unwrap();
    assert_eq!(config.steps_per_frame, 10);
    assert_eq!(config.max_cg_iterations, SimulationConfig::default().max_cg_iterations);
}

#[test]
fn stiffness_curve_sets_goal_weight() {
    let mut hair = SimulationConfig::hair().hair;
    hair.stiffness_curve = Some(vec![[0.0, 1.0], [1.0, 0.0]]);
    assert!((hair.goal_weight(0.25, 0.0) - 0.75).abs() < 1e-6);
    hair.stiffness_curve = None;
    assert_eq!(hair.goal_weight(0.25, 2.0), 1.0);
}
