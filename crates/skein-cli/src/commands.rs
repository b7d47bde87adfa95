//! CLI command implementations.

use std::path::Path;

use tracing::info;

use skein_bench::metrics::BenchmarkMetrics;
use skein_bench::runner::BenchmarkRunner;
use skein_bench::scenarios::{Scenario, ScenarioKind, SceneFile};
use skein_debug::snapshot::StateSnapshot;
use skein_mesh::Body;
use skein_telemetry::{EventBus, TracingSink};

use crate::ReportFormat;

fn telemetry_bus() -> EventBus {
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new(tracing::Level::DEBUG)));
    bus
}

fn load_scene(path: &str) -> Result<Scenario, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let scene: SceneFile = toml::from_str(&content)?;
    Ok(Scenario::from_scene(&scene)?)
}

/// Run a simulation from a scene file.
pub fn simulate(scene_path: &str, output_dir: Option<&str>, every: u32) -> Result<(), Box<dyn std::error::Error>> {
    println!("skein Simulation");
    println!("────────────────");
    println!("Scene: {scene_path}");

    let scenario = load_scene(scene_path)?;
    println!(
        "Running: {} ({} verts, {} springs, {} frames)",
        scenario.kind.name(),
        scenario.body.vertex_count(),
        scenario.body.springs.len(),
        scenario.frames,
    );
    println!();

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let every = every.max(1);
    let frame_span = f64::from(scenario.config.frame_span());
    let mut write_error: Option<skein_types::SkeinError> = None;
    let mut bus = telemetry_bus();

    let metrics = BenchmarkRunner::run_with(&scenario, &mut bus, |frame, body, report| {
        let Some(dir) = output_dir else { return };
        if write_error.is_some() || frame % every != 0 {
            return;
        }
        let sim_time = f64::from(frame + 1) * frame_span;
        let snapshot = StateSnapshot::from_body(frame, sim_time, body).with_report(report);
        let path = Path::new(dir).join(format!("frame_{frame:05}.bin"));
        if let Err(e) = snapshot.save(&path) {
            write_error = Some(e);
        }
    })?;
    bus.finish();

    if let Some(e) = write_error {
        return Err(format!("Failed to write snapshot: {e}").into());
    }

    println!("  Wall time:     {:.3}s", metrics.total_wall_time);
    println!("  Avg frame:     {:.3}ms", metrics.avg_frame_time * 1000.0);
    println!("  Avg CG iters:  {:.1}", metrics.avg_iterations);
    println!("  Converged:     {}/{}", metrics.converged_frames, metrics.frames);
    println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
    println!("  Max displace:  {:.4}m", metrics.max_displacement);
    if let Some(dir) = output_dir {
        println!("Snapshots written to: {dir}");
    }

    Ok(())
}

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    frames: Option<u32>,
    output_path: Option<&str>,
    format: ReportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("skein Benchmark Suite");
    println!("═════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        match ScenarioKind::from_name(scenario_name) {
            Some(kind) => vec![kind],
            None => {
                let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                return Err(format!("Unknown scenario: '{scenario_name}'. Available: {}, all", available.join(", ")).into());
            }
        }
    };

    let mut all_metrics = Vec::new();
    let mut bus = telemetry_bus();

    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind)?;
        if let Some(frames) = frames {
            scenario.frames = frames;
        }

        println!(
            "Running: {} ({} verts, {} springs, {} frames)",
            kind.name(),
            scenario.body.vertex_count(),
            scenario.body.springs.len(),
            scenario.frames,
        );

        let metrics = BenchmarkRunner::run(&scenario, &mut bus).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg frame:     {:.3}ms", metrics.avg_frame_time * 1000.0);
        println!("  Avg CG iters:  {:.1}", metrics.avg_iterations);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        println!();

        all_metrics.push(metrics);
    }
    bus.finish();

    let report = match format {
        ReportFormat::Csv => BenchmarkMetrics::to_csv(&all_metrics),
        ReportFormat::Json => BenchmarkMetrics::to_json(&all_metrics)?,
    };

    if let Some(path) = output_path {
        std::fs::write(path, &report)?;
        println!("Results written to: {path}");
    } else {
        println!("{report}");
    }

    Ok(())
}

/// Inspect a state snapshot.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("skein Snapshot Inspector");
    println!("────────────────────────");
    println!();

    let snapshot = StateSnapshot::load(Path::new(path)).map_err(|e| format!("Failed to read snapshot: {e}"))?;

    println!("Frame:        {}", snapshot.frame);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Vertices:     {}", snapshot.vertex_count);
    println!("Impulses:     {}", snapshot.impulse_counts.iter().sum::<u32>());

    if snapshot.vertex_count > 0 {
        let (min_y, max_y) = (0..snapshot.vertex_count)
            .map(|i| snapshot.position(i)[1])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        println!("Y range:      [{min_y:.4}, {max_y:.4}]");
    }

    if let Some(result) = &snapshot.result {
        println!(
            "Solver:       {} substeps, {:.1} avg / {} max iterations, max error {:.3e}",
            result.substeps, result.avg_iterations, result.max_iterations, result.max_error
        );
    }

    if let Some(grid) = &snapshot.grid {
        let max_density = grid.density.iter().copied().fold(0.0f32, f32::max);
        println!(
            "Hair grid:    {:?} nodes, cell {:.4}m, max density {:.3}",
            grid.resolution, grid.cell_size, max_density
        );
    }

    Ok(())
}

/// Validate a scene or body file.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("skein Validator");
    println!("───────────────");
    println!();

    if path.ends_with(".toml") {
        println!("Validating scene: {path}");
        let scenario = load_scene(path)?;
        info!(scenario = scenario.kind.name(), "scene parsed");
        println!(
            "✅ Scene is valid ({}, {} frames).",
            scenario.kind.name(),
            scenario.frames
        );
    } else if path.ends_with(".json") {
        println!("Validating body: {path}");
        let content = std::fs::read_to_string(path)?;
        let body: Body = serde_json::from_str(&content)?;
        match body.validate() {
            Ok(()) => println!(
                "✅ Body is valid ({} verts, {} springs, {} off-diagonal blocks).",
                body.vertex_count(),
                body.springs.len(),
                body.count_off_diagonal_blocks()
            ),
            Err(e) => println!("❌ Body validation failed: {e}"),
        }
    } else {
        println!("Unsupported file format. Use .toml (scene) or .json (body).");
    }

    Ok(())
}
