//! Simulation configuration.
//!
//! Parameters that control the implicit solver: timing, linear solve
//! limits, spring stiffness and damping, collisions, and the hair
//! continuum. Stiffness values are per unit average spring length.

use serde::{Deserialize, Serialize};
use skein_types::constants::{
    DEFAULT_CG_ITERATIONS, DEFAULT_CG_TOLERANCE, DEFAULT_FRAME_RATE, DEFAULT_STEPS_PER_FRAME,
    GRAVITY,
};
use skein_types::{SkeinError, SkeinResult};

/// Collision response settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Query contacts and apply collision constraints.
    pub enabled: bool,
    /// Collision margin in meters.
    pub epsilon: f32,
    /// Fraction of the approach velocity returned as bounce.
    pub restitution: f32,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            epsilon: 0.015,
            restitution: 0.0,
        }
    }
}

/// Hair-specific settings: goal stiffness and the volumetric continuum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairConfig {
    /// Goal spring stiffness, scaled by the per-vertex goal weight.
    pub goal_stiffness: f32,
    /// Goal damping as a fraction of the goal stiffness.
    pub goal_damping: f32,
    /// Optional piecewise-linear weight over normalized arclength,
    /// as `[t, weight]` points sorted by `t`. Replaces vertex weights.
    pub stiffness_curve: Option<Vec<[f32; 2]>>,
    /// Use edge wind (cross-section based) instead of vertex wind.
    pub edge_wind: bool,
    /// Continuum grid cell size in meters.
    pub voxel_cell_size: f32,
    /// Blend of the grid velocity into the hair velocity, `[0, 1]`.
    pub velocity_smooth: f32,
    /// Density above which the continuum pushes hair apart.
    pub density_target: f32,
    /// Strength of the density correction.
    pub density_strength: f32,
    /// Jacobi iterations of the continuum pressure solve.
    pub pressure_iterations: u32,
}

impl Default for HairConfig {
    fn default() -> Self {
        Self {
            goal_stiffness: 0.0,
            goal_damping: 0.0,
            stiffness_curve: None,
            edge_wind: false,
            voxel_cell_size: 0.1,
            velocity_smooth: 0.0,
            density_target: 1.0,
            density_strength: 0.0,
            pressure_iterations: 20,
        }
    }
}

impl HairConfig {
    /// Returns true if the continuum pass has anything to do.
    pub fn continuum_enabled(&self) -> bool {
        self.velocity_smooth > 0.0 || self.density_strength > 0.0
    }

    /// Goal weight at normalized arclength `t`, clamped to `[0, 1]`.
    ///
    /// Uses the stiffness curve when present, otherwise `vertex_weight`.
    pub fn goal_weight(&self, t: f32, vertex_weight: f32) -> f32 {
        let weight = match self.stiffness_curve.as_deref() {
            Some(points) if !points.is_empty() => evaluate_curve(points, t),
            _ => vertex_weight,
        };
        weight.clamp(0.0, 1.0)
    }
}

/// Piecewise-linear interpolation, constant beyond the end points.
fn evaluate_curve(points: &[[f32; 2]], t: f32) -> f32 {
    let first = points[0];
    let last = points[points.len() - 1];
    if t <= first[0] {
        return first[1];
    }
    if t >= last[0] {
        return last[1];
    }
    for w in points.windows(2) {
        let ([t0, y0], [t1, y1]) = (w[0], w[1]);
        if t <= t1 {
            let span = t1 - t0;
            if span <= 0.0 {
                return y1;
            }
            return y0 + (y1 - y0) * (t - t0) / span;
        }
    }
    last[1]
}

/// Configuration for the implicit mass-spring simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Animation frame rate (frames per second).
    pub frame_rate: f32,
    /// Simulation time per animation frame, as a fraction of the frame.
    pub time_scale: f32,
    /// Solver substeps per frame.
    pub steps_per_frame: u32,

    /// Maximum conjugate-gradient iterations per substep.
    pub max_cg_iterations: u32,
    /// Relative residual at which the linear solve stops.
    pub cg_tolerance: f32,

    /// Gravity vector [gx, gy, gz] in m/s².
    pub gravity: [f32; 3],
    /// Isotropic air drag coefficient (percent).
    pub air_drag: f32,
    /// Per-substep velocity multiplier. 1.0 disables it.
    pub velocity_damping: f32,

    /// Structural/shear stiffness.
    pub structural: f32,
    /// Structural stiffness reached at per-spring scale 1.
    pub max_structural: f32,
    /// Bending stiffness.
    pub bending: f32,
    /// Bending stiffness reached at per-spring scale 1.
    pub max_bending: f32,
    /// Bending damping.
    pub bending_damping: f32,
    /// Damping along linear springs.
    pub spring_damping: f32,
    /// Cloth goal spring stiffness.
    pub goal_spring: f32,
    /// Cloth goal friction (percent).
    pub goal_friction: f32,
    /// Clamp for sewing spring forces. Zero disables the clamp.
    pub max_sewing_force: f32,
    /// Linear springs resist stretching only.
    pub no_compress: bool,

    pub collision: CollisionConfig,
    pub hair: HairConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            time_scale: 1.0,
            steps_per_frame: DEFAULT_STEPS_PER_FRAME,
            max_cg_iterations: DEFAULT_CG_ITERATIONS,
            cg_tolerance: DEFAULT_CG_TOLERANCE,
            gravity: [0.0, -GRAVITY, 0.0],
            air_drag: 1.0,
            velocity_damping: 1.0,
            structural: 150.0,
            max_structural: 150.0,
            bending: 0.5,
            max_bending: 0.5,
            bending_damping: 0.5,
            spring_damping: 5.0,
            goal_spring: 1.0,
            goal_friction: 0.0,
            max_sewing_force: 0.0,
            no_compress: false,
            collision: CollisionConfig::default(),
            hair: HairConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Creates a config tuned for hair: stiffer bending, goal springs,
    /// collisions and the volumetric continuum.
    pub fn hair() -> Self {
        Self {
            bending: 50.0,
            max_bending: 50.0,
            bending_damping: 1.0,
            collision: CollisionConfig {
                enabled: true,
                ..Default::default()
            },
            hair: HairConfig {
                goal_stiffness: 5.0,
                goal_damping: 0.1,
                velocity_smooth: 0.25,
                density_strength: 0.1,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Creates a high-quality config (more substeps, tighter tolerance).
    pub fn high_quality() -> Self {
        Self {
            steps_per_frame: 15,
            max_cg_iterations: 300,
            cg_tolerance: 1e-3,
            ..Default::default()
        }
    }

    /// Duration of one animation frame in seconds.
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Simulated time covered by one frame.
    pub fn frame_span(&self) -> f32 {
        self.frame_time() * self.time_scale
    }

    /// Substep size `h`.
    pub fn substep(&self) -> f32 {
        self.frame_span() / self.steps_per_frame as f32
    }

    /// Air drag coefficient applied as `f -= drag·v`.
    pub fn drag(&self) -> f32 {
        self.air_drag * 0.01
    }

    /// Validates parameter ranges.
    pub fn validate(&self) -> SkeinResult<()> {
        let invalid = |msg: String| Err(SkeinError::InvalidConfig(msg));

        if self.steps_per_frame == 0 {
            return invalid("steps_per_frame must be at least 1".into());
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return invalid(format!("frame_rate must be positive, got {}", self.frame_rate));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return invalid(format!("time_scale must be positive, got {}", self.time_scale));
        }
        if self.max_cg_iterations == 0 {
            return invalid("max_cg_iterations must be at least 1".into());
        }
        if !(self.cg_tolerance >= 0.0) {
            return invalid(format!("cg_tolerance must be non-negative, got {}", self.cg_tolerance));
        }
        if !(self.collision.epsilon >= 0.0) {
            return invalid(format!(
                "collision epsilon must be non-negative, got {}",
                self.collision.epsilon
            ));
        }
        if self.hair.continuum_enabled() && !(self.hair.voxel_cell_size > 0.0) {
            return invalid(format!(
                "voxel_cell_size must be positive, got {}",
                self.hair.voxel_cell_size
            ));
        }
        if let Some(curve) = &self.hair.stiffness_curve {
            if curve.windows(2).any(|w| w[1][0] < w[0][0]) {
                return invalid("stiffness_curve points must be sorted by t".into());
            }
        }
        Ok(())
    }
}
