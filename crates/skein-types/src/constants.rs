//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default animation frame rate (frames per second).
pub const DEFAULT_FRAME_RATE: f32 = 24.0;

/// Default number of solver substeps per frame.
pub const DEFAULT_STEPS_PER_FRAME: u32 = 5;

/// Default cap on conjugate-gradient iterations per substep.
pub const DEFAULT_CG_ITERATIONS: u32 = 100;

/// Default relative residual at which the linear solve stops.
pub const DEFAULT_CG_TOLERANCE: f32 = 0.01;

/// Machine epsilon used to floor divisions by averaged spring lengths.
pub const FLT_EPSILON: f32 = f32::EPSILON;

/// Lengths and velocities below this are treated as zero.
pub const ALMOST_ZERO: f32 = f32::EPSILON;

/// Arbitrary scale mimicking the effect of air density on hair wind.
pub const AIR_DENSITY: f32 = 0.01;

/// Scale applied to pressure-like face wind forces.
pub const FACE_WIND_SCALE: f32 = 0.02;

/// Blend between PIC (0) and FLIP (1) transfer in the hair continuum.
pub const FLUID_FACTOR: f32 = 0.95;

/// Upper bound on the hair continuum grid resolution per axis.
pub const MAX_HAIR_GRID_RES: usize = 64;
