//! Hair continuum: a coarse velocity/density grid over all strands.
//!
//! Strand segments are splatted into a node-collocated grid, the grid
//! velocity is made (nearly) divergence free with a Jacobi pressure
//! solve, and vertex velocities are blended toward the smoothed field
//! with a PIC/FLIP mix.

use serde::{Deserialize, Serialize};
use skein_math::Vec3;
use skein_mesh::Body;
use skein_types::constants::{FLUID_FACTOR, MAX_HAIR_GRID_RES};

use crate::config::HairConfig;
use crate::state::ImplicitSolverState;

/// Grid contents exported for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub origin: [f32; 3],
    pub cell_size: f32,
    pub resolution: [usize; 3],
    /// Smoothed velocity per node, x-major.
    pub velocity: Vec<[f32; 3]>,
    pub density: Vec<f32>,
}

impl GridSnapshot {
    /// Number of grid nodes.
    pub fn node_count(&self) -> usize {
        self.resolution.iter().product()
    }
}

/// Trilinear interpolation stencil: 8 node indices and weights.
type Stencil = [(usize, f32); 8];

/// Velocity/density grid over the bounding box of a hair body.
#[derive(Debug, Clone)]
pub struct HairGrid {
    origin: Vec3,
    cell_size: f32,
    res: [usize; 3],
    density: Vec<f32>,
    velocity: Vec<Vec3>,
    smooth: Vec<Vec3>,
}

impl HairGrid {
    /// Builds an empty grid covering `[min, max]`, padded by one cell.
    ///
    /// The cell size grows when the box would need more than
    /// `MAX_HAIR_GRID_RES` nodes along an axis.
    pub fn new(cell_size: f32, min: Vec3, max: Vec3) -> Self {
        let extent = (max - min).max(Vec3::ZERO);
        let max_extent = extent.max_element();
        let limit = (MAX_HAIR_GRID_RES - 3) as f32;

        let mut cell = if cell_size > 0.0 { cell_size } else { max_extent / limit };
        if max_extent / cell > limit {
            cell = max_extent / limit;
        }
        if cell <= 0.0 || !cell.is_finite() {
            cell = 1.0;
        }

        let origin = min - Vec3::splat(cell);
        let res = [extent.x, extent.y, extent.z]
            .map(|e| ((e / cell).ceil() as usize + 3).min(MAX_HAIR_GRID_RES));
        let nodes = res[0] * res[1] * res[2];

        Self {
            origin,
            cell_size: cell,
            res,
            density: vec![0.0; nodes],
            velocity: vec![Vec3::ZERO; nodes],
            smooth: vec![Vec3::ZERO; nodes],
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.res
    }

    #[inline]
    fn node(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.res[0] * (y + self.res[1] * z)
    }

    fn stencil(&self, p: Vec3) -> Stencil {
        let local = (p - self.origin) / self.cell_size;
        let mut base = [0usize; 3];
        let mut frac = [0f32; 3];
        for axis in 0..3 {
            let hi = (self.res[axis] - 2) as f32;
            let c = local[axis].clamp(0.0, hi);
            let b = c.floor().min(hi);
            base[axis] = b as usize;
            frac[axis] = (c - b).clamp(0.0, 1.0);
        }

        let mut out = [(0, 0.0); 8];
        for (n, slot) in out.iter_mut().enumerate() {
            let (dx, dy, dz) = (n & 1, (n >> 1) & 1, (n >> 2) & 1);
            let w = |d: usize, f: f32| if d == 1 { f } else { 1.0 - f };
            *slot = (
                self.node(base[0] + dx, base[1] + dy, base[2] + dz),
                w(dx, frac[0]) * w(dy, frac[1]) * w(dz, frac[2]),
            );
        }
        out
    }

    fn splat(&mut self, p: Vec3, v: Vec3, weight: f32) {
        for (node, w) in self.stencil(p) {
            let w = w * weight;
            self.density[node] += w;
            self.velocity[node] += v * w;
        }
    }

    /// Adds one strand segment, sampled every half cell.
    pub fn add_segment(&mut self, x0: Vec3, v0: Vec3, x1: Vec3, v1: Vec3) {
        let length = x0.distance(x1);
        let samples = ((2.0 * length / self.cell_size).ceil() as usize).max(1);
        let weight = length.max(f32::EPSILON) / samples as f32 / self.cell_size;
        for s in 0..samples {
            let t = (s as f32 + 0.5) / samples as f32;
            self.splat(x0.lerp(x1, t), v0.lerp(v1, t), weight);
        }
    }

    /// Turns accumulated momentum into velocity.
    pub fn normalize(&mut self) {
        for (v, &d) in self.velocity.iter_mut().zip(&self.density) {
            if d > 0.0 {
                *v /= d;
            }
        }
        self.smooth.copy_from_slice(&self.velocity);
    }

    /// Projects the grid velocity so over-dense regions expand.
    ///
    /// Pressure is zero outside occupied nodes.
    pub fn solve_divergence(&mut self, dt: f32, density_target: f32, density_strength: f32, iterations: u32) {
        if dt <= 0.0 {
            return;
        }
        let [nx, ny, nz] = self.res;
        let h = self.cell_size;
        let filled = |d: f32| d > 0.0;

        let mut rhs = vec![0.0f32; self.density.len()];
        for z in 1..nz - 1 {
            for y in 1..ny - 1 {
                for x in 1..nx - 1 {
                    let i = self.node(x, y, z);
                    if !filled(self.density[i]) {
                        continue;
                    }
                    let div = (self.velocity[self.node(x + 1, y, z)].x
                        - self.velocity[self.node(x - 1, y, z)].x
                        + self.velocity[self.node(x, y + 1, z)].y
                        - self.velocity[self.node(x, y - 1, z)].y
                        + self.velocity[self.node(x, y, z + 1)].z
                        - self.velocity[self.node(x, y, z - 1)].z)
                        / (2.0 * h);
                    let source = density_strength * (self.density[i] - density_target).max(0.0) / dt;
                    rhs[i] = (div - source) / dt;
                }
            }
        }

        let mut pressure = vec![0.0f32; self.density.len()];
        let mut next = pressure.clone();
        for _ in 0..iterations {
            for z in 1..nz - 1 {
                for y in 1..ny - 1 {
                    for x in 1..nx - 1 {
                        let i = self.node(x, y, z);
                        if !filled(self.density[i]) {
                            continue;
                        }
                        let sum = pressure[self.node(x + 1, y, z)]
                            + pressure[self.node(x - 1, y, z)]
                            + pressure[self.node(x, y + 1, z)]
                            + pressure[self.node(x, y - 1, z)]
                            + pressure[self.node(x, y, z + 1)]
                            + pressure[self.node(x, y, z - 1)];
                        next[i] = (sum - h * h * rhs[i]) / 6.0;
                    }
                }
            }
            std::mem::swap(&mut pressure, &mut next);
        }

        for z in 1..nz - 1 {
            for y in 1..ny - 1 {
                for x in 1..nx - 1 {
                    let i = self.node(x, y, z);
                    if !filled(self.density[i]) {
                        continue;
                    }
                    let grad = Vec3::new(
                        pressure[self.node(x + 1, y, z)] - pressure[self.node(x - 1, y, z)],
                        pressure[self.node(x, y + 1, z)] - pressure[self.node(x, y - 1, z)],
                        pressure[self.node(x, y, z + 1)] - pressure[self.node(x, y, z - 1)],
                    ) / (2.0 * h);
                    self.smooth[i] = self.velocity[i] - grad * dt;
                }
            }
        }
    }

    /// Interpolates `(density, velocity, smoothed velocity)` at `p`.
    pub fn interpolate(&self, p: Vec3) -> (f32, Vec3, Vec3) {
        let mut out = (0.0, Vec3::ZERO, Vec3::ZERO);
        for (node, w) in self.stencil(p) {
            out.0 += self.density[node] * w;
            out.1 += self.velocity[node] * w;
            out.2 += self.smooth[node] * w;
        }
        out
    }

    /// Blended grid velocity for a vertex at `p` moving with `v`.
    pub fn vertex_velocity(&self, p: Vec3, v: Vec3) -> Vec3 {
        let (_, grid, smooth) = self.interpolate(p);
        let pic = smooth;
        let flip = v + smooth - grid;
        pic.lerp(flip, FLUID_FACTOR)
    }

    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            origin: self.origin.to_array(),
            cell_size: self.cell_size,
            resolution: self.res,
            velocity: self.smooth.iter().map(|v| v.to_array()).collect(),
            density: self.density.clone(),
        }
    }
}

/// Runs the continuum pass on the solved velocities of a hair body.
///
/// Returns `None` when neither smoothing nor density correction is
/// enabled.
pub fn continuum_step(
    state: &mut ImplicitSolverState,
    body: &Body,
    hair: &HairConfig,
    dt: f32,
) -> Option<GridSnapshot> {
    if !hair.continuum_enabled() || state.vertex_count() == 0 {
        return None;
    }

    let (min, max) = state
        .x
        .iter()
        .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| (lo.min(*p), hi.max(*p)));

    let mut grid = HairGrid::new(hair.voxel_cell_size, min, max);
    for strand in body.strands() {
        for (i, j) in strand.segments() {
            grid.add_segment(state.x[i], state.v_new[i], state.x[j], state.v_new[j]);
        }
    }
    grid.normalize();
    grid.solve_divergence(dt, hair.density_target, hair.density_strength, hair.pressure_iterations);

    // Pinned velocities are prescribed and stay out of the blend.
    let smoothing = hair.velocity_smooth;
    for i in 0..state.vertex_count() {
        if state.constraints[i].is_pinned() {
            continue;
        }
        let v = state.v_new[i];
        let fluid = grid.vertex_velocity(state.x[i], v);
        state.v_new[i] = v.lerp(fluid, smoothing);
    }

    Some(grid.snapshot())
}
