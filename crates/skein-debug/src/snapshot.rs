//! State snapshot serialization for replay and debugging.
//!
//! Snapshots capture a body's motion state after a frame together with
//! that frame's solver statistics and, for hair, the continuum grid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skein_mesh::Body;
use skein_solver::{FrameReport, GridSnapshot, SolverResult};
use skein_types::{SkeinError, SkeinResult};

/// Body state after one simulated frame.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Frame index when this snapshot was taken.
    pub frame: u32,
    /// Simulation time in seconds.
    pub sim_time: f64,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Vertex positions (flat: [x0, y0, z0, x1, y1, z1, ...]).
    pub positions: Vec<f32>,
    /// Vertex velocities (flat: [vx0, vy0, vz0, ...]).
    pub velocities: Vec<f32>,
    /// Collision responses per vertex in the last substep.
    pub impulse_counts: Vec<u32>,
    pub result: Option<SolverResult>,
    pub grid: Option<GridSnapshot>,
}

impl StateSnapshot {
    /// Captures the vertex state of `body`.
    pub fn from_body(frame: u32, sim_time: f64, body: &Body) -> Self {
        let n = body.vertex_count();
        let mut positions = Vec::with_capacity(n * 3);
        let mut velocities = Vec::with_capacity(n * 3);
        for v in &body.vertices {
            positions.extend_from_slice(&v.position.to_array());
            velocities.extend_from_slice(&v.velocity.to_array());
        }

        Self {
            frame,
            sim_time,
            vertex_count: n,
            positions,
            velocities,
            impulse_counts: body.vertices.iter().map(|v| v.impulse_count).collect(),
            result: None,
            grid: None,
        }
    }

    /// Attaches the solver report of the frame.
    pub fn with_report(mut self, report: &FrameReport) -> Self {
        self.result = Some(report.result);
        self.grid = report.grid.clone();
        self
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> [f32; 3] {
        [self.positions[3 * i], self.positions[3 * i + 1], self.positions[3 * i + 2]]
    }

    /// Largest per-component position difference to `other`.
    ///
    /// Returns `None` if the vertex counts differ.
    pub fn max_position_delta(&self, other: &StateSnapshot) -> Option<f32> {
        if self.vertex_count != other.vertex_count {
            return None;
        }
        Some(
            self.positions
                .iter()
                .zip(&other.positions)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f32::max),
        )
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> SkeinResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| SkeinError::Serialization(format!("snapshot encode failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> SkeinResult<Self> {
        bincode::deserialize(data).map_err(|e| SkeinError::Serialization(format!("snapshot decode failed: {e}")))
    }

    /// Writes the snapshot to `path`.
    pub fn save(&self, path: &Path) -> SkeinResult<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Reads a snapshot from `path`.
    pub fn load(path: &Path) -> SkeinResult<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }
}
