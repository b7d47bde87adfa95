//! Benchmark metrics — data collected during a benchmark run.

use serde::{Deserialize, Serialize};

use skein_types::{SkeinError, SkeinResult};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Number of frames executed.
    pub frames: u32,
    /// Average wall-clock time per frame (seconds).
    pub avg_frame_time: f64,
    /// Minimum frame time.
    pub min_frame_time: f64,
    /// Maximum frame time.
    pub max_frame_time: f64,
    /// Final kinetic energy (should approach zero for a stable drape).
    pub final_kinetic_energy: f64,
    /// Maximum vertex displacement from the initial position.
    pub max_displacement: f32,
    /// Average CG iterations per substep over the whole run.
    pub avg_iterations: f32,
    /// Worst CG iteration count of any substep.
    pub max_iterations: u32,
    /// Worst relative residual of any substep.
    pub max_error: f32,
    /// Frames where every substep converged.
    pub converged_frames: u32,
    /// Total collision impulses (hair) or projections (cloth).
    pub contacts: u64,
    pub vertex_count: usize,
    pub spring_count: usize,
}

impl BenchmarkMetrics {
    /// CSV header matching [`BenchmarkMetrics::to_csv_row`].
    pub fn to_csv_header() -> String {
        "scenario,vertex_count,spring_count,frames,total_wall_time_s,avg_frame_ms,min_frame_ms,max_frame_ms,final_ke,max_displacement,avg_iterations,max_iterations,max_error,converged_frames,contacts".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6},{:.1},{},{:.3e},{},{}",
            self.scenario,
            self.vertex_count,
            self.spring_count,
            self.frames,
            self.total_wall_time,
            self.avg_frame_time * 1000.0,
            self.min_frame_time * 1000.0,
            self.max_frame_time * 1000.0,
            self.final_kinetic_energy,
            self.max_displacement,
            self.avg_iterations,
            self.max_iterations,
            self.max_error,
            self.converged_frames,
            self.contacts,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// Pretty-printed JSON array of all runs.
    pub fn to_json(metrics: &[BenchmarkMetrics]) -> SkeinResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| SkeinError::Serialization(e.to_string()))
    }
}
