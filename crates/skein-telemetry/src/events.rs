//! Simulation event types.
//!
//! Structured events emitted while stepping a body. Events are plain
//! values that carry just enough data for monitoring and regression
//! tracking.

use serde::{Deserialize, Serialize};

/// A simulation event, tagged with the frame it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Frame number (0-indexed).
    pub frame: u32,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Frame started.
    FrameBegin {
        /// Simulated time at the start of the frame (seconds).
        sim_time: f64,
    },

    /// Frame completed.
    FrameEnd {
        /// Wall-clock time spent on the frame (seconds).
        wall_time: f64,
    },

    /// Aggregated velocity-solve statistics for the frame.
    Convergence {
        /// Raw solver status bits.
        status: u8,
        avg_iterations: f32,
        max_iterations: u32,
        avg_error: f32,
        max_error: f32,
        /// Whether every substep reached the tolerance.
        converged: bool,
    },

    /// Contacts found for the frame.
    Contacts {
        count: u32,
        /// Deepest projection correction applied (meters).
        max_penetration: f32,
    },

    /// Energy snapshot at the end of the frame.
    Energy {
        /// Kinetic energy (0.5 * m * v^2).
        kinetic: f64,
        /// Gravitational potential energy relative to y = 0.
        potential: f64,
    },

    /// Hair continuum grid summary.
    HairGrid {
        resolution: [usize; 3],
        max_density: f32,
    },

    /// Custom event for extensibility.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given frame.
    pub fn new(frame: u32, kind: EventKind) -> Self {
        Self { frame, kind }
    }

    /// Short name of the payload variant.
    pub fn label(&self) -> &str {
        match &self.kind {
            EventKind::FrameBegin { .. } => "frame_begin",
            EventKind::FrameEnd { .. } => "frame_end",
            EventKind::Convergence { .. } => "convergence",
            EventKind::Contacts { .. } => "contacts",
            EventKind::Energy { .. } => "energy",
            EventKind::HairGrid { .. } => "hair_grid",
            EventKind::Custom { label, .. } => label,
        }
    }
}
