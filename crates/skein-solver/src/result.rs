//! Solver status and per-frame result aggregation.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Outcome flags of a linear solve, OR-ed together over a frame.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SolverStatus: u8 {
        /// The residual reached the tolerance.
        const SUCCESS = 1 << 0;
        /// The iteration limit was hit first.
        const NO_CONVERGENCE = 1 << 1;
        /// A non-finite value appeared.
        const NUMERICAL_ISSUE = 1 << 2;
        /// The system could not be set up from the given input.
        const INVALID_INPUT = 1 << 3;
    }
}

/// Result of a single substep's linear solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubstepResult {
    pub status: SolverStatus,
    pub iterations: u32,
    /// Relative residual `sqrt(δ / ‖b‖²)`.
    pub error: f32,
}

/// Solver statistics aggregated over the substeps of one frame.
///
/// Error statistics only include successful substeps; iteration
/// statistics include all of them. Averages are taken over the
/// configured number of substeps.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverResult {
    pub status: SolverStatus,
    pub min_error: f32,
    pub max_error: f32,
    pub avg_error: f32,
    pub min_iterations: u32,
    pub max_iterations: u32,
    pub avg_iterations: f32,
    /// Number of substep results merged so far.
    pub substeps: u32,
    /// Number of those that succeeded.
    pub successful: u32,
}

impl SolverResult {
    /// An empty result, as at the start of a frame.
    pub fn cleared() -> Self {
        Self::default()
    }

    /// Merges one substep result, averaging over `steps` substeps.
    #[must_use]
    pub fn merge(self, sub: &SubstepResult, steps: u32) -> Self {
        let steps = steps.max(1) as f32;
        let mut next = self;

        if sub.status == SolverStatus::SUCCESS {
            if next.successful == 0 {
                next.min_error = sub.error;
                next.max_error = sub.error;
            } else {
                next.min_error = next.min_error.min(sub.error);
                next.max_error = next.max_error.max(sub.error);
            }
            next.avg_error += sub.error / steps;
            next.successful += 1;
        }

        if next.substeps == 0 {
            next.min_iterations = sub.iterations;
            next.max_iterations = sub.iterations;
        } else {
            next.min_iterations = next.min_iterations.min(sub.iterations);
            next.max_iterations = next.max_iterations.max(sub.iterations);
        }
        next.avg_iterations += sub.iterations as f32 / steps;
        next.substeps += 1;
        next.status |= sub.status;
        next
    }

    /// Returns true if every merged substep succeeded.
    pub fn is_success(&self) -> bool {
        self.status == SolverStatus::SUCCESS
    }
}
